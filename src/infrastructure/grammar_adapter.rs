// Visualization-grammar rendering backend
use crate::application::render_adapter::RenderAdapter;
use crate::domain::options::{AxisSpec, ChartOptions, Surface, Theme};
use crate::domain::series::{AxisSlot, ChartKind, Series};
use serde_json::json;

/// Declarative backend driven by a layered grammar spec. Each series
/// becomes one layer; the secondary slot is expressed through independent
/// y-scale resolution rather than a second native axis object. Supports
/// every chart kind, so nothing is substituted at mount.
#[derive(Default)]
pub struct GrammarAdapter {
    mounted: Option<MountedView>,
}

struct MountedView {
    surface_id: String,
    options: ChartOptions,
    spec: serde_json::Value,
}

impl GrammarAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last grammar spec handed to the view, for inspection.
    pub fn spec(&self) -> Option<&serde_json::Value> {
        self.mounted.as_ref().map(|m| &m.spec)
    }

    fn mark(kind: ChartKind) -> &'static str {
        match kind {
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Bar => "bar",
        }
    }

    fn domain(axis: &AxisSpec) -> serde_json::Value {
        match (axis.min, axis.max) {
            (None, None) => serde_json::Value::Null,
            (min, max) => json!({ "min": min, "max": max }),
        }
    }
}

impl RenderAdapter for GrammarAdapter {
    fn mount(&mut self, surface: &Surface, options: &ChartOptions) {
        tracing::debug!("mounting grammar backend into surface {}", surface.id);
        let spec = json!({
            "view": surface.id,
            "width": surface.width,
            "height": options.height,
            "title": options.title,
            "background": match options.theme {
                Theme::Dark => "dark",
                Theme::Light => "light",
            },
            "config": {
                "legend": { "disable": !options.legend },
                "axis": { "grid": options.grid },
                "animation": options.animate,
            },
            "layer": [],
        });
        self.mounted = Some(MountedView {
            surface_id: surface.id.clone(),
            options: options.clone(),
            spec,
        });
    }

    fn update_series(&mut self, series: &[Series]) {
        let Some(view) = self.mounted.as_mut() else {
            return;
        };
        let options = &view.options;
        let layers: Vec<serde_json::Value> = series
            .iter()
            .filter(|s| s.show)
            .map(|s| {
                let kind = s.kind.unwrap_or(options.kind);
                let axis = match s.axis {
                    AxisSlot::Primary => &options.axes.primary,
                    AxisSlot::Secondary => &options.axes.secondary,
                };
                json!({
                    "name": s.name,
                    "mark": {
                        "type": Self::mark(kind),
                        "tooltip": options.tooltip,
                        "stacked": options.stacked,
                    },
                    "encoding": {
                        "x": { "field": "time", "type": "temporal" },
                        "y": {
                            "field": "value",
                            "type": "quantitative",
                            "title": s.unit,
                            "scale": Self::domain(axis),
                        },
                        "color": { "value": s.color },
                    },
                    "data": {
                        "values": s
                            .data
                            .iter()
                            .map(|p| json!({ "time": p.time_ms, "value": p.value }))
                            .collect::<Vec<_>>(),
                    },
                })
            })
            .collect();

        let split_scales = series
            .iter()
            .any(|s| s.show && s.axis == AxisSlot::Secondary);
        view.spec["layer"] = json!(layers);
        view.spec["resolve"] = if split_scales {
            json!({ "scale": { "y": "independent" } })
        } else {
            json!({ "scale": { "y": "shared" } })
        };
        tracing::debug!(
            "grammar spec rebuilt for {} with {} layers",
            view.surface_id,
            view.spec["layer"].as_array().map(|l| l.len()).unwrap_or(0)
        );
    }

    fn destroy(&mut self) {
        if self.mounted.take().is_some() {
            tracing::debug!("grammar backend destroyed");
        }
    }
}
