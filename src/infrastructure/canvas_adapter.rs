// Canvas-grid rendering backend
use crate::application::render_adapter::RenderAdapter;
use crate::domain::options::{ChartOptions, Surface, Theme};
use crate::domain::series::{AxisSlot, ChartKind, Series};
use serde_json::json;

/// Immediate-mode canvas backend. The two physical slots map onto left and
/// right value scales; area fills are not in its primitive set, so `Area`
/// draws as `Line` (the closest supported kind, substituted at mount rather
/// than failing).
#[derive(Default)]
pub struct CanvasGridAdapter {
    mounted: Option<MountedCanvas>,
}

struct MountedCanvas {
    surface_id: String,
    options: ChartOptions,
    scene: serde_json::Value,
}

impl CanvasGridAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last command list handed to the canvas, for inspection.
    pub fn scene(&self) -> Option<&serde_json::Value> {
        self.mounted.as_ref().map(|m| &m.scene)
    }

    pub fn mounted_kind(&self) -> Option<ChartKind> {
        self.mounted.as_ref().map(|m| m.options.kind)
    }

    fn primitive(kind: ChartKind) -> &'static str {
        match kind {
            ChartKind::Line | ChartKind::Area => "polyline",
            ChartKind::Bar => "rects",
        }
    }

    fn scale(slot: AxisSlot) -> &'static str {
        match slot {
            AxisSlot::Primary => "left",
            AxisSlot::Secondary => "right",
        }
    }
}

impl RenderAdapter for CanvasGridAdapter {
    fn mount(&mut self, surface: &Surface, options: &ChartOptions) {
        let mut options = options.clone();
        if options.kind == ChartKind::Area {
            tracing::debug!("canvas backend cannot fill areas; substituting line charts");
            options.kind = ChartKind::Line;
        }
        tracing::debug!("mounting canvas-grid backend into surface {}", surface.id);
        self.mounted = Some(MountedCanvas {
            surface_id: surface.id.clone(),
            options,
            scene: json!({ "layers": [] }),
        });
    }

    fn update_series(&mut self, series: &[Series]) {
        let Some(canvas) = self.mounted.as_mut() else {
            return;
        };
        let layers: Vec<serde_json::Value> = series
            .iter()
            .filter(|s| s.show)
            .map(|s| {
                let kind = s.kind.unwrap_or(canvas.options.kind);
                json!({
                    "primitive": Self::primitive(kind),
                    "label": s.name,
                    "scale": Self::scale(s.axis),
                    "color": s.color,
                    "stacked": canvas.options.stacked,
                    "points": s
                        .data
                        .iter()
                        .map(|p| [p.time_ms as f64, p.value])
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        let layer_count = layers.len();
        canvas.scene = json!({
            "surface": canvas.surface_id,
            "background": match canvas.options.theme {
                Theme::Dark => "dark",
                Theme::Light => "light",
            },
            "grid": canvas.options.grid,
            "legend": canvas.options.legend,
            "height": canvas.options.height,
            "scales": {
                "left": {
                    "visible": canvas.options.axes.primary.visible,
                    "min": canvas.options.axes.primary.min,
                    "max": canvas.options.axes.primary.max,
                },
                "right": {
                    "visible": canvas.options.axes.secondary.visible,
                    "min": canvas.options.axes.secondary.min,
                    "max": canvas.options.axes.secondary.max,
                },
            },
            "layers": layers,
        });
        tracing::debug!("canvas scene rebuilt with {} layers", layer_count);
    }

    fn destroy(&mut self) {
        if self.mounted.take().is_some() {
            tracing::debug!("canvas-grid backend destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::AxisLayout;
    use crate::domain::series::DataPoint;

    fn options(kind: ChartKind) -> ChartOptions {
        ChartOptions {
            kind,
            axes: AxisLayout::default(),
            stacked: false,
            legend: true,
            tooltip: true,
            grid: true,
            animate: true,
            theme: Theme::Light,
            height: 300,
            title: None,
        }
    }

    fn surface() -> Surface {
        Surface {
            id: "s1".to_string(),
            width: 800,
            height: 300,
        }
    }

    fn series(name: &str, axis: AxisSlot, show: bool) -> Series {
        Series {
            name: name.to_string(),
            data: vec![DataPoint::new(1_000, 1.5)],
            color: None,
            kind: None,
            unit: None,
            show,
            axis,
        }
    }

    #[test]
    fn test_area_substitutes_line_at_mount() {
        let mut adapter = CanvasGridAdapter::new();
        adapter.mount(&surface(), &options(ChartKind::Area));
        assert_eq!(adapter.mounted_kind(), Some(ChartKind::Line));
    }

    #[test]
    fn test_axis_slots_map_to_left_and_right_scales() {
        let mut adapter = CanvasGridAdapter::new();
        adapter.mount(&surface(), &options(ChartKind::Line));
        adapter.update_series(&[
            series("a", AxisSlot::Primary, true),
            series("b", AxisSlot::Secondary, true),
        ]);
        let scene = adapter.scene().unwrap();
        assert_eq!(scene["layers"][0]["scale"], "left");
        assert_eq!(scene["layers"][1]["scale"], "right");
    }

    #[test]
    fn test_hidden_series_are_not_drawn() {
        let mut adapter = CanvasGridAdapter::new();
        adapter.mount(&surface(), &options(ChartKind::Line));
        adapter.update_series(&[
            series("visible", AxisSlot::Primary, true),
            series("hidden", AxisSlot::Primary, false),
        ]);
        let scene = adapter.scene().unwrap();
        assert_eq!(scene["layers"].as_array().unwrap().len(), 1);
        assert_eq!(scene["layers"][0]["label"], "visible");
    }

    #[test]
    fn test_update_before_mount_is_ignored_and_destroy_clears() {
        let mut adapter = CanvasGridAdapter::new();
        adapter.update_series(&[series("a", AxisSlot::Primary, true)]);
        assert!(adapter.scene().is_none());

        adapter.mount(&surface(), &options(ChartKind::Line));
        adapter.destroy();
        assert!(adapter.scene().is_none());
    }
}
