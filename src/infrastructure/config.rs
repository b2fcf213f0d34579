// Panel configuration - host-facing input with fixed defaults for every
// omitted global option
use crate::application::axis_mapper::AxisAssignment;
use crate::application::refresh_scheduler::DEFAULT_REFRESH_PERIOD;
use crate::application::render_adapter::RenderBackend;
use crate::domain::options::{AxisLayout, AxisSpec, ChartOptions, ThemeMode};
use crate::domain::records::{StatisticKind, StatisticsPeriod};
use crate::domain::series::{AxisSlot, ChartKind};
use crate::error::ChartError;
use serde::Deserialize;

/// Upper bound on the look-back window: ten years of hours. Keeps the
/// window arithmetic inside each refresh cycle well clear of overflow.
const MAX_WINDOW_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub kind: ChartKind,
    #[serde(default)]
    pub backend: RenderBackend,
    #[serde(default = "default_hours")]
    pub hours_to_show: i64,
    #[serde(default = "default_refresh")]
    pub refresh_seconds: u64,
    #[serde(default = "default_true")]
    pub legend: bool,
    #[serde(default = "default_true")]
    pub tooltip: bool,
    #[serde(default = "default_true")]
    pub grid: bool,
    #[serde(default = "default_true")]
    pub animate: bool,
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "default_height")]
    pub height: u32,
    pub title: Option<String>,
    #[serde(default)]
    pub stacked: bool,
    /// Optional fixed x-axis bounds, epoch milliseconds.
    pub x_min: Option<i64>,
    pub x_max: Option<i64>,
    #[serde(default)]
    pub yaxes: Vec<YAxisConfig>,
}

fn default_hours() -> i64 {
    24
}

fn default_refresh() -> u64 {
    DEFAULT_REFRESH_PERIOD.as_secs()
}

fn default_true() -> bool {
    true
}

fn default_height() -> u32 {
    300
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            kind: ChartKind::default(),
            backend: RenderBackend::default(),
            hours_to_show: default_hours(),
            refresh_seconds: default_refresh(),
            legend: true,
            tooltip: true,
            grid: true,
            animate: true,
            theme: ThemeMode::default(),
            height: default_height(),
            title: None,
            stacked: false,
            x_min: None,
            x_max: None,
            yaxes: Vec::new(),
        }
    }
}

/// User-declared binding of one data source to one series.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitySpec {
    pub entity: String,
    pub name: Option<String>,
    pub color: Option<String>,
    pub unit: Option<String>,
    pub kind: Option<ChartKind>,
    /// Read the value from this attribute instead of parsing the state.
    pub attribute: Option<String>,
    /// Free-form logical axis id; the mapper reconciles these down to the
    /// two physical slots.
    pub axis_id: Option<String>,
    /// Present when this entity reads pre-aggregated statistics instead of
    /// raw state history.
    pub statistics: Option<StatisticsSpec>,
    #[serde(default = "default_true")]
    pub show: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsSpec {
    #[serde(default)]
    pub period: StatisticsPeriod,
    #[serde(default)]
    pub stat_type: StatisticKind,
}

/// Named y-axis definition, matched to entities through `axis_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct YAxisConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PanelConfig {
    /// A panel with zero entities never reaches the rendering stage, and a
    /// non-positive or absurd look-back window never reaches the fetch path.
    pub fn validate(&self) -> Result<(), ChartError> {
        if self.entities.is_empty() {
            return Err(ChartError::NoEntities);
        }
        if !(1..=MAX_WINDOW_HOURS).contains(&self.hours_to_show) {
            return Err(ChartError::WindowOutOfRange(self.hours_to_show));
        }
        Ok(())
    }

    /// Resolve the complete backend-agnostic render options for this panel.
    pub fn chart_options(&self, axes: &AxisAssignment, active_theme: &str) -> ChartOptions {
        ChartOptions {
            kind: self.kind,
            axes: self.axis_layout(axes),
            stacked: self.stacked,
            legend: self.legend,
            tooltip: self.tooltip,
            grid: self.grid,
            animate: self.animate,
            theme: self.theme.resolve(active_theme),
            height: self.height,
            title: self.title.clone(),
        }
    }

    /// Fold the named y-axis definitions through the logical-to-physical
    /// mapping. Built once per configuration, independent of live data.
    fn axis_layout(&self, axes: &AxisAssignment) -> AxisLayout {
        let mut layout = AxisLayout {
            x: AxisSpec {
                visible: true,
                min: self.x_min.map(|v| v as f64),
                max: self.x_max.map(|v| v as f64),
            },
            primary: AxisSpec::default(),
            secondary: AxisSpec {
                visible: axes.uses_secondary(),
                ..AxisSpec::default()
            },
        };
        for def in &self.yaxes {
            if !axes.is_mapped(&def.id) {
                tracing::warn!(
                    "y-axis definition '{}' matches no entity axis_id; applying it to the primary axis",
                    def.id
                );
            }
            let spec = AxisSpec {
                visible: def.visible,
                min: def.min,
                max: def.max,
            };
            match axes.slot_for(Some(&def.id)) {
                AxisSlot::Primary => layout.primary = spec,
                AxisSlot::Secondary => layout.secondary = spec,
            }
        }
        layout
    }
}

pub fn load_panel_config() -> anyhow::Result<PanelConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/panel"))
        .build()?;

    let panel: PanelConfig = settings.try_deserialize()?;
    panel.validate()?;
    Ok(panel)
}
