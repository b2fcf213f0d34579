// Backend-agnostic render configuration passed to an adapter at mount time
use crate::domain::series::ChartKind;
use serde::Deserialize;

/// Theme names starting with this prefix resolve to dark mode under `Auto`.
const DARK_THEME_PREFIX: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl ThemeMode {
    /// Resolve against the host's active theme name.
    pub fn resolve(&self, active_theme: &str) -> Theme {
        match self {
            ThemeMode::Light => Theme::Light,
            ThemeMode::Dark => Theme::Dark,
            ThemeMode::Auto => {
                if active_theme.to_ascii_lowercase().starts_with(DARK_THEME_PREFIX) {
                    Theme::Dark
                } else {
                    Theme::Light
                }
            }
        }
    }
}

/// One conceptual axis: visibility plus optional fixed bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub visible: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Default for AxisSpec {
    fn default() -> Self {
        Self {
            visible: true,
            min: None,
            max: None,
        }
    }
}

/// Resolved description of the x axis and the two physical value axes.
/// Built once per configuration, independent of live data.
#[derive(Debug, Clone, Default)]
pub struct AxisLayout {
    pub x: AxisSpec,
    pub primary: AxisSpec,
    pub secondary: AxisSpec,
}

/// The complete render configuration an adapter receives at mount time.
/// Not re-passed on update; a mounted adapter keeps its copy.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub kind: ChartKind,
    pub axes: AxisLayout,
    pub stacked: bool,
    pub legend: bool,
    pub tooltip: bool,
    pub grid: bool,
    pub animate: bool,
    pub theme: Theme,
    pub height: u32,
    pub title: Option<String>,
}

/// Opaque drawing-surface handle provided by the host. The manager owns
/// everything drawn inside it from initialize until destroy.
#[derive(Debug, Clone)]
pub struct Surface {
    pub id: String,
    pub width: u32,
    pub height: u32,
}
