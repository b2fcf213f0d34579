// Rendering backend contract - the only surface the rest of the crate sees
use crate::domain::options::{ChartOptions, Surface};
use crate::domain::series::Series;
use serde::Deserialize;

/// One rendering backend behind the panel. The manager guarantees the call
/// discipline: `mount` exactly once before any `update_series`, `destroy`
/// at most once and always last, and never two calls in flight at once on
/// the same instance. A backend that cannot express the requested chart
/// kind substitutes its closest supported kind instead of failing mount.
pub trait RenderAdapter: Send {
    fn mount(&mut self, surface: &Surface, options: &ChartOptions);
    fn update_series(&mut self, series: &[Series]);
    fn destroy(&mut self);
}

/// Backend selector from the panel configuration. Picking one is a pure
/// construction-time decision made behind the factory seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderBackend {
    #[default]
    CanvasGrid,
    Grammar,
}

pub trait AdapterFactory: Send + Sync {
    fn build(&self) -> Box<dyn RenderAdapter>;
}
