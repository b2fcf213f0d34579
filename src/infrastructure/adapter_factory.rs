// Backend selection - a pure construction-time decision behind the factory seam
use crate::application::render_adapter::{AdapterFactory, RenderAdapter, RenderBackend};
use crate::infrastructure::canvas_adapter::CanvasGridAdapter;
use crate::infrastructure::grammar_adapter::GrammarAdapter;

/// Maps the configured backend selector to its concrete adapter. Everything
/// past this point interacts with the `RenderAdapter` contract only.
pub struct BackendFactory {
    backend: RenderBackend,
}

impl BackendFactory {
    pub fn new(backend: RenderBackend) -> Self {
        Self { backend }
    }
}

impl AdapterFactory for BackendFactory {
    fn build(&self) -> Box<dyn RenderAdapter> {
        match self.backend {
            RenderBackend::CanvasGrid => Box::new(CanvasGridAdapter::new()),
            RenderBackend::Grammar => Box::new(GrammarAdapter::new()),
        }
    }
}
