// Chart lifecycle orchestration - one adapter, one surface, one state machine
use crate::application::render_adapter::{AdapterFactory, RenderAdapter};
use crate::domain::options::{ChartOptions, Surface};
use crate::domain::series::Series;
use crate::error::ChartError;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManagerState {
    Uninitialized,
    Mounted,
    Updating,
    Destroyed,
}

/// Owns exactly one rendering adapter and one mounted surface for its
/// lifetime. All adapter calls funnel through here, which is what upholds
/// the call discipline the `RenderAdapter` contract promises.
pub struct ChartManager {
    factory: Arc<dyn AdapterFactory>,
    adapter: Option<Box<dyn RenderAdapter>>,
    surface: Option<Surface>,
    state: ManagerState,
    pending: VecDeque<Vec<Series>>,
}

impl ChartManager {
    pub fn new(factory: Arc<dyn AdapterFactory>) -> Self {
        Self {
            factory,
            adapter: None,
            surface: None,
            state: ManagerState::Uninitialized,
            pending: VecDeque::new(),
        }
    }

    /// Construct the adapter via the injected factory and mount it into the
    /// surface. Valid only from the uninitialized state; a missing surface
    /// is a terminal error for this manager instance and is not retried.
    pub fn initialize(
        &mut self,
        surface: Option<Surface>,
        options: &ChartOptions,
    ) -> Result<(), ChartError> {
        if self.state != ManagerState::Uninitialized {
            return Err(ChartError::InvalidState {
                operation: "initialize",
            });
        }
        let surface = match surface {
            Some(surface) => surface,
            None => {
                tracing::error!("chart initialize failed: drawing surface not found");
                return Err(ChartError::SurfaceNotFound);
            }
        };

        let mut adapter = self.factory.build();
        adapter.mount(&surface, options);
        self.adapter = Some(adapter);
        self.surface = Some(surface);
        self.state = ManagerState::Mounted;
        Ok(())
    }

    /// Apply one complete series snapshot. Snapshots reach the adapter
    /// strictly in arrival order: a call landing while a previous snapshot
    /// is still being applied queues behind it and is drained by the call
    /// already in progress, so the adapter never sees a torn update.
    pub fn update(&mut self, series: Vec<Series>) -> Result<(), ChartError> {
        match self.state {
            ManagerState::Mounted | ManagerState::Updating => {}
            _ => return Err(ChartError::InvalidState { operation: "update" }),
        }

        self.pending.push_back(series);
        if self.state == ManagerState::Updating {
            return Ok(());
        }

        self.state = ManagerState::Updating;
        while let Some(snapshot) = self.pending.pop_front() {
            if let Some(adapter) = self.adapter.as_mut() {
                adapter.update_series(&snapshot);
            }
        }
        self.state = ManagerState::Mounted;
        Ok(())
    }

    /// Tear down from any state. Idempotent: the adapter's `destroy` runs
    /// exactly once and the surface reference is released with it.
    pub fn destroy(&mut self) {
        if self.state == ManagerState::Destroyed {
            return;
        }
        if let Some(mut adapter) = self.adapter.take() {
            adapter.destroy();
        }
        self.surface = None;
        self.pending.clear();
        self.state = ManagerState::Destroyed;
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == ManagerState::Destroyed
    }
}
