// Panel orchestration - fetch, transform, hand complete snapshots to the manager
use crate::application::axis_mapper::{AxisAssignment, map_axes};
use crate::application::chart_manager::ChartManager;
use crate::application::data_source::TimeSeriesSource;
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::application::render_adapter::AdapterFactory;
use crate::application::transform;
use crate::domain::options::Surface;
use crate::domain::series::Series;
use crate::error::ChartError;
use crate::infrastructure::config::{EntitySpec, PanelConfig};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// One chart panel: owns exactly one manager and one scheduler, created and
/// destroyed as a pair. Attach mounts the chart and starts the refresh
/// cycle; detach stops it and tears the chart down.
pub struct ChartPanel {
    inner: Arc<PanelInner>,
    scheduler: RefreshScheduler,
}

struct PanelInner {
    config: PanelConfig,
    axes: AxisAssignment,
    source: Arc<dyn TimeSeriesSource>,
    /// Kept by the panel so attach and theme changes can mount a fresh
    /// manager; each manager instance is single-shot by contract.
    factory: Arc<dyn AdapterFactory>,
    manager: Mutex<ChartManager>,
    /// The surface the chart is currently mounted into; `None` while
    /// detached.
    surface: Mutex<Option<Surface>>,
    /// Bumped on detach. A refresh cycle whose generation no longer matches
    /// when its fetches resolve is discarded instead of reaching the adapter.
    generation: AtomicU64,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag even if the refresh future is dropped mid-fetch.
struct InFlightGuard(Arc<PanelInner>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::SeqCst);
    }
}

impl ChartPanel {
    /// Validates the configuration and resolves the axis mapping up front;
    /// a panel with zero entities is rejected here, before anything mounts.
    pub fn new(
        config: PanelConfig,
        source: Arc<dyn TimeSeriesSource>,
        factory: Arc<dyn AdapterFactory>,
    ) -> Result<Self, ChartError> {
        config.validate()?;
        let axes = map_axes(config.entities.iter().filter_map(|e| e.axis_id.as_deref()));
        Ok(Self {
            inner: Arc::new(PanelInner {
                axes,
                source,
                manager: Mutex::new(ChartManager::new(factory.clone())),
                factory,
                surface: Mutex::new(None),
                generation: AtomicU64::new(0),
                in_flight: AtomicBool::new(false),
                config,
            }),
            scheduler: RefreshScheduler::new(),
        })
    }

    /// Mount into the host surface and start the refresh cycle. Each attach
    /// mounts a fresh manager instance, so a panel can be re-attached after
    /// detach. The theme is sampled from the host's active theme name here;
    /// later theme changes go through `set_theme`.
    pub async fn attach(
        &mut self,
        surface: Option<Surface>,
        active_theme: &str,
    ) -> Result<(), ChartError> {
        let options = self.inner.config.chart_options(&self.inner.axes, active_theme);
        {
            let mut mounted = self.inner.surface.lock().await;
            let mut manager = self.inner.manager.lock().await;
            *mounted = None;
            manager.destroy();
            *manager = ChartManager::new(self.inner.factory.clone());
            manager.initialize(surface.clone(), &options)?;
            *mounted = surface;
        }

        let inner = self.inner.clone();
        let period = Duration::from_secs(self.inner.config.refresh_seconds);
        self.scheduler.start(period, move || {
            let inner = inner.clone();
            async move { PanelInner::refresh(inner).await }
        });
        Ok(())
    }

    /// Re-resolve the theme mode against a new host theme name and remount
    /// the chart into its current surface with the updated options. Nothing
    /// is mounted while detached, so this is a no-op then.
    pub async fn set_theme(&self, active_theme: &str) -> Result<(), ChartError> {
        let Some(surface) = self.inner.surface.lock().await.clone() else {
            return Ok(());
        };
        let options = self.inner.config.chart_options(&self.inner.axes, active_theme);
        let mut manager = self.inner.manager.lock().await;
        manager.destroy();
        *manager = ChartManager::new(self.inner.factory.clone());
        manager.initialize(Some(surface), &options)
    }

    /// Run one refresh cycle outside the schedule, e.g. on an external state
    /// change. Coalesced away if a cycle is already in flight.
    pub async fn refresh_now(&self) {
        PanelInner::refresh(self.inner.clone()).await;
    }

    /// Stop the scheduler and destroy the chart. Idempotent. An in-flight
    /// fetch may still complete, but its results are discarded.
    pub async fn detach(&mut self) {
        self.scheduler.stop();
        self.inner.shutdown().await;
    }
}

impl PanelInner {
    async fn refresh(inner: Arc<PanelInner>) {
        // A refresh requested while one is still running is skipped; the
        // running cycle's snapshot is at most one period stale.
        if inner.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("refresh already in flight; skipping this request");
            return;
        }
        let _guard = InFlightGuard(inner.clone());
        let generation = inner.generation.load(Ordering::SeqCst);

        let end = Utc::now();
        let start = end - ChronoDuration::hours(inner.config.hours_to_show);
        let mut series = Vec::with_capacity(inner.config.entities.len());
        for spec in &inner.config.entities {
            series.push(inner.fetch_entity(spec, start, end).await);
        }

        if inner.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("discarding refresh cycle that resolved after detach");
            return;
        }
        let mut manager = inner.manager.lock().await;
        if manager.is_destroyed() {
            return;
        }
        if let Err(e) = manager.update(series) {
            tracing::warn!("series snapshot rejected by chart manager: {}", e);
        }
    }

    /// One entity's series for this cycle. Fetch or transform trouble never
    /// aborts the cycle; the entity contributes an empty series instead and
    /// every other entity renders normally.
    async fn fetch_entity(
        &self,
        spec: &EntitySpec,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Series {
        let slot = self.axes.slot_for(spec.axis_id.as_deref());
        let points = if let Some(stats) = &spec.statistics {
            match self
                .source
                .fetch_statistics(&spec.entity, start, end, stats.period)
                .await
            {
                Ok(records) => transform::statistic_points(stats.stat_type, &records),
                Err(e) => {
                    tracing::warn!("statistics fetch failed for {}: {}", spec.entity, e);
                    Vec::new()
                }
            }
        } else {
            match self.source.fetch_history(&spec.entity, start, end).await {
                Ok(records) => transform::history_points(spec, &records),
                Err(e) => {
                    tracing::warn!("history fetch failed for {}: {}", spec.entity, e);
                    Vec::new()
                }
            }
        };
        transform::build_series(spec, slot, points)
    }

    async fn shutdown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.surface.lock().await.take();
        self.manager.lock().await.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render_adapter::RenderAdapter;
    use crate::domain::options::{ChartOptions, Theme};
    use crate::domain::records::{StateRecord, StatisticRecord, StatisticsPeriod};
    use crate::infrastructure::memory_source::InMemorySource;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct SnapshotAdapter {
        snapshots: Arc<StdMutex<Vec<Vec<Series>>>>,
        mounts: Arc<StdMutex<Vec<Theme>>>,
    }

    impl RenderAdapter for SnapshotAdapter {
        fn mount(&mut self, _surface: &Surface, options: &ChartOptions) {
            self.mounts.lock().unwrap().push(options.theme);
        }

        fn update_series(&mut self, series: &[Series]) {
            self.snapshots.lock().unwrap().push(series.to_vec());
        }

        fn destroy(&mut self) {}
    }

    #[derive(Default)]
    struct SnapshotFactory {
        snapshots: Arc<StdMutex<Vec<Vec<Series>>>>,
        mounts: Arc<StdMutex<Vec<Theme>>>,
    }

    impl AdapterFactory for SnapshotFactory {
        fn build(&self) -> Box<dyn RenderAdapter> {
            Box::new(SnapshotAdapter {
                snapshots: self.snapshots.clone(),
                mounts: self.mounts.clone(),
            })
        }
    }

    /// A source whose fetches block until the test releases them.
    struct GatedSource {
        gate: Arc<Notify>,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TimeSeriesSource for GatedSource {
        async fn fetch_history(
            &self,
            _entity_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> anyhow::Result<Vec<StateRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(Vec::new())
        }

        async fn fetch_statistics(
            &self,
            _entity_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _period: StatisticsPeriod,
        ) -> anyhow::Result<Vec<StatisticRecord>> {
            anyhow::bail!("not used in this test")
        }
    }

    fn entity(id: &str) -> EntitySpec {
        EntitySpec {
            entity: id.to_string(),
            name: None,
            color: None,
            unit: None,
            kind: None,
            attribute: None,
            axis_id: None,
            statistics: None,
            show: true,
        }
    }

    fn config(entities: Vec<EntitySpec>) -> PanelConfig {
        PanelConfig {
            entities,
            ..PanelConfig::default()
        }
    }

    fn surface() -> Surface {
        Surface {
            id: "panel".to_string(),
            width: 800,
            height: 300,
        }
    }

    fn populated_source() -> InMemorySource {
        let t = Utc::now() - ChronoDuration::minutes(5);
        InMemorySource::new().with_history(
            "sensor.temp",
            vec![StateRecord {
                state: "21.5".to_string(),
                last_changed: t,
                attributes: HashMap::new(),
            }],
        )
    }

    #[test]
    fn test_zero_entities_rejected_at_construction() {
        let snapshots = Arc::new(StdMutex::new(Vec::new()));
        let result = ChartPanel::new(
            config(Vec::new()),
            Arc::new(InMemorySource::new()),
            Arc::new(SnapshotFactory {
                snapshots,
                ..SnapshotFactory::default()
            }),
        );
        assert!(matches!(result, Err(ChartError::NoEntities)));
    }

    #[tokio::test]
    async fn test_missing_entity_yields_empty_series_others_render() {
        let snapshots = Arc::new(StdMutex::new(Vec::new()));
        let mut panel = ChartPanel::new(
            config(vec![entity("sensor.temp"), entity("sensor.missing")]),
            Arc::new(populated_source()),
            Arc::new(SnapshotFactory {
                snapshots: snapshots.clone(),
                ..SnapshotFactory::default()
            }),
        )
        .unwrap();

        panel.attach(Some(surface()), "default").await.unwrap();
        panel.refresh_now().await;
        panel.detach().await;

        let snapshots = snapshots.lock().unwrap();
        let snapshot = snapshots.first().expect("at least one snapshot applied");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "sensor.temp");
        assert_eq!(snapshot[0].data.len(), 1);
        assert_eq!(snapshot[1].name, "sensor.missing");
        assert!(snapshot[1].data.is_empty());
    }

    #[tokio::test]
    async fn test_attach_without_surface_fails_and_starts_nothing() {
        let snapshots = Arc::new(StdMutex::new(Vec::new()));
        let mut panel = ChartPanel::new(
            config(vec![entity("sensor.temp")]),
            Arc::new(populated_source()),
            Arc::new(SnapshotFactory {
                snapshots: snapshots.clone(),
                ..SnapshotFactory::default()
            }),
        )
        .unwrap();

        assert_eq!(
            panel.attach(None, "default").await,
            Err(ChartError::SurfaceNotFound)
        );
        assert!(!panel.scheduler.is_running());
    }

    #[tokio::test]
    async fn test_refresh_in_flight_coalesces_new_requests() {
        let gate = Arc::new(Notify::new());
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(GatedSource {
            gate: gate.clone(),
            fetches: fetches.clone(),
        });
        let snapshots = Arc::new(StdMutex::new(Vec::new()));
        let panel = ChartPanel::new(
            config(vec![entity("sensor.temp")]),
            source,
            Arc::new(SnapshotFactory {
                snapshots: snapshots.clone(),
                ..SnapshotFactory::default()
            }),
        )
        .unwrap();
        // Mount without starting the timer so only explicit refreshes run.
        let options = panel.inner.config.chart_options(&panel.inner.axes, "default");
        panel
            .inner
            .manager
            .lock()
            .await
            .initialize(Some(surface()), &options)
            .unwrap();

        let running = tokio::spawn(PanelInner::refresh(panel.inner.clone()));
        tokio::task::yield_now().await;

        // Lands while the first cycle is blocked on its fetch.
        panel.refresh_now().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        gate.notify_one();
        running.await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(snapshots.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_resolving_after_detach_is_discarded() {
        let gate = Arc::new(Notify::new());
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(GatedSource {
            gate: gate.clone(),
            fetches,
        });
        let snapshots = Arc::new(StdMutex::new(Vec::new()));
        let mut panel = ChartPanel::new(
            config(vec![entity("sensor.temp")]),
            source,
            Arc::new(SnapshotFactory {
                snapshots: snapshots.clone(),
                ..SnapshotFactory::default()
            }),
        )
        .unwrap();
        let options = panel.inner.config.chart_options(&panel.inner.axes, "default");
        panel
            .inner
            .manager
            .lock()
            .await
            .initialize(Some(surface()), &options)
            .unwrap();

        let running = tokio::spawn(PanelInner::refresh(panel.inner.clone()));
        tokio::task::yield_now().await;

        // Tear down while the fetch is still in flight, then let it resolve.
        panel.detach().await;
        gate.notify_one();
        running.await.unwrap();

        assert!(snapshots.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detach_is_idempotent() {
        let snapshots = Arc::new(StdMutex::new(Vec::new()));
        let mut panel = ChartPanel::new(
            config(vec![entity("sensor.temp")]),
            Arc::new(populated_source()),
            Arc::new(SnapshotFactory {
                snapshots,
                ..SnapshotFactory::default()
            }),
        )
        .unwrap();
        panel.attach(Some(surface()), "default").await.unwrap();
        panel.detach().await;
        panel.detach().await;
        assert!(panel.inner.manager.lock().await.is_destroyed());
    }

    #[tokio::test]
    async fn test_panel_can_reattach_after_detach() {
        let snapshots = Arc::new(StdMutex::new(Vec::new()));
        let mounts = Arc::new(StdMutex::new(Vec::new()));
        let mut panel = ChartPanel::new(
            config(vec![entity("sensor.temp")]),
            Arc::new(populated_source()),
            Arc::new(SnapshotFactory {
                snapshots: snapshots.clone(),
                mounts: mounts.clone(),
            }),
        )
        .unwrap();

        panel.attach(Some(surface()), "default").await.unwrap();
        panel.detach().await;
        panel.attach(Some(surface()), "default").await.unwrap();

        panel.refresh_now().await;
        panel.detach().await;

        assert_eq!(mounts.lock().unwrap().len(), 2);
        // The cycle run after the second attach still reaches the adapter.
        let snapshots = snapshots.lock().unwrap();
        assert!(!snapshots.is_empty());
        assert_eq!(snapshots.last().unwrap()[0].name, "sensor.temp");
    }

    #[tokio::test]
    async fn test_set_theme_remounts_with_resolved_theme() {
        let snapshots = Arc::new(StdMutex::new(Vec::new()));
        let mounts = Arc::new(StdMutex::new(Vec::new()));
        let mut panel = ChartPanel::new(
            config(vec![entity("sensor.temp")]),
            Arc::new(populated_source()),
            Arc::new(SnapshotFactory {
                snapshots: snapshots.clone(),
                mounts: mounts.clone(),
            }),
        )
        .unwrap();

        panel.attach(Some(surface()), "default").await.unwrap();
        panel.set_theme("dark-slate").await.unwrap();

        // The remounted chart keeps rendering snapshots.
        panel.refresh_now().await;
        panel.detach().await;

        assert_eq!(*mounts.lock().unwrap(), vec![Theme::Light, Theme::Dark]);
        assert!(!snapshots.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_theme_while_detached_is_a_no_op() {
        let mounts = Arc::new(StdMutex::new(Vec::new()));
        let panel = ChartPanel::new(
            config(vec![entity("sensor.temp")]),
            Arc::new(populated_source()),
            Arc::new(SnapshotFactory {
                snapshots: Arc::new(StdMutex::new(Vec::new())),
                mounts: mounts.clone(),
            }),
        )
        .unwrap();

        panel.set_theme("dark-slate").await.unwrap();
        assert!(mounts.lock().unwrap().is_empty());
    }
}
