// Trait for the upstream time-series provider
use crate::domain::records::{StateRecord, StatisticRecord, StatisticsPeriod};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The two query shapes the panel consumes. Both return records in
/// chronological order and may fail independently per entity; a failed
/// fetch costs that entity its series for the cycle, nothing more.
#[async_trait]
pub trait TimeSeriesSource: Send + Sync {
    /// Raw state history for one entity over a time window.
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<StateRecord>>;

    /// Pre-aggregated statistics for one entity over a time window.
    async fn fetch_statistics(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        period: StatisticsPeriod,
    ) -> anyhow::Result<Vec<StatisticRecord>>;
}
