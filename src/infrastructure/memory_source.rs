// In-memory time-series source for demos and tests
use crate::application::data_source::TimeSeriesSource;
use crate::domain::records::{StateRecord, StatisticRecord, StatisticsPeriod};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Serves pre-loaded records filtered to the requested window. Entities
/// that were never loaded fail the fetch, the same way a live provider
/// fails an unknown entity id.
#[derive(Debug, Default)]
pub struct InMemorySource {
    history: HashMap<String, Vec<StateRecord>>,
    statistics: HashMap<String, Vec<StatisticRecord>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, entity_id: &str, records: Vec<StateRecord>) -> Self {
        self.history.insert(entity_id.to_string(), records);
        self
    }

    pub fn with_statistics(mut self, entity_id: &str, records: Vec<StatisticRecord>) -> Self {
        self.statistics.insert(entity_id.to_string(), records);
        self
    }
}

#[async_trait]
impl TimeSeriesSource for InMemorySource {
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<StateRecord>> {
        let records = self
            .history
            .get(entity_id)
            .ok_or_else(|| anyhow::anyhow!("entity {} not found", entity_id))?;
        Ok(records
            .iter()
            .filter(|r| r.last_changed >= start && r.last_changed <= end)
            .cloned()
            .collect())
    }

    async fn fetch_statistics(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _period: StatisticsPeriod,
    ) -> anyhow::Result<Vec<StatisticRecord>> {
        let records = self
            .statistics
            .get(entity_id)
            .ok_or_else(|| anyhow::anyhow!("entity {} not found", entity_id))?;
        Ok(records
            .iter()
            .filter(|r| r.start >= start && r.start <= end)
            .cloned()
            .collect())
    }
}
