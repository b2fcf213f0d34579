// REST client for the upstream history/statistics provider
use crate::application::data_source::TimeSeriesSource;
use crate::domain::records::{StateRecord, StatisticRecord, StatisticsPeriod};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Speaks the provider's JSON history/statistics API. Rows that fail to
/// parse are skipped rather than failing the whole fetch; the provider is
/// the one source of record ordering and the response is taken as-is.
#[derive(Debug, Clone)]
pub struct RestApiSource {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RawStateRow {
    state: String,
    last_changed: String,
    #[serde(default)]
    attributes: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawStatisticRow {
    start: String,
    min: Option<f64>,
    max: Option<f64>,
    mean: Option<f64>,
    sum: Option<f64>,
    state: Option<f64>,
}

impl RestApiSource {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to the time-series provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("provider request failed with status {}: {}", status, body);
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse provider response")
    }

    fn window_query(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "start={}&end={}",
            urlencoding::encode(&start.to_rfc3339()),
            urlencoding::encode(&end.to_rfc3339())
        )
    }
}

#[async_trait]
impl TimeSeriesSource for RestApiSource {
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StateRecord>> {
        let url = format!(
            "{}/api/history/{}?{}",
            self.base_url,
            urlencoding::encode(entity_id),
            Self::window_query(start, end)
        );
        let rows: Vec<RawStateRow> = self.get(&url).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match DateTime::parse_from_rfc3339(&row.last_changed) {
                Ok(time) => records.push(StateRecord {
                    state: row.state,
                    last_changed: time.with_timezone(&Utc),
                    attributes: row.attributes,
                }),
                Err(e) => {
                    tracing::debug!("skipping history row with bad timestamp for {}: {}", entity_id, e);
                }
            }
        }
        Ok(records)
    }

    async fn fetch_statistics(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        period: StatisticsPeriod,
    ) -> Result<Vec<StatisticRecord>> {
        let url = format!(
            "{}/api/statistics/{}?{}&period={}",
            self.base_url,
            urlencoding::encode(entity_id),
            Self::window_query(start, end),
            period.as_str()
        );
        let rows: Vec<RawStatisticRow> = self.get(&url).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match DateTime::parse_from_rfc3339(&row.start) {
                Ok(time) => records.push(StatisticRecord {
                    start: time.with_timezone(&Utc),
                    min: row.min,
                    max: row.max,
                    mean: row.mean,
                    sum: row.sum,
                    state: row.state,
                }),
                Err(e) => {
                    tracing::debug!("skipping statistic row with bad timestamp for {}: {}", entity_id, e);
                }
            }
        }
        Ok(records)
    }
}
