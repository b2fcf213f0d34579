// Raw upstream record shapes - event-based history and periodic aggregates
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Sentinel states that carry no numeric information. Records with these
/// states are skipped before any value extraction is attempted.
pub const UNKNOWN_STATES: [&str; 2] = ["unknown", "unavailable"];

/// One event-triggered observation of an entity's state.
#[derive(Debug, Clone)]
pub struct StateRecord {
    pub state: String,
    pub last_changed: DateTime<Utc>,
    pub attributes: HashMap<String, serde_json::Value>,
}

/// One pre-aggregated summary of an entity's values over a fixed period.
/// Any field may be absent for a given record; the transformer's fallback
/// chain decides what survives.
#[derive(Debug, Clone, Default)]
pub struct StatisticRecord {
    pub start: DateTime<Utc>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub sum: Option<f64>,
    pub state: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticKind {
    Min,
    Max,
    #[default]
    Mean,
    Sum,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsPeriod {
    FiveMinute,
    #[default]
    Hour,
    Day,
    Month,
}

impl StatisticsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticsPeriod::FiveMinute => "5minute",
            StatisticsPeriod::Hour => "hour",
            StatisticsPeriod::Day => "day",
            StatisticsPeriod::Month => "month",
        }
    }
}
