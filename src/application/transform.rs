// Raw history/statistics records -> normalized series, one pass per entity
use crate::domain::records::{StateRecord, StatisticKind, StatisticRecord, UNKNOWN_STATES};
use crate::domain::series::{AxisSlot, DataPoint, Series};
use crate::infrastructure::config::EntitySpec;

/// History mode: one point per usable state record, `x = last_changed`.
/// Sentinel states are skipped outright; everything else must resolve to a
/// finite number (from the configured attribute, or by parsing the state
/// string) or the record is dropped. No resampling, no interpolation:
/// sparse input yields sparse output, in upstream order.
pub fn history_points(spec: &EntitySpec, records: &[StateRecord]) -> Vec<DataPoint> {
    records
        .iter()
        .filter_map(|record| {
            if UNKNOWN_STATES.contains(&record.state.as_str()) {
                return None;
            }
            let value = match &spec.attribute {
                Some(attribute) => attribute_value(record, attribute),
                None => record.state.parse::<f64>().ok(),
            }?;
            if !value.is_finite() {
                return None;
            }
            Some(DataPoint::new(record.last_changed.timestamp_millis(), value))
        })
        .collect()
}

fn attribute_value(record: &StateRecord, attribute: &str) -> Option<f64> {
    match record.attributes.get(attribute)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// Statistics mode: one point per usable aggregate record, `x = start`.
/// A record is dropped only when the whole fallback chain comes up empty.
pub fn statistic_points(kind: StatisticKind, records: &[StatisticRecord]) -> Vec<DataPoint> {
    records
        .iter()
        .filter_map(|record| {
            let value = select_statistic(record, kind)?;
            Some(DataPoint::new(record.start.timestamp_millis(), value))
        })
        .collect()
}

/// Field selection with the documented fallback chain: the configured kind,
/// then `mean`, then `state`. Non-finite values count as absent.
fn select_statistic(record: &StatisticRecord, kind: StatisticKind) -> Option<f64> {
    let selected = match kind {
        StatisticKind::Min => record.min,
        StatisticKind::Max => record.max,
        StatisticKind::Mean => record.mean,
        StatisticKind::Sum => record.sum,
        StatisticKind::State => record.state,
    };
    selected
        .filter(|v| v.is_finite())
        .or_else(|| record.mean.filter(|v| v.is_finite()))
        .or_else(|| record.state.filter(|v| v.is_finite()))
}

/// Attach the entity's display configuration and resolved axis slot to a
/// finished point sequence. A failed or missing entity passes an empty
/// `data` here, so the series still exists and the cycle never aborts.
pub fn build_series(spec: &EntitySpec, slot: AxisSlot, data: Vec<DataPoint>) -> Series {
    Series {
        name: spec.name.clone().unwrap_or_else(|| spec.entity.clone()),
        data,
        color: spec.color.clone(),
        kind: spec.kind,
        unit: spec.unit.clone(),
        show: spec.show,
        axis: slot,
    }
}
