// Normalized series domain models - the value types every layer shares
use serde::Deserialize;

/// One normalized observation. `value` is always finite in a finalized
/// series; points that cannot be resolved to a finite number are dropped
/// by the transformation pipeline, never coerced to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl DataPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// Physical value-axis slot. Rendering backends expose exactly two;
/// logical axis ids are reconciled down to these by the axis mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisSlot {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Area,
    Bar,
}

/// One entity's series for one update cycle. A value object: rebuilt whole
/// on every cycle, never mutated in place.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub data: Vec<DataPoint>,
    pub color: Option<String>,
    pub kind: Option<ChartKind>,
    pub unit: Option<String>,
    pub show: bool,
    pub axis: AxisSlot,
}
