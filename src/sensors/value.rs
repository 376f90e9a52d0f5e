//! Rendered sensor values and the per-field transforms that produce them

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::battery::battery_level;

/// Value handed back to the host for a sensor entity.
///
/// Serializes as a plain JSON value: numbers, an RFC 3339 string for
/// timestamps, the untouched raw value, or `null` when unknown. Whole
/// percentages serialize as integers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderedValue {
    #[serde(serialize_with = "serialize_percentage")]
    Percentage(f64),
    Timestamp(DateTime<Utc>),
    Temperature(f64),
    /// Passed through from the device unchanged
    Raw(Value),
    Unknown,
}

impl RenderedValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, RenderedValue::Unknown)
    }
}

impl fmt::Display for RenderedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedValue::Percentage(v) | RenderedValue::Temperature(v) => write!(f, "{}", v),
            RenderedValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%SZ")),
            RenderedValue::Raw(v) => write!(f, "{}", v),
            RenderedValue::Unknown => f.write_str("unknown"),
        }
    }
}

fn serialize_percentage<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

// === Transforms ===

/// `battery_level` field: percentage or millivolts to a percentage
pub fn render_battery(reading: f64) -> RenderedValue {
    battery_level(reading).map_or(RenderedValue::Unknown, RenderedValue::Percentage)
}

/// `replace_by_date_utc_secs` field: seconds since the Unix epoch to a UTC timestamp
pub fn render_date(epoch_secs: f64) -> RenderedValue {
    if !epoch_secs.is_finite() {
        return RenderedValue::Unknown;
    }

    let secs = epoch_secs.floor();
    let nanos = ((epoch_secs - secs) * 1_000_000_000.0) as u32;

    DateTime::<Utc>::from_timestamp(secs as i64, nanos)
        .map_or(RenderedValue::Unknown, RenderedValue::Timestamp)
}

/// `current_temperature` field: degrees Celsius rounded to two decimals
pub fn render_temperature(celsius: f64) -> RenderedValue {
    if !celsius.is_finite() {
        return RenderedValue::Unknown;
    }
    RenderedValue::Temperature(round_half_even(celsius, 2))
}

/// Round to `digits` decimals, deciding on the exact binary value of `value`
/// with ties going to the even neighbour.
///
/// `value * 10^digits` is inexact, so the candidate is only a starting point;
/// the midpoint comparison is done with a fused multiply-add, which keeps the
/// sign of `value * 2 * 10^digits - (2n + 1)` exact.
fn round_half_even(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    let n = (value * scale).floor();
    let diff = value.mul_add(2.0 * scale, -(2.0 * n + 1.0));

    let k = if diff > 0.0 {
        n + 1.0
    } else if diff < 0.0 {
        n
    } else if n % 2.0 == 0.0 {
        n
    } else {
        n + 1.0
    };

    k / scale
}
