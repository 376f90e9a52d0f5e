//! Battery level estimation
//!
//! Nest Protect units report `battery_level` either as a ready-made
//! percentage or as the raw battery voltage in millivolts. Voltages are
//! mapped to a percentage through a piecewise-linear discharge curve.

/// One linear segment of the voltage discharge curve.
///
/// Covers readings in `(lower_mv, upper_mv]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationBand {
    pub lower_mv: f64,
    pub upper_mv: f64,
    pub slope: f64,
    pub intercept: f64,
}

impl CalibrationBand {
    /// Whether `reading` falls inside this band (open left, closed right)
    pub fn contains(&self, reading: f64) -> bool {
        self.lower_mv < reading && reading <= self.upper_mv
    }

    /// Percentage for `reading` on this segment, rounded and clamped to 0..=100
    pub fn percentage(&self, reading: f64) -> f64 {
        let raw = (self.slope * reading + self.intercept) * 100.0;
        raw.round_ties_even().clamp(0.0, 100.0)
    }
}

/// Readings at or below this are already percentages
pub const PERCENTAGE_MAX: f64 = 100.0;

/// Discharge curve, checked in order; first match wins.
pub const CALIBRATION_BANDS: [CalibrationBand; 4] = [
    CalibrationBand {
        lower_mv: 4950.0,
        upper_mv: 6000.0,
        slope: 0.001816609,
        intercept: -8.548096886,
    },
    CalibrationBand {
        lower_mv: 4800.0,
        upper_mv: 4950.0,
        slope: 0.000291667,
        intercept: -0.991176471,
    },
    CalibrationBand {
        lower_mv: 4500.0,
        upper_mv: 4800.0,
        slope: 0.001077342,
        intercept: -4.730392157,
    },
    CalibrationBand {
        lower_mv: 3000.0,
        upper_mv: 4500.0,
        slope: 0.000434641,
        intercept: -1.825490196,
    },
];

/// Estimate the battery percentage for a raw `battery_level` reading.
///
/// Returns `None` for readings that are neither a percentage nor a voltage
/// inside the calibrated range (100 < reading <= 3000, reading > 6000, NaN).
pub fn battery_level(reading: f64) -> Option<f64> {
    let result = if reading <= PERCENTAGE_MAX {
        Some(reading)
    } else {
        CALIBRATION_BANDS
            .iter()
            .find(|band| band.contains(reading))
            .map(|band| band.percentage(reading))
    };

    tracing::debug!(
        "Battery level: raw / calc: {} -> {}",
        reading,
        result.map_or_else(|| "unknown".to_string(), |r| r.to_string())
    );

    result
}
