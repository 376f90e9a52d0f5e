//! Shared utilities for nest-protect-sensors

use crate::sensors::{RenderedValue, Unit};

/// Format a rendered value with its unit for display
pub fn format_with_unit(value: &RenderedValue, unit: Option<Unit>) -> String {
    match (value, unit) {
        (RenderedValue::Unknown, _) | (_, None) => value.to_string(),
        (_, Some(Unit::Percentage)) => format!("{}%", value),
        (_, Some(unit)) => format!("{} {}", value, unit.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_unit() {
        assert_eq!(
            format_with_unit(&RenderedValue::Percentage(53.0), Some(Unit::Percentage)),
            "53%"
        );
        assert_eq!(
            format_with_unit(&RenderedValue::Temperature(21.46), Some(Unit::Celsius)),
            "21.46 °C"
        );
        assert_eq!(
            format_with_unit(&RenderedValue::Unknown, Some(Unit::Celsius)),
            "unknown"
        );
    }
}
