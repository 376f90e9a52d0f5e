//! Sensor descriptions - which device fields become sensors and how they render

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use super::value::{render_battery, render_date, render_temperature, RenderedValue};
use crate::error::{Result, SensorError};

/// Unit of measurement shown next to the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percentage,
    Celsius,
}

impl Unit {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Unit::Percentage => "%",
            Unit::Celsius => "°C",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Battery,
    Date,
    Temperature,
}

impl DeviceClass {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Battery => "battery",
            DeviceClass::Date => "date",
            DeviceClass::Temperature => "temperature",
        }
    }
}

/// Primary sensors show up on the device page, diagnostic ones are tucked away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCategory {
    Primary,
    Diagnostic,
}

impl EntityCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Primary => "primary",
            EntityCategory::Diagnostic => "diagnostic",
        }
    }
}

/// Describes how one raw device field is presented as a sensor
#[derive(Debug, Clone, Copy)]
pub struct SensorDescriptor {
    /// Field name in the device state
    pub key: &'static str,
    pub name: &'static str,
    pub value_fn: Option<fn(f64) -> RenderedValue>,
    pub unit: Option<Unit>,
    pub device_class: DeviceClass,
    pub entity_category: EntityCategory,
}

impl SensorDescriptor {
    /// Render the current raw value of this descriptor's field.
    ///
    /// Missing and `null` values are unknown. A value that is not a number is
    /// an error when the descriptor has a transform; without one the value is
    /// passed through untouched.
    pub fn resolve(&self, raw: Option<&Value>) -> Result<RenderedValue> {
        let raw = match raw {
            None | Some(Value::Null) => return Ok(RenderedValue::Unknown),
            Some(raw) => raw,
        };

        let Some(value_fn) = self.value_fn else {
            return Ok(RenderedValue::Raw(raw.clone()));
        };

        match raw.as_f64() {
            Some(reading) => Ok(value_fn(reading)),
            None => Err(SensorError::NotNumeric {
                key: self.key,
                value: raw.clone(),
            }),
        }
    }
}

/// Built-in sensors, in presentation order
pub static SENSOR_DESCRIPTIONS: &[SensorDescriptor] = &[
    SensorDescriptor {
        key: "battery_level",
        name: "Battery Level",
        value_fn: Some(render_battery),
        unit: Some(Unit::Percentage),
        device_class: DeviceClass::Battery,
        entity_category: EntityCategory::Diagnostic,
    },
    SensorDescriptor {
        key: "replace_by_date_utc_secs",
        name: "Replace By",
        value_fn: Some(render_date),
        unit: None,
        device_class: DeviceClass::Date,
        entity_category: EntityCategory::Diagnostic,
    },
    SensorDescriptor {
        key: "current_temperature",
        name: "Temperature",
        value_fn: Some(render_temperature),
        unit: Some(Unit::Celsius),
        device_class: DeviceClass::Temperature,
        entity_category: EntityCategory::Primary,
    },
];

/// Key-indexed view over a fixed list of descriptors.
///
/// Lookups resolve to the first descriptor declared for a key. [`new`]
/// refuses lists with duplicate keys, so that only matters for tables built
/// from known-good lists.
///
/// [`new`]: SensorDescriptorTable::new
#[derive(Debug)]
pub struct SensorDescriptorTable {
    descriptors: &'static [SensorDescriptor],
    by_key: HashMap<&'static str, usize>,
}

impl SensorDescriptorTable {
    /// Build a table, rejecting duplicate keys
    pub fn new(descriptors: &'static [SensorDescriptor]) -> Result<Self> {
        if let Some(key) = duplicate_key(descriptors) {
            return Err(SensorError::DuplicateKey(key));
        }
        Ok(Self::index(descriptors))
    }

    /// Table of the built-in sensors, built on first use
    pub fn builtin() -> &'static SensorDescriptorTable {
        static TABLE: OnceLock<SensorDescriptorTable> = OnceLock::new();
        TABLE.get_or_init(|| Self::index(SENSOR_DESCRIPTIONS))
    }

    fn index(descriptors: &'static [SensorDescriptor]) -> Self {
        let mut by_key = HashMap::with_capacity(descriptors.len());
        for (i, descriptor) in descriptors.iter().enumerate() {
            by_key.entry(descriptor.key).or_insert(i);
        }
        Self {
            descriptors,
            by_key,
        }
    }

    pub fn get(&self, key: &str) -> Option<&'static SensorDescriptor> {
        let descriptors = self.descriptors;
        self.by_key.get(key).map(|&i| &descriptors[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static SensorDescriptor> {
        let descriptors = self.descriptors;
        descriptors.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        let descriptors = self.descriptors;
        descriptors.iter().map(|d| d.key)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn duplicate_key(descriptors: &[SensorDescriptor]) -> Option<&'static str> {
    descriptors.iter().enumerate().find_map(|(i, d)| {
        descriptors[..i]
            .iter()
            .any(|earlier| earlier.key == d.key)
            .then_some(d.key)
    })
}
