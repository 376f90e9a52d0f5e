//! Device state access and sensor entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::descriptor::{SensorDescriptor, SensorDescriptorTable};
use super::value::RenderedValue;
use crate::config::Config;
use crate::error::Result;

/// Read-only view of one device's reported state, provided by the host
pub trait DeviceState {
    /// Stable identifier of the device
    fn device_id(&self) -> &str;

    /// Names of all fields the device currently reports
    fn field_names(&self) -> Vec<&str>;

    /// Current raw value of a field, if reported
    fn raw_value(&self, key: &str) -> Option<&Value>;
}

/// A device state object as delivered by the Nest cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    /// e.g. `topaz.18B43000418C356F`
    pub object_key: String,
    #[serde(default)]
    pub object_revision: Option<i64>,
    #[serde(default)]
    pub object_timestamp: Option<i64>,
    #[serde(default)]
    pub value: Map<String, Value>,
}

impl DeviceState for Bucket {
    fn device_id(&self) -> &str {
        &self.object_key
    }

    fn field_names(&self) -> Vec<&str> {
        self.value.keys().map(String::as_str).collect()
    }

    fn raw_value(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }
}

/// One device field exposed as a sensor
#[derive(Debug, Clone)]
pub struct SensorEntity {
    pub device_id: String,
    pub descriptor: &'static SensorDescriptor,
}

impl SensorEntity {
    pub fn new(device_id: impl Into<String>, descriptor: &'static SensorDescriptor) -> Self {
        Self {
            device_id: device_id.into(),
            descriptor,
        }
    }

    pub fn unique_id(&self) -> String {
        format!("{}-{}", self.device_id, self.descriptor.key)
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn key(&self) -> &'static str {
        self.descriptor.key
    }

    /// Current value, read fresh from `state` on every call
    pub fn native_value(&self, state: &dyn DeviceState) -> Result<RenderedValue> {
        self.descriptor.resolve(state.raw_value(self.descriptor.key))
    }
}

/// Create an entity for every reported field that has a description and is
/// not disabled in `config`
pub fn discover_sensors<'a, D, I>(
    table: &SensorDescriptorTable,
    config: &Config,
    devices: I,
) -> Vec<SensorEntity>
where
    D: DeviceState + 'a,
    I: IntoIterator<Item = &'a D>,
{
    let mut entities = Vec::new();

    for device in devices {
        for key in device.field_names() {
            let Some(descriptor) = table.get(key) else {
                continue;
            };

            if !config.is_enabled(key) {
                tracing::debug!("Skipping disabled sensor {} on {}", key, device.device_id());
                continue;
            }

            entities.push(SensorEntity::new(device.device_id(), descriptor));
        }
    }

    tracing::info!("Discovered {} sensor entities", entities.len());
    entities
}

/// Discover sensors and read each one's value from the device it came from.
///
/// Devices are not matched up again by id, so dumps that repeat an
/// `object_key` still resolve every entity against its own state.
pub fn resolve_sensors<'a, D, I>(
    table: &SensorDescriptorTable,
    config: &Config,
    devices: I,
) -> Vec<(SensorEntity, Result<RenderedValue>)>
where
    D: DeviceState + 'a,
    I: IntoIterator<Item = &'a D>,
{
    devices
        .into_iter()
        .flat_map(|device| {
            discover_sensors(table, config, std::iter::once(device))
                .into_iter()
                .map(move |entity| {
                    let value = entity.native_value(device);
                    (entity, value)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorError;
    use serde_json::json;

    fn bucket(object_key: &str, value: Value) -> Bucket {
        serde_json::from_value(json!({
            "object_key": object_key,
            "object_revision": 12,
            "object_timestamp": 1_700_000_000_000_i64,
            "value": value,
        }))
        .unwrap()
    }

    fn protect() -> Bucket {
        bucket(
            "topaz.18B43000418C356F",
            json!({
                "battery_level": 5000,
                "replace_by_date_utc_secs": 1_700_000_000,
                "current_temperature": 21.456,
                "co_status": 0,
                "smoke_status": 0,
                "serial_number": "06AA01AC",
            }),
        )
    }

    #[test]
    fn test_bucket_deserialize_minimal() {
        let bucket: Bucket = serde_json::from_value(json!({ "object_key": "topaz.1" })).unwrap();
        assert_eq!(bucket.device_id(), "topaz.1");
        assert!(bucket.field_names().is_empty());
        assert!(bucket.object_revision.is_none());
    }

    #[test]
    fn test_discover_only_described_fields() {
        let devices = [protect()];
        let entities =
            discover_sensors(SensorDescriptorTable::builtin(), &Config::default(), &devices);

        let mut keys: Vec<_> = entities.iter().map(SensorEntity::key).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["battery_level", "current_temperature", "replace_by_date_utc_secs"]
        );
        assert!(entities
            .iter()
            .all(|e| e.device_id == "topaz.18B43000418C356F"));
    }

    #[test]
    fn test_discover_multiple_devices() {
        let devices = [
            protect(),
            bucket("topaz.2", json!({ "battery_level": 92 })),
            bucket("topaz.3", json!({ "wifi_ip_address": "10.0.0.4" })),
        ];
        let entities =
            discover_sensors(SensorDescriptorTable::builtin(), &Config::default(), &devices);

        assert_eq!(entities.len(), 4);
        assert_eq!(entities[3].unique_id(), "topaz.2-battery_level");
    }

    #[test]
    fn test_discover_respects_config() {
        let mut config = Config::default();
        config.disable("current_temperature");

        let devices = [protect()];
        let entities = discover_sensors(SensorDescriptorTable::builtin(), &config, &devices);

        assert_eq!(entities.len(), 2);
        assert!(entities.iter().all(|e| e.key() != "current_temperature"));
    }

    #[test]
    fn test_native_value() {
        let device = protect();
        let table = SensorDescriptorTable::builtin();

        let battery = SensorEntity::new(device.device_id(), table.get("battery_level").unwrap());
        assert_eq!(battery.name(), "Battery Level");
        assert_eq!(
            battery.native_value(&device).unwrap(),
            RenderedValue::Percentage(53.0)
        );

        let replace_by = SensorEntity::new(
            device.device_id(),
            table.get("replace_by_date_utc_secs").unwrap(),
        );
        assert_eq!(
            replace_by.native_value(&device).unwrap().to_string(),
            "2023-11-14T22:13:20Z"
        );
    }

    #[test]
    fn test_resolve_sensors_repeated_device_id() {
        let devices = [
            bucket("topaz.2", json!({ "battery_level": 92 })),
            bucket("topaz.2", json!({ "battery_level": 41, "current_temperature": 20.125 })),
        ];
        let resolved =
            resolve_sensors(SensorDescriptorTable::builtin(), &Config::default(), &devices);

        let values: Vec<_> = resolved
            .iter()
            .map(|(entity, value)| (entity.key(), value.as_ref().unwrap().clone()))
            .collect();
        assert_eq!(
            values,
            [
                ("battery_level", RenderedValue::Percentage(92.0)),
                ("battery_level", RenderedValue::Percentage(41.0)),
                ("current_temperature", RenderedValue::Temperature(20.12)),
            ]
        );
    }

    #[test]
    fn test_resolve_sensors_keeps_errors_per_entity() {
        let devices = [bucket(
            "topaz.1",
            json!({ "battery_level": "low", "current_temperature": 19.5 }),
        )];
        let resolved =
            resolve_sensors(SensorDescriptorTable::builtin(), &Config::default(), &devices);

        assert_eq!(resolved.len(), 2);
        assert!(matches!(resolved[0].1, Err(SensorError::NotNumeric { .. })));
        assert_eq!(resolved[1].1.as_ref().unwrap(), &RenderedValue::Temperature(19.5));
    }

    #[test]
    fn test_native_value_follows_device_state() {
        let mut device = bucket("topaz.2", json!({ "battery_level": 92 }));
        let battery = SensorEntity::new(
            "topaz.2",
            SensorDescriptorTable::builtin().get("battery_level").unwrap(),
        );
        assert_eq!(
            battery.native_value(&device).unwrap(),
            RenderedValue::Percentage(92.0)
        );

        device.value.insert("battery_level".into(), json!(6500));
        assert!(battery.native_value(&device).unwrap().is_unknown());

        device.value.remove("battery_level");
        assert!(battery.native_value(&device).unwrap().is_unknown());

        device.value.insert("battery_level".into(), json!(true));
        assert!(matches!(
            battery.native_value(&device),
            Err(SensorError::NotNumeric { .. })
        ));
    }
}
