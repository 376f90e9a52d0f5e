//! Sensors module - device fields exposed as sensor entities

pub mod battery;
pub mod descriptor;
pub mod entity;
pub mod value;

pub use battery::{battery_level, CalibrationBand, CALIBRATION_BANDS};
pub use descriptor::{
    DeviceClass, EntityCategory, SensorDescriptor, SensorDescriptorTable, Unit,
    SENSOR_DESCRIPTIONS,
};
pub use entity::{discover_sensors, resolve_sensors, Bucket, DeviceState, SensorEntity};
pub use value::{render_battery, render_date, render_temperature, RenderedValue};
