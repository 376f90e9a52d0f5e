//! nest-protect-sensors: Nest Protect device state as sensor entities
//!
//! Maps the fields a Nest Protect smoke/CO detector reports to sensors:
//! - battery_level: percentage, estimated from millivolts when needed
//! - replace_by_date_utc_secs: replacement date as a UTC timestamp
//! - current_temperature: degrees Celsius, two decimals
//!
//! Device discovery, entity registration and updates belong to the host; this
//! crate only decides which fields become sensors and what value they show.

pub mod config;
pub mod error;
pub mod sensors;
pub mod shared;

pub use config::Config;
pub use error::{Result, SensorError};
pub use sensors::{
    battery_level, discover_sensors, resolve_sensors, Bucket, DeviceState, RenderedValue, SensorDescriptor,
    SensorDescriptorTable, SensorEntity,
};
