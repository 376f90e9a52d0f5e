//! Error types for sensor resolution

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    /// A field with a numeric transform reported something other than a number
    #[error("field `{key}` is not numeric: {value}")]
    NotNumeric { key: &'static str, value: Value },

    /// Two descriptors share the same key
    #[error("duplicate sensor description for key `{0}`")]
    DuplicateKey(&'static str),
}

pub type Result<T> = std::result::Result<T, SensorError>;
