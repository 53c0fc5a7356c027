//! Advisory list → JSON (config store) and YAML (export).

use crate::error::SerializeError;
use crate::types::Advisory;

/// Serialize an advisory list to the compact JSON stored under the
/// advisories config key.
pub fn serialize_advisories(advisories: &[Advisory]) -> Result<String, SerializeError> {
    serde_json::to_string(advisories).map_err(|e| SerializeError {
        message: format!("failed to serialize advisories to JSON: {}", e),
    })
}

/// Serialize an advisory list to a YAML sequence.
///
/// Fields are emitted in declaration order, conditions as `type` then `data`.
pub fn serialize_advisories_yaml(advisories: &[Advisory]) -> Result<String, SerializeError> {
    // Go through a Value first for consistent field ordering
    let value = serde_json::to_value(advisories).map_err(|e| SerializeError {
        message: format!("failed to convert advisories to JSON value: {}", e),
    })?;

    serde_saphyr::to_string(&value).map_err(|e| SerializeError {
        message: format!("failed to serialize to YAML: {}", e),
    })
}
