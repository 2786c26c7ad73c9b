// Persisted state is plain data in and out. The host owns storage keys,
// durability, and migration; this side only encodes and fail-soft decodes.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::EngineConfig;

/// A named script preset: the script plus the three timing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPreset {
    pub name: String,
    pub script: String,
    pub duration: u32,
    pub warn_at: u32,
    pub panic_at: u32,
}

/// Decode a stored preset list. Malformed blobs read as empty.
pub fn decode_presets(blob: &str) -> Vec<ScriptPreset> {
    serde_json::from_str(blob).unwrap_or_default()
}

/// Encode a preset list for the persistence collaborator.
///
/// # Errors
/// Propagates serialization failure, which for these plain structs means a
/// broken serializer rather than bad user data.
pub fn encode_presets(presets: &[ScriptPreset]) -> Result<String, EngineError> {
    Ok(serde_json::to_string(presets)?)
}

/// Insert `preset` into `presets`: a same-named entry is replaced in place,
/// otherwise the preset is appended, subject to the edition's cap.
///
/// # Errors
/// `InvalidPreset` when the name is blank or appending would exceed `max`.
pub fn merge_preset(
    mut presets: Vec<ScriptPreset>,
    preset: ScriptPreset,
    max: usize,
) -> Result<Vec<ScriptPreset>, EngineError> {
    if preset.name.trim().is_empty() {
        return Err(EngineError::InvalidPreset("name must not be blank".to_string()));
    }
    presets.retain(|existing| existing.name != preset.name);
    if presets.len() >= max {
        return Err(EngineError::InvalidPreset(format!(
            "preset limit of {max} reached"
        )));
    }
    presets.push(preset);
    Ok(presets)
}

/// Decode a stored full-configuration blob. Malformed blobs read as absent,
/// letting the caller fall back to defaults.
pub fn decode_config(blob: &str) -> Option<EngineConfig> {
    serde_json::from_str(blob).ok()
}

/// Encode the full configuration for the persistence collaborator.
///
/// # Errors
/// Propagates serialization failure.
pub fn encode_config(config: &EngineConfig) -> Result<String, EngineError> {
    Ok(serde_json::to_string(config)?)
}
