// Freemium gating is policy data owned by the host tier check.
// The engines never consult it: caps apply at the configuration boundary and
// whatever duration survives is what the countdown runs with.

use serde::{Deserialize, Serialize};

/// Feature limits for the running edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionPolicy {
    /// Timer cap in seconds; `None` means unlimited.
    pub max_timer_secs: Option<u32>,
    pub can_save_scripts: bool,
    pub can_load_scripts: bool,
    pub max_presets: usize,
    pub watermark: bool,
}

impl VersionPolicy {
    pub fn free() -> Self {
        VersionPolicy {
            max_timer_secs: Some(300),
            can_save_scripts: false,
            can_load_scripts: false,
            max_presets: 1,
            watermark: true,
        }
    }

    pub fn premium() -> Self {
        VersionPolicy {
            max_timer_secs: None,
            can_save_scripts: true,
            can_load_scripts: true,
            max_presets: 10,
            watermark: false,
        }
    }

    /// Apply the timer cap to a requested duration.
    pub fn clamp_duration(&self, duration_sec: u32) -> u32 {
        match self.max_timer_secs {
            Some(max) => duration_sec.min(max),
            None => duration_sec,
        }
    }
}
