// Overlay parameter contract for the browser-source route.
// Every value parses fail-soft: unparsable or missing keys silently fall back
// to their defaults, nothing surfaces an error to the presenter.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::types::{DotSettings, TimerSettings};

/// Parameters consumed from the overlay route's query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayParams {
    /// Total seconds.
    pub duration: u32,
    /// Warning threshold seconds.
    pub warn: u32,
    /// Critical threshold seconds.
    pub panic: u32,
    /// Focus-dot diameter in pixels.
    pub dot: u32,
    /// Overall overlay opacity.
    pub opacity: f32,
    /// Focus-dot position, percent of viewport.
    pub x: u32,
    pub y: u32,
    /// Focus-dot color.
    pub color: String,
}

impl Default for OverlayParams {
    fn default() -> Self {
        OverlayParams {
            duration: 300,
            warn: 60,
            panic: 20,
            dot: 14,
            opacity: 0.7,
            x: 50,
            y: 50,
            color: "#ff2a2a".to_string(),
        }
    }
}

impl OverlayParams {
    /// Parse a raw query string, with or without the leading `?`.
    ///
    /// The first occurrence of a key wins (matching `URLSearchParams.get`).
    /// Unsigned parses reject negative values here, at the configuration
    /// boundary, so the engines only ever see durations `>= 0`; non-finite
    /// opacity falls back the same way.
    pub fn from_query(query: &str) -> Self {
        let raw = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let uint = |key: &str, fallback: u32| {
            first(key)
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(fallback)
        };

        let defaults = OverlayParams::default();
        OverlayParams {
            duration: uint("duration", defaults.duration),
            warn: uint("warn", defaults.warn),
            panic: uint("panic", defaults.panic),
            dot: uint("dot", defaults.dot),
            opacity: first("opacity")
                .and_then(|v| v.parse::<f32>().ok())
                .filter(|o| o.is_finite())
                .unwrap_or(defaults.opacity),
            x: uint("x", defaults.x),
            y: uint("y", defaults.y),
            color: first("color")
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .unwrap_or(defaults.color),
        }
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            duration_sec: self.duration,
            warn_at_sec: self.warn,
            panic_at_sec: self.panic,
        }
    }

    /// The overlay route drives the dot from the same opacity it applies to
    /// the whole overlay.
    pub fn dot_settings(&self) -> DotSettings {
        DotSettings {
            size_px: self.dot,
            opacity: self.opacity,
            x_pct: self.x,
            y_pct: self.y,
            color: self.color.clone(),
        }
    }
}
