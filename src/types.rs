// Strong typing over strings. Newtypes for timestamps, severity, and progression modes.

use serde::{Deserialize, Serialize};

/// Timestamp in microseconds. Newtype for type safety.
///
/// The host forwards `performance.now()` values through the WASM boundary;
/// all elapsed-time math happens on this type so remaining time is a
/// function of the wall clock, never of frame count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    /// Convert a `performance.now()` style millisecond value.
    /// Non-finite or negative inputs collapse to zero.
    pub fn from_millis_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Timestamp((ms * 1000.0) as u64)
        } else {
            Timestamp(0)
        }
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Microseconds elapsed since `epoch`, saturating when `epoch` is in the future.
    pub fn micros_since(&self, epoch: Timestamp) -> u64 {
        self.0.saturating_sub(epoch.0)
    }

    /// Whole seconds elapsed since `epoch` (floor).
    pub fn seconds_since(&self, epoch: Timestamp) -> u32 {
        (self.micros_since(epoch) / 1_000_000).min(u64::from(u32::MAX)) as u32
    }

    /// The instant `secs` whole seconds before this one, saturating at zero.
    pub fn minus_seconds(&self, secs: u32) -> Timestamp {
        Timestamp(self.0.saturating_sub(u64::from(secs) * 1_000_000))
    }
}

/// Remaining-time severity bucket. Ordered least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// Teleprompter progression model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeleprompterMode {
    /// Continuous: the scroll offset advances every frame at the configured speed.
    Scroll,
    /// Discrete: the current line only moves on explicit next/previous events.
    Step,
}

/// Display state of a single teleprompter line, derived from the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDisplay {
    Completed,
    Current,
    Upcoming,
}

/// Engine configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub teleprompter: TeleprompterSettings,
    #[serde(default)]
    pub dot: DotSettings,
    /// Opacity applied to the whole overlay, distinct from the dot's own opacity.
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            timer: TimerSettings::default(),
            teleprompter: TeleprompterSettings::default(),
            dot: DotSettings::default(),
            overlay_opacity: default_overlay_opacity(),
        }
    }
}

/// Countdown settings. Threshold ordering (`panic <= warn <= duration`) is the
/// configuration layer's contract; the engine classifies whatever it is given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_duration")]
    pub duration_sec: u32,
    #[serde(default = "default_warn_at")]
    pub warn_at_sec: u32,
    #[serde(default = "default_panic_at")]
    pub panic_at_sec: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        TimerSettings {
            duration_sec: default_duration(),
            warn_at_sec: default_warn_at(),
            panic_at_sec: default_panic_at(),
        }
    }
}

fn default_duration() -> u32 {
    300
}

fn default_warn_at() -> u32 {
    60
}

fn default_panic_at() -> u32 {
    20
}

fn default_overlay_opacity() -> f32 {
    0.7
}

/// Teleprompter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleprompterSettings {
    #[serde(default)]
    pub script: String,
    #[serde(default = "default_mode")]
    pub mode: TeleprompterMode,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl Default for TeleprompterSettings {
    fn default() -> Self {
        TeleprompterSettings {
            script: String::new(),
            mode: default_mode(),
            font_size: default_font_size(),
            speed: default_speed(),
        }
    }
}

fn default_mode() -> TeleprompterMode {
    TeleprompterMode::Step
}

fn default_font_size() -> u32 {
    24
}

fn default_speed() -> f32 {
    1.0
}

/// Focus-dot settings. Rendering is the host's concern; the engine just
/// carries these through snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotSettings {
    #[serde(default = "default_dot_size")]
    pub size_px: u32,
    #[serde(default = "default_dot_opacity")]
    pub opacity: f32,
    #[serde(default = "default_dot_pos")]
    pub x_pct: u32,
    #[serde(default = "default_dot_pos")]
    pub y_pct: u32,
    #[serde(default = "default_dot_color")]
    pub color: String,
}

impl Default for DotSettings {
    fn default() -> Self {
        DotSettings {
            size_px: default_dot_size(),
            opacity: default_dot_opacity(),
            x_pct: default_dot_pos(),
            y_pct: default_dot_pos(),
            color: default_dot_color(),
        }
    }
}

fn default_dot_size() -> u32 {
    14
}

fn default_dot_opacity() -> f32 {
    0.9
}

fn default_dot_pos() -> u32 {
    50
}

fn default_dot_color() -> String {
    "#ff2a2a".to_string()
}

/// Countdown state reported after a tick or control operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerReport {
    pub remaining_sec: u32,
    pub severity: Severity,
    /// Remaining time just landed exactly on a threshold this second.
    pub pulse: bool,
    /// Finish signal; true at most once per run.
    pub finished: bool,
    pub running: bool,
    /// MM:SS rendering of the remaining time.
    pub clock: String,
}

/// A teleprompter line plus its display state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineState {
    pub text: String,
    pub display: LineDisplay,
}

/// Full teleprompter state for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleprompterSnapshot {
    pub active: bool,
    pub mode: TeleprompterMode,
    pub current_line: usize,
    pub line_count: usize,
    pub scroll_offset: f32,
    pub font_size: u32,
    pub lines: Vec<LineState>,
}

/// Result of one display-loop callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    /// Whether the host should schedule another callback with the same generation.
    pub rearm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_offset: Option<f32>,
}

/// Complete engine state returned to JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub timer: TimerReport,
    pub teleprompter: TeleprompterSnapshot,
    pub dot: DotSettings,
    pub overlay_opacity: f32,
    pub overlay_visible: bool,
    pub presentation_mode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_conversions() {
        let ts = Timestamp::from_micros(1_500_000);
        assert_eq!(ts.as_micros(), 1_500_000);
        assert!((ts.as_secs_f64() - 1.5).abs() < 0.0001);
    }

    #[test]
    fn millis_f64_rejects_garbage() {
        assert_eq!(Timestamp::from_millis_f64(f64::NAN).as_micros(), 0);
        assert_eq!(Timestamp::from_millis_f64(-42.0).as_micros(), 0);
        assert_eq!(Timestamp::from_millis_f64(1.5).as_micros(), 1500);
    }

    #[test]
    fn seconds_since_floors_and_saturates() {
        let epoch = Timestamp::from_micros(1_000_000);
        assert_eq!(Timestamp::from_micros(2_999_999).seconds_since(epoch), 1);
        assert_eq!(Timestamp::from_micros(3_000_000).seconds_since(epoch), 2);
        // Epoch in the future reads as no time elapsed.
        assert_eq!(Timestamp::from_micros(0).seconds_since(epoch), 0);
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Normal < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn config_defaults_match_missing_fields() {
        // An empty JSON object and Default::default() must agree, otherwise a
        // host omitting a section would get different values than one passing
        // the documented defaults.
        let parsed: EngineConfig = serde_json::from_str("{}").unwrap();
        let built = EngineConfig::default();
        assert_eq!(parsed.timer.duration_sec, built.timer.duration_sec);
        assert_eq!(parsed.timer.warn_at_sec, 60);
        assert_eq!(parsed.timer.panic_at_sec, 20);
        assert_eq!(parsed.dot.color, built.dot.color);
        assert_eq!(parsed.teleprompter.mode, TeleprompterMode::Step);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TeleprompterMode::Scroll).unwrap(),
            "\"scroll\""
        );
        let mode: TeleprompterMode = serde_json::from_str("\"step\"").unwrap();
        assert_eq!(mode, TeleprompterMode::Step);
    }
}
