// focuscue_engine: FocusCue Rust/WASM Engine
// All timing and progression state lives here; JS is plumbing that forwards
// requestAnimationFrame timestamps and key codes in, and renders the JSON
// snapshots that come out.

mod countdown;
mod dispatch;
mod error;
mod frame_loop;
mod params;
mod policy;
mod store;
mod teleprompter;
mod types;

use wasm_bindgen::prelude::*;

pub use countdown::{classify, format_clock, CountdownEngine};
pub use dispatch::{resolve, KeyAction, KeyReport};
pub use error::EngineError;
pub use frame_loop::{FrameLoop, Generation};
pub use params::OverlayParams;
pub use policy::VersionPolicy;
pub use store::{
    decode_config, decode_presets, encode_config, encode_presets, merge_preset, ScriptPreset,
};
pub use teleprompter::{split_script, TeleprompterEngine};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Parse an overlay route query string into its parameter set, fail-soft.
#[wasm_bindgen]
pub fn parse_overlay_params(query: &str) -> Result<String, JsValue> {
    to_json(&OverlayParams::from_query(query))
}

/// Merge a preset into a stored preset list, both as JSON blobs.
/// The list blob may be malformed or empty; it reads as no presets.
#[wasm_bindgen]
pub fn merge_preset_blob(
    list_blob: &str,
    preset_json: &str,
    max_presets: usize,
) -> Result<String, JsValue> {
    let presets = store::decode_presets(list_blob);
    let preset: ScriptPreset = serde_json::from_str(preset_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid preset: {}", e)))?;
    let merged = store::merge_preset(presets, preset, max_presets)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    store::encode_presets(&merged).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Main engine interface exposed to JavaScript.
///
/// Timestamps are `performance.now()` milliseconds. Each engine owns one
/// display loop guarded by a generation token: the host passes the token
/// back on every frame and stops re-arming the moment a frame reports stale.
#[wasm_bindgen]
pub struct Engine {
    countdown: CountdownEngine,
    teleprompter: TeleprompterEngine,
    config: EngineConfig,
    /// Edition limits, when the host tier check has provided them. The
    /// engines themselves never see this; caps apply right here, at the
    /// configuration boundary.
    policy: Option<VersionPolicy>,
    overlay_visible: bool,
    presentation_mode: bool,
    timer_loop: FrameLoop,
    scroll_loop: FrameLoop,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Engine, JsValue> {
        let config: EngineConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        Ok(Engine::from_config(config))
    }

    /// Construct for the overlay route from its query string. Never fails:
    /// every parameter falls back to its documented default.
    pub fn from_query(query: &str) -> Engine {
        let overlay = OverlayParams::from_query(query);
        let config = EngineConfig {
            timer: overlay.timer_settings(),
            dot: overlay.dot_settings(),
            overlay_opacity: overlay.opacity,
            teleprompter: TeleprompterSettings::default(),
        };
        Engine::from_config(config)
    }

    /// Start (or resume) the countdown. Returns the timer-loop token the host
    /// passes to `timer_frame`, or nothing when starting was a no-op.
    pub fn start_timer(&mut self, now_ms: f64) -> Option<u32> {
        if self.countdown.start(Timestamp::from_millis_f64(now_ms)) {
            Some(self.timer_loop.arm().as_u32())
        } else {
            None
        }
    }

    pub fn pause_timer(&mut self) {
        self.countdown.pause();
        self.timer_loop.cancel();
    }

    pub fn toggle_timer(&mut self, now_ms: f64) -> Option<u32> {
        if self.countdown.is_running() {
            self.pause_timer();
            None
        } else {
            self.start_timer(now_ms)
        }
    }

    /// Stop and restore the configured duration.
    pub fn reset_timer(&mut self) {
        self.timer_loop.cancel();
        self.countdown.reset(self.config.timer.duration_sec);
    }

    /// Adopt edition limits from the host tier check. Malformed policy blobs
    /// are ignored and report false. Caps apply to future duration changes,
    /// not retroactively to a run in progress.
    pub fn set_policy(&mut self, policy_json: &str) -> bool {
        match serde_json::from_str::<VersionPolicy>(policy_json) {
            Ok(policy) => {
                self.policy = Some(policy);
                true
            }
            Err(_) => false,
        }
    }

    /// Change the configured duration, preserving time already spent in a run.
    pub fn set_duration(&mut self, duration_sec: u32, now_ms: f64) -> Result<String, JsValue> {
        let duration_sec = match &self.policy {
            Some(policy) => policy.clamp_duration(duration_sec),
            None => duration_sec,
        };
        self.config.timer.duration_sec = duration_sec;
        let report = self
            .countdown
            .set_duration(duration_sec, Timestamp::from_millis_f64(now_ms));
        if !report.running {
            self.timer_loop.cancel();
        }
        to_json(&report)
    }

    pub fn set_thresholds(&mut self, warn_at_sec: u32, panic_at_sec: u32) {
        self.config.timer.warn_at_sec = warn_at_sec;
        self.config.timer.panic_at_sec = panic_at_sec;
        self.countdown.set_thresholds(warn_at_sec, panic_at_sec);
    }

    /// One timer-loop callback. A stale token changes nothing and tells the
    /// host to stop re-arming.
    pub fn timer_frame(&mut self, generation: u32, now_ms: f64) -> Result<String, JsValue> {
        if !self.timer_loop.accepts(Generation::from_u32(generation)) {
            return to_json(&FrameReport {
                rearm: false,
                timer: None,
                scroll_offset: None,
            });
        }
        let report = self.countdown.tick(Timestamp::from_millis_f64(now_ms));
        if !report.running {
            self.timer_loop.cancel();
        }
        to_json(&FrameReport {
            rearm: self.timer_loop.is_armed(),
            timer: Some(report),
            scroll_offset: None,
        })
    }

    pub fn set_script(&mut self, script: &str) {
        self.config.teleprompter.script = script.to_string();
        self.teleprompter.set_script(script);
    }

    /// Switch progression model ("scroll" or "step"). Anything else is
    /// ignored, like every other malformed input at this boundary. Returns a
    /// scroll-loop token when the switch requires the host to start one.
    pub fn set_mode(&mut self, mode: &str) -> Option<u32> {
        let mode = match mode {
            "scroll" => TeleprompterMode::Scroll,
            "step" => TeleprompterMode::Step,
            _ => return None,
        };
        self.config.teleprompter.mode = mode;
        self.teleprompter.set_mode(mode);
        self.sync_scroll_loop()
    }

    /// Show or hide the teleprompter. Positions survive; only
    /// `reset_position` zeroes them.
    pub fn set_teleprompter_active(&mut self, active: bool) -> Option<u32> {
        self.teleprompter.set_active(active);
        self.sync_scroll_loop()
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.config.teleprompter.speed = speed.max(0.0);
        self.teleprompter.set_speed(speed);
    }

    pub fn set_font_size(&mut self, font_size: u32) {
        self.config.teleprompter.font_size = font_size;
        self.teleprompter.set_font_size(font_size);
    }

    /// One scroll-loop callback; same staleness contract as `timer_frame`.
    pub fn scroll_frame(&mut self, generation: u32, now_ms: f64) -> Result<String, JsValue> {
        if !self.scroll_loop.accepts(Generation::from_u32(generation)) {
            return to_json(&FrameReport {
                rearm: false,
                timer: None,
                scroll_offset: None,
            });
        }
        let live = self.teleprompter.advance(Timestamp::from_millis_f64(now_ms));
        if !live {
            self.scroll_loop.cancel();
        }
        to_json(&FrameReport {
            rearm: live,
            timer: None,
            scroll_offset: live.then(|| self.teleprompter.scroll_offset()),
        })
    }

    pub fn next_line(&mut self) {
        self.teleprompter.next_line();
    }

    pub fn prev_line(&mut self) {
        self.teleprompter.prev_line();
    }

    pub fn nudge_up(&mut self) {
        self.teleprompter.nudge_up();
    }

    pub fn nudge_down(&mut self) {
        self.teleprompter.nudge_down();
    }

    pub fn reset_position(&mut self) {
        self.teleprompter.reset_position();
    }

    /// Master start: countdown and teleprompter together.
    pub fn start_presentation(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.presentation_mode = true;
        let timer_generation = self.start_timer(now_ms);
        let scroll_generation = self.set_teleprompter_active(true);
        to_json(&KeyReport {
            action: None,
            timer_generation,
            scroll_generation,
        })
    }

    pub fn stop_presentation(&mut self) {
        self.presentation_mode = false;
        self.pause_timer();
        self.set_teleprompter_active(false);
    }

    pub fn toggle_overlay(&mut self) -> bool {
        self.overlay_visible = !self.overlay_visible;
        self.overlay_visible
    }

    /// Route one keyboard event. `in_text_entry` must be true whenever focus
    /// sits in an input control so hotkeys never hijack typing.
    pub fn handle_key(
        &mut self,
        code: &str,
        in_text_entry: bool,
        now_ms: f64,
    ) -> Result<String, JsValue> {
        let action = dispatch::resolve(
            code,
            self.teleprompter.mode(),
            self.teleprompter.is_active(),
            in_text_entry,
        );
        let mut report = KeyReport::ignored();
        report.action = action;
        match action {
            Some(KeyAction::ToggleRun) => report.timer_generation = self.toggle_timer(now_ms),
            Some(KeyAction::ResetTimer) => self.reset_timer(),
            Some(KeyAction::ToggleOverlay) => {
                self.toggle_overlay();
            }
            Some(KeyAction::NextLine) => self.next_line(),
            Some(KeyAction::PrevLine) => self.prev_line(),
            Some(KeyAction::NudgeUp) => self.nudge_up(),
            Some(KeyAction::NudgeDown) => self.nudge_down(),
            None => {}
        }
        to_json(&report)
    }

    /// Complete engine state for rendering.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        to_json(&EngineSnapshot {
            timer: self.countdown.snapshot(),
            teleprompter: self.teleprompter.snapshot(),
            dot: self.config.dot.clone(),
            overlay_opacity: self.config.overlay_opacity,
            overlay_visible: self.overlay_visible,
            presentation_mode: self.presentation_mode,
        })
    }

    /// Emit the full configuration for the persistence collaborator.
    pub fn export_config(&self) -> Result<String, JsValue> {
        store::encode_config(&self.config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace configuration from a stored blob. A malformed blob is ignored
    /// and reports false, keeping the current configuration.
    pub fn apply_config(&mut self, blob: &str) -> bool {
        match store::decode_config(blob) {
            Some(config) => {
                self.load_config(config);
                true
            }
            None => false,
        }
    }
}

impl Engine {
    fn from_config(config: EngineConfig) -> Engine {
        Engine {
            countdown: CountdownEngine::new(config.timer),
            teleprompter: TeleprompterEngine::new(&config.teleprompter),
            config,
            policy: None,
            overlay_visible: true,
            presentation_mode: false,
            timer_loop: FrameLoop::new(),
            scroll_loop: FrameLoop::new(),
        }
    }

    /// Keep the scroll loop aligned with `active && mode == Scroll`. Returns
    /// a fresh token only when a new chain must be started; an already-armed
    /// loop keeps its current one.
    fn sync_scroll_loop(&mut self) -> Option<u32> {
        if self.teleprompter.scrolling() {
            if self.scroll_loop.is_armed() {
                None
            } else {
                Some(self.scroll_loop.arm().as_u32())
            }
        } else {
            self.scroll_loop.cancel();
            None
        }
    }

    fn load_config(&mut self, config: EngineConfig) {
        self.timer_loop.cancel();
        self.scroll_loop.cancel();
        self.countdown = CountdownEngine::new(config.timer);
        self.teleprompter = TeleprompterEngine::new(&config.teleprompter);
        self.config = config;
    }
}
