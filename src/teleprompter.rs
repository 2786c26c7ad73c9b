// Teleprompter progression: continuous scroll or discrete line stepping.
// The two models are mutually exclusive but share one position pair that only
// an explicit reset zeroes.

use crate::types::{
    LineDisplay, LineState, TeleprompterMode, TeleprompterSettings, TeleprompterSnapshot,
    Timestamp,
};

/// Manual nudge step, in scroll-offset units (host pixels).
const NUDGE_STEP: f32 = 50.0;

/// One 60 Hz frame. The configured speed is calibrated as offset units per
/// reference frame, so scrolling looks the same at 30, 60, or 144 Hz.
const REFERENCE_FRAME_US: f64 = 1_000_000.0 / 60.0;

/// Split a raw script into displayable lines, discarding blank ones.
/// Lines keep their original whitespace; only fully-blank lines drop out.
pub fn split_script(script: &str) -> Vec<String> {
    script
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Teleprompter engine.
#[derive(Debug, Clone)]
pub struct TeleprompterEngine {
    lines: Vec<String>,
    mode: TeleprompterMode,
    current_line: usize,
    scroll_offset: f32,
    active: bool,
    speed: f32,
    font_size: u32,
    /// Previous scroll callback instant, for frame-weight scaling. Cleared on
    /// any suspension so reactivating never applies the idle gap as one jump.
    last_frame: Option<Timestamp>,
}

impl TeleprompterEngine {
    pub fn new(settings: &TeleprompterSettings) -> Self {
        TeleprompterEngine {
            lines: split_script(&settings.script),
            mode: settings.mode,
            current_line: 0,
            scroll_offset: 0.0,
            active: false,
            speed: settings.speed.max(0.0),
            font_size: settings.font_size,
            last_frame: None,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn mode(&self) -> TeleprompterMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Replace the script. The current line index is clamped into the new
    /// range, never reset; `reset_position` is the only operation that zeroes
    /// the trackers.
    pub fn set_script(&mut self, script: &str) {
        self.lines = split_script(script);
        self.current_line = self.current_line.min(self.lines.len().saturating_sub(1));
    }

    pub fn set_mode(&mut self, mode: TeleprompterMode) {
        self.mode = mode;
        self.last_frame = None;
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.last_frame = None;
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn set_font_size(&mut self, font_size: u32) {
        self.font_size = font_size;
    }

    /// Whether the scroll loop should be running at all.
    pub fn scrolling(&self) -> bool {
        self.active && self.mode == TeleprompterMode::Scroll
    }

    /// One scroll-loop callback. Advances the offset by
    /// `speed * elapsed / reference_frame`; the first callback after
    /// (re)activation only establishes the time baseline. Returns false when
    /// the governing condition no longer holds, telling a stale callback to
    /// stop without touching state.
    pub fn advance(&mut self, now: Timestamp) -> bool {
        if !self.scrolling() {
            self.last_frame = None;
            return false;
        }
        if let Some(prev) = self.last_frame {
            let weight = now.micros_since(prev) as f64 / REFERENCE_FRAME_US;
            self.scroll_offset += self.speed * weight as f32;
        }
        self.last_frame = Some(now);
        true
    }

    /// Scroll back by one manual step, clamped at the top.
    pub fn nudge_up(&mut self) {
        if self.scrolling() {
            self.scroll_offset = (self.scroll_offset - NUDGE_STEP).max(0.0);
        }
    }

    /// Scroll forward by one manual step. No upper clamp: scrolling past the
    /// end of content is allowed, the host renders trailing blank space.
    pub fn nudge_down(&mut self) {
        if self.scrolling() {
            self.scroll_offset += NUDGE_STEP;
        }
    }

    /// Step mode: advance one line, clamped at the last.
    pub fn next_line(&mut self) {
        if self.stepping() && !self.lines.is_empty() {
            self.current_line = (self.current_line + 1).min(self.lines.len() - 1);
        }
    }

    /// Step mode: go back one line, clamped at the first.
    pub fn prev_line(&mut self) {
        if self.stepping() {
            self.current_line = self.current_line.saturating_sub(1);
        }
    }

    /// Zero both position trackers, regardless of mode or activation.
    pub fn reset_position(&mut self) {
        self.scroll_offset = 0.0;
        self.current_line = 0;
        self.last_frame = None;
    }

    /// Display state of line `index` relative to the current line.
    pub fn line_display(&self, index: usize) -> LineDisplay {
        use std::cmp::Ordering;
        match index.cmp(&self.current_line) {
            Ordering::Less => LineDisplay::Completed,
            Ordering::Equal => LineDisplay::Current,
            Ordering::Greater => LineDisplay::Upcoming,
        }
    }

    pub fn snapshot(&self) -> TeleprompterSnapshot {
        TeleprompterSnapshot {
            active: self.active,
            mode: self.mode,
            current_line: self.current_line,
            line_count: self.lines.len(),
            scroll_offset: self.scroll_offset,
            font_size: self.font_size,
            lines: self
                .lines
                .iter()
                .enumerate()
                .map(|(i, text)| LineState {
                    text: text.clone(),
                    display: self.line_display(i),
                })
                .collect(),
        }
    }

    fn stepping(&self) -> bool {
        self.active && self.mode == TeleprompterMode::Step
    }
}
