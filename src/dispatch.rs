// Keyboard surface: one action per engine operation, default bindings as data.
// Exact codes mirror the desktop app; a host with its own bindings can skip
// resolve() and invoke engine operations directly.

use serde::{Deserialize, Serialize};

use crate::types::TeleprompterMode;

/// The discrete actions the input dispatcher can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    ToggleRun,
    ResetTimer,
    ToggleOverlay,
    NextLine,
    PrevLine,
    NudgeUp,
    NudgeDown,
}

/// Outcome of a key event, including any loop tokens the host must adopt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<KeyAction>,
    /// Present when the event armed the timer loop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_generation: Option<u32>,
    /// Present when the event armed the scroll loop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_generation: Option<u32>,
}

impl KeyReport {
    pub fn ignored() -> Self {
        KeyReport {
            action: None,
            timer_generation: None,
            scroll_generation: None,
        }
    }
}

/// Map a `KeyboardEvent.code` to an action.
///
/// Everything is ignored while focus sits in a text-entry control, so typing
/// a script never trips the hotkeys. Arrow keys change meaning with the
/// active teleprompter mode and do nothing while the teleprompter is hidden.
pub fn resolve(
    code: &str,
    mode: TeleprompterMode,
    teleprompter_active: bool,
    in_text_entry: bool,
) -> Option<KeyAction> {
    if in_text_entry {
        return None;
    }
    match code {
        "Space" => Some(KeyAction::ToggleRun),
        "KeyR" => Some(KeyAction::ResetTimer),
        "F8" => Some(KeyAction::ToggleOverlay),
        _ if teleprompter_active => match (mode, code) {
            (TeleprompterMode::Step, "KeyN" | "ArrowDown") => Some(KeyAction::NextLine),
            (TeleprompterMode::Step, "KeyP" | "ArrowUp") => Some(KeyAction::PrevLine),
            (TeleprompterMode::Scroll, "ArrowUp") => Some(KeyAction::NudgeUp),
            (TeleprompterMode::Scroll, "ArrowDown") => Some(KeyAction::NudgeDown),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_entry_swallows_everything() {
        for code in ["Space", "KeyR", "F8", "KeyN", "ArrowUp"] {
            assert_eq!(
                resolve(code, TeleprompterMode::Step, true, true),
                None,
                "{code} must not hijack typing"
            );
        }
    }

    #[test]
    fn global_bindings() {
        assert_eq!(
            resolve("Space", TeleprompterMode::Step, false, false),
            Some(KeyAction::ToggleRun)
        );
        assert_eq!(
            resolve("KeyR", TeleprompterMode::Scroll, true, false),
            Some(KeyAction::ResetTimer)
        );
        assert_eq!(
            resolve("F8", TeleprompterMode::Step, false, false),
            Some(KeyAction::ToggleOverlay)
        );
    }

    #[test]
    fn arrows_depend_on_mode() {
        assert_eq!(
            resolve("ArrowDown", TeleprompterMode::Step, true, false),
            Some(KeyAction::NextLine)
        );
        assert_eq!(
            resolve("ArrowDown", TeleprompterMode::Scroll, true, false),
            Some(KeyAction::NudgeDown)
        );
        assert_eq!(
            resolve("ArrowUp", TeleprompterMode::Step, true, false),
            Some(KeyAction::PrevLine)
        );
        assert_eq!(
            resolve("ArrowUp", TeleprompterMode::Scroll, true, false),
            Some(KeyAction::NudgeUp)
        );
    }

    #[test]
    fn letter_navigation_is_step_only() {
        assert_eq!(
            resolve("KeyN", TeleprompterMode::Step, true, false),
            Some(KeyAction::NextLine)
        );
        assert_eq!(resolve("KeyN", TeleprompterMode::Scroll, true, false), None);
        assert_eq!(
            resolve("KeyP", TeleprompterMode::Step, true, false),
            Some(KeyAction::PrevLine)
        );
    }

    #[test]
    fn hidden_teleprompter_ignores_navigation() {
        assert_eq!(resolve("ArrowDown", TeleprompterMode::Step, false, false), None);
        assert_eq!(resolve("KeyN", TeleprompterMode::Step, false, false), None);
        // Global keys still work.
        assert_eq!(
            resolve("Space", TeleprompterMode::Step, false, false),
            Some(KeyAction::ToggleRun)
        );
    }

    #[test]
    fn unknown_codes_resolve_to_nothing() {
        assert_eq!(resolve("KeyQ", TeleprompterMode::Step, true, false), None);
        assert_eq!(resolve("", TeleprompterMode::Scroll, true, false), None);
    }
}
