//! Key press actions and volume-key cursor control choices
//!
//! Action codes are shared with the input policy that executes them, so the
//! numeric values must not change.

use std::fmt;

use crate::controls::ListEntry;

/// Action performed on a key press, long press or double tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionCode {
    #[default]
    Nothing,
    Menu,
    AppSwitch,
    Search,
    VoiceSearch,
    InAppSearch,
    LaunchCamera,
    Sleep,
    LastApp,
}

impl ActionCode {
    pub const ALL: [ActionCode; 9] = [
        ActionCode::Nothing,
        ActionCode::Menu,
        ActionCode::AppSwitch,
        ActionCode::Search,
        ActionCode::VoiceSearch,
        ActionCode::InAppSearch,
        ActionCode::LaunchCamera,
        ActionCode::Sleep,
        ActionCode::LastApp,
    ];

    /// Numeric code as stored in the settings store
    pub fn code(self) -> i32 {
        match self {
            ActionCode::Nothing => 0,
            ActionCode::Menu => 1,
            ActionCode::AppSwitch => 2,
            ActionCode::Search => 3,
            ActionCode::VoiceSearch => 4,
            ActionCode::InAppSearch => 5,
            ActionCode::LaunchCamera => 6,
            ActionCode::Sleep => 7,
            ActionCode::LastApp => 8,
        }
    }

    /// Exact lookup, `None` when out of range
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.code() == code)
    }

    /// Lookup that clamps out-of-range codes to [`ActionCode::Nothing`]
    pub fn clamped(code: i32) -> Self {
        Self::from_code(code).unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionCode::Nothing => "No action",
            ActionCode::Menu => "Open/close menu",
            ActionCode::AppSwitch => "Recent apps switcher",
            ActionCode::Search => "Search assistant",
            ActionCode::VoiceSearch => "Voice search",
            ActionCode::InAppSearch => "In-app search",
            ActionCode::LaunchCamera => "Launch camera",
            ActionCode::Sleep => "Turn off screen",
            ActionCode::LastApp => "Last app",
        }
    }

    /// List entries for an action preference, in code order
    pub fn entries() -> Vec<ListEntry> {
        Self::ALL
            .iter()
            .map(|a| ListEntry::new(a.label(), a.code().to_string()))
            .collect()
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the volume keys do while a text cursor is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorControl {
    #[default]
    Off,
    /// Volume up moves the cursor left, volume down moves it right
    VolumeUpLeft,
    /// Volume up moves the cursor right, volume down moves it left
    VolumeUpRight,
}

impl CursorControl {
    pub const ALL: [CursorControl; 3] = [
        CursorControl::Off,
        CursorControl::VolumeUpLeft,
        CursorControl::VolumeUpRight,
    ];

    pub fn code(self) -> i32 {
        match self {
            CursorControl::Off => 0,
            CursorControl::VolumeUpLeft => 1,
            CursorControl::VolumeUpRight => 2,
        }
    }

    pub fn clamped(code: i32) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            CursorControl::Off => "Disabled",
            CursorControl::VolumeUpLeft => "Volume up/down moves cursor left/right",
            CursorControl::VolumeUpRight => "Volume up/down moves cursor right/left",
        }
    }

    pub fn entries() -> Vec<ListEntry> {
        Self::ALL
            .iter()
            .map(|c| ListEntry::new(c.label(), c.code().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes_are_stable() {
        for (i, action) in ActionCode::ALL.iter().enumerate() {
            assert_eq!(action.code(), i as i32);
        }
    }

    #[test]
    fn test_out_of_range_clamps_to_nothing() {
        assert_eq!(ActionCode::clamped(99), ActionCode::Nothing);
        assert_eq!(ActionCode::clamped(-1), ActionCode::Nothing);
        assert_eq!(ActionCode::clamped(8), ActionCode::LastApp);
        assert_eq!(ActionCode::from_code(9), None);
    }

    #[test]
    fn test_action_entries() {
        let entries = ActionCode::entries();
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[3].value, "3");
        assert_eq!(entries[3].label, "Search assistant");
    }

    #[test]
    fn test_cursor_control_clamping() {
        assert_eq!(CursorControl::clamped(2), CursorControl::VolumeUpRight);
        assert_eq!(CursorControl::clamped(7), CursorControl::Off);
        assert_eq!(CursorControl::entries().len(), 3);
    }
}
