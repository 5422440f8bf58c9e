//! Control state handed to the UI collaborator
//!
//! These mirror what a list, switch or dialog preference displays. They hold
//! no widget handles; the renderer materializes them.

use serde::Serialize;

/// One choice of a list preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    /// Human-readable label
    pub label: String,
    /// Value written on selection
    pub value: String,
}

impl ListEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Single-choice list preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListControl {
    pub entries: Vec<ListEntry>,
    /// Currently selected value
    pub value: String,
    /// Summary line shown under the title
    pub summary: String,
    pub enabled: bool,
}

impl ListControl {
    /// Create an enabled list with nothing selected
    pub fn new(entries: Vec<ListEntry>) -> Self {
        Self {
            entries,
            value: String::new(),
            summary: String::new(),
            enabled: true,
        }
    }

    pub fn find_index_of_value(&self, value: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.value == value)
    }

    /// Index of the current value, if it is one of the entries
    pub fn selected_index(&self) -> Option<usize> {
        self.find_index_of_value(&self.value)
    }

    /// Select `value` and show its label as summary
    ///
    /// Returns the selected index, or `None` (leaving the list untouched) when
    /// the value is not one of the entries.
    pub fn select(&mut self, value: &str) -> Option<usize> {
        let index = self.find_index_of_value(value)?;
        self.value = self.entries[index].value.clone();
        self.summary = self.entries[index].label.clone();
        Some(index)
    }
}

/// Two-state switch preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchControl {
    pub checked: bool,
    pub enabled: bool,
}

impl SwitchControl {
    pub fn new(checked: bool) -> Self {
        Self { checked, enabled: true }
    }
}

/// Button backlight entry, opening a brightness dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BacklightControl {
    /// Current button brightness (0-255)
    pub brightness: i32,
    pub enabled: bool,
}

impl BacklightControl {
    pub fn summary(&self) -> String {
        if self.brightness <= 0 {
            "Off".to_string()
        } else {
            format!("{}%", self.brightness.min(255) * 100 / 255)
        }
    }
}

/// Value delivered by the UI when a preference changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    /// New switch state
    Bool(bool),
    /// Selected list value
    Choice(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ListControl {
        ListControl::new(vec![
            ListEntry::new("Zero", "0"),
            ListEntry::new("One", "1"),
        ])
    }

    #[test]
    fn test_select_updates_summary() {
        let mut list = sample();
        assert_eq!(list.select("1"), Some(1));
        assert_eq!(list.value, "1");
        assert_eq!(list.summary, "One");
        assert_eq!(list.selected_index(), Some(1));
    }

    #[test]
    fn test_select_unknown_value_is_noop() {
        let mut list = sample();
        list.select("0");
        assert_eq!(list.select("7"), None);
        assert_eq!(list.value, "0");
        assert_eq!(list.summary, "Zero");
    }

    #[test]
    fn test_backlight_summary() {
        let off = BacklightControl { brightness: 0, enabled: true };
        assert_eq!(off.summary(), "Off");
        let full = BacklightControl { brightness: 255, enabled: true };
        assert_eq!(full.summary(), "100%");
    }
}
