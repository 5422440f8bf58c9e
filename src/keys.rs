//! Hardware keys, preference identifiers and settings-store key names
//!
//! The string ids here are stable: the UI collaborator addresses preferences
//! and categories by them, and the search index receives them verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key mask bits as used by the device hardware-key configuration
pub mod key_mask {
    /// Home key
    pub const HOME: u32 = 0x01;
    /// Back key
    pub const BACK: u32 = 0x02;
    /// Menu key
    pub const MENU: u32 = 0x04;
    /// Assist (search) key
    pub const ASSIST: u32 = 0x08;
    /// App-switch (recents) key
    pub const APP_SWITCH: u32 = 0x10;
    /// Camera key
    pub const CAMERA: u32 = 0x20;
    /// Volume rocker
    pub const VOLUME: u32 = 0x40;
}

/// Settings-store key names
pub mod setting {
    pub const HOME_LONG_PRESS_ACTION: &str = "key_home_long_press_action";
    pub const HOME_DOUBLE_TAP_ACTION: &str = "key_home_double_tap_action";
    pub const MENU_ACTION: &str = "key_menu_action";
    pub const MENU_LONG_PRESS_ACTION: &str = "key_menu_long_press_action";
    pub const ASSIST_ACTION: &str = "key_assist_action";
    pub const ASSIST_LONG_PRESS_ACTION: &str = "key_assist_long_press_action";
    pub const APP_SWITCH_ACTION: &str = "key_app_switch_action";
    pub const APP_SWITCH_LONG_PRESS_ACTION: &str = "key_app_switch_long_press_action";

    pub const VOLUME_KEY_CURSOR_CONTROL: &str = "volume_key_cursor_control";
    pub const SWAP_VOLUME_KEYS_ON_ROTATION: &str = "swap_volume_keys_on_rotation";
    pub const VOLUME_KEYS_CONTROL_RING_STREAM: &str = "volume_keys_control_ring_stream";
    pub const VOLUME_MUSIC_CONTROLS: &str = "volbtn_music_controls";

    pub const HOME_WAKE_SCREEN: &str = "home_wake_screen";
    pub const BACK_WAKE_SCREEN: &str = "back_wake_screen";
    pub const MENU_WAKE_SCREEN: &str = "menu_wake_screen";
    pub const ASSIST_WAKE_SCREEN: &str = "assist_wake_screen";
    pub const APP_SWITCH_WAKE_SCREEN: &str = "app_switch_wake_screen";
    pub const VOLUME_WAKE_SCREEN: &str = "volume_wake_screen";

    pub const NAVIGATION_BAR_SHOW: &str = "navigation_bar_show";
    pub const NAVIGATION_BAR_LEFT: &str = "navigation_bar_left";
    pub const ENABLE_HW_KEYS: &str = "enable_hw_keys";
    pub const BUTTON_BRIGHTNESS: &str = "button_brightness";

    pub const INCALL_POWER_BUTTON_BEHAVIOR: &str = "incall_power_button_behavior";
    pub const RING_HOME_BUTTON_BEHAVIOR: &str = "ring_home_button_behavior";
    pub const RECENTS_LONG_PRESS_ACTIVITY: &str = "recents_long_press_activity";

    /// Brightness snapshot taken when hardware keys get disabled (private prefs)
    pub const PRE_NAVBAR_BUTTON_BACKLIGHT: &str = "pre_navbar_button_backlight";

    /// In-call power button turns the screen off
    pub const INCALL_POWER_BUTTON_BEHAVIOR_SCREEN_OFF: i32 = 1;
    /// In-call power button hangs up
    pub const INCALL_POWER_BUTTON_BEHAVIOR_HANGUP: i32 = 2;
    pub const INCALL_POWER_BUTTON_BEHAVIOR_DEFAULT: i32 = INCALL_POWER_BUTTON_BEHAVIOR_SCREEN_OFF;

    /// Home button does nothing while ringing
    pub const RING_HOME_BUTTON_BEHAVIOR_DO_NOTHING: i32 = 1;
    /// Home button answers while ringing
    pub const RING_HOME_BUTTON_BEHAVIOR_ANSWER: i32 = 2;
    pub const RING_HOME_BUTTON_BEHAVIOR_DEFAULT: i32 = RING_HOME_BUTTON_BEHAVIOR_DO_NOTHING;
}

// ============================================================================
// Hardware keys
// ============================================================================

/// A physical key that may be present on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HwKey {
    Home,
    Back,
    Menu,
    Assist,
    AppSwitch,
    Camera,
    Volume,
}

impl HwKey {
    pub const ALL: [HwKey; 7] = [
        HwKey::Home,
        HwKey::Back,
        HwKey::Menu,
        HwKey::Assist,
        HwKey::AppSwitch,
        HwKey::Camera,
        HwKey::Volume,
    ];

    /// Bit of this key in a [`KeyMask`]
    pub fn mask(self) -> u32 {
        match self {
            HwKey::Home => key_mask::HOME,
            HwKey::Back => key_mask::BACK,
            HwKey::Menu => key_mask::MENU,
            HwKey::Assist => key_mask::ASSIST,
            HwKey::AppSwitch => key_mask::APP_SWITCH,
            HwKey::Camera => key_mask::CAMERA,
            HwKey::Volume => key_mask::VOLUME,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HwKey::Home => "home",
            HwKey::Back => "back",
            HwKey::Menu => "menu",
            HwKey::Assist => "assist",
            HwKey::AppSwitch => "app_switch",
            HwKey::Camera => "camera",
            HwKey::Volume => "volume",
        }
    }
}

impl fmt::Display for HwKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Set of hardware keys, stored as the raw device-configuration bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMask(pub u32);

impl KeyMask {
    pub const EMPTY: KeyMask = KeyMask(0);

    /// Build a mask from a list of keys
    pub fn from_keys(keys: &[HwKey]) -> Self {
        Self(keys.iter().fold(0, |acc, k| acc | k.mask()))
    }

    pub fn contains(self, key: HwKey) -> bool {
        self.0 & key.mask() != 0
    }

    pub fn with(self, key: HwKey) -> Self {
        Self(self.0 | key.mask())
    }

    pub fn without(self, key: HwKey) -> Self {
        Self(self.0 & !key.mask())
    }

    /// Keys present in this mask, in mask-bit order
    pub fn keys(self) -> Vec<HwKey> {
        HwKey::ALL.iter().copied().filter(|k| self.contains(*k)).collect()
    }
}

// ============================================================================
// Screen layout
// ============================================================================

/// Preference categories of the button settings screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Power,
    Home,
    Back,
    Menu,
    Assist,
    AppSwitch,
    Camera,
    Volume,
    Backlight,
    NavigationBar,
    HwKeys,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Power,
        Category::Home,
        Category::Back,
        Category::Menu,
        Category::Assist,
        Category::AppSwitch,
        Category::Camera,
        Category::Volume,
        Category::Backlight,
        Category::NavigationBar,
        Category::HwKeys,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Category::Power => "power_key",
            Category::Home => "home_key",
            Category::Back => "back_key",
            Category::Menu => "menu_key",
            Category::Assist => "assist_key",
            Category::AppSwitch => "app_switch_key",
            Category::Camera => "camera_key",
            Category::Volume => "volume_keys",
            Category::Backlight => "key_backlight",
            Category::NavigationBar => "navigation_bar",
            Category::HwKeys => "hw_keys",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.id() == id)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Stable identifier of every preference on the screen
///
/// Change handling dispatches on this tag, never on control identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PreferenceKey {
    PowerEndCall,
    HomeWakeScreen,
    HomeAnswerCall,
    HomeLongPress,
    HomeDoubleTap,
    BackWakeScreen,
    MenuWakeScreen,
    MenuPress,
    MenuLongPress,
    AssistWakeScreen,
    AssistPress,
    AssistLongPress,
    AppSwitchWakeScreen,
    AppSwitchPress,
    AppSwitchLongPress,
    VolumeWakeScreen,
    VolumeMusicControls,
    VolumeKeyCursorControl,
    SwapVolumeButtons,
    VolumeControlRingStream,
    ButtonBacklight,
    EnableNavigationBar,
    NavigationBarLeft,
    NavigationRecentsLongPress,
    EnableHwKeys,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 25] = [
        PreferenceKey::PowerEndCall,
        PreferenceKey::HomeWakeScreen,
        PreferenceKey::HomeAnswerCall,
        PreferenceKey::HomeLongPress,
        PreferenceKey::HomeDoubleTap,
        PreferenceKey::BackWakeScreen,
        PreferenceKey::MenuWakeScreen,
        PreferenceKey::MenuPress,
        PreferenceKey::MenuLongPress,
        PreferenceKey::AssistWakeScreen,
        PreferenceKey::AssistPress,
        PreferenceKey::AssistLongPress,
        PreferenceKey::AppSwitchWakeScreen,
        PreferenceKey::AppSwitchPress,
        PreferenceKey::AppSwitchLongPress,
        PreferenceKey::VolumeWakeScreen,
        PreferenceKey::VolumeMusicControls,
        PreferenceKey::VolumeKeyCursorControl,
        PreferenceKey::SwapVolumeButtons,
        PreferenceKey::VolumeControlRingStream,
        PreferenceKey::ButtonBacklight,
        PreferenceKey::EnableNavigationBar,
        PreferenceKey::NavigationBarLeft,
        PreferenceKey::NavigationRecentsLongPress,
        PreferenceKey::EnableHwKeys,
    ];

    pub fn id(self) -> &'static str {
        match self {
            PreferenceKey::PowerEndCall => "power_end_call",
            PreferenceKey::HomeWakeScreen => setting::HOME_WAKE_SCREEN,
            PreferenceKey::HomeAnswerCall => "home_answer_call",
            PreferenceKey::HomeLongPress => "hardware_keys_home_long_press",
            PreferenceKey::HomeDoubleTap => "hardware_keys_home_double_tap",
            PreferenceKey::BackWakeScreen => setting::BACK_WAKE_SCREEN,
            PreferenceKey::MenuWakeScreen => setting::MENU_WAKE_SCREEN,
            PreferenceKey::MenuPress => "hardware_keys_menu_press",
            PreferenceKey::MenuLongPress => "hardware_keys_menu_long_press",
            PreferenceKey::AssistWakeScreen => setting::ASSIST_WAKE_SCREEN,
            PreferenceKey::AssistPress => "hardware_keys_assist_press",
            PreferenceKey::AssistLongPress => "hardware_keys_assist_long_press",
            PreferenceKey::AppSwitchWakeScreen => setting::APP_SWITCH_WAKE_SCREEN,
            PreferenceKey::AppSwitchPress => "hardware_keys_app_switch_press",
            PreferenceKey::AppSwitchLongPress => "hardware_keys_app_switch_long_press",
            PreferenceKey::VolumeWakeScreen => setting::VOLUME_WAKE_SCREEN,
            PreferenceKey::VolumeMusicControls => setting::VOLUME_MUSIC_CONTROLS,
            PreferenceKey::VolumeKeyCursorControl => "volume_key_cursor_control",
            PreferenceKey::SwapVolumeButtons => "swap_volume_buttons",
            PreferenceKey::VolumeControlRingStream => "volume_keys_control_ring_stream",
            PreferenceKey::ButtonBacklight => "button_backlight",
            PreferenceKey::EnableNavigationBar => "enable_nav_bar",
            PreferenceKey::NavigationBarLeft => "navigation_bar_left",
            PreferenceKey::NavigationRecentsLongPress => "navigation_recents_long_press",
            PreferenceKey::EnableHwKeys => "enable_hw_keys",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }

    /// Category the preference lives in on the screen
    pub fn category(self) -> Category {
        use PreferenceKey::*;
        match self {
            PowerEndCall => Category::Power,
            HomeWakeScreen | HomeAnswerCall | HomeLongPress | HomeDoubleTap => Category::Home,
            BackWakeScreen => Category::Back,
            MenuWakeScreen | MenuPress | MenuLongPress => Category::Menu,
            AssistWakeScreen | AssistPress | AssistLongPress => Category::Assist,
            AppSwitchWakeScreen | AppSwitchPress | AppSwitchLongPress => Category::AppSwitch,
            VolumeWakeScreen | VolumeMusicControls | VolumeKeyCursorControl
            | SwapVolumeButtons | VolumeControlRingStream => Category::Volume,
            ButtonBacklight => Category::Backlight,
            EnableNavigationBar | NavigationBarLeft | NavigationRecentsLongPress => {
                Category::NavigationBar
            }
            EnableHwKeys => Category::HwKeys,
        }
    }

    /// Settings-store key the preference writes to on change
    ///
    /// `None` for the backlight control, which is written by its own dialog.
    pub fn write_key(self) -> Option<&'static str> {
        use PreferenceKey::*;
        let key = match self {
            PowerEndCall => setting::INCALL_POWER_BUTTON_BEHAVIOR,
            HomeWakeScreen => setting::HOME_WAKE_SCREEN,
            HomeAnswerCall => setting::RING_HOME_BUTTON_BEHAVIOR,
            HomeLongPress => setting::HOME_LONG_PRESS_ACTION,
            HomeDoubleTap => setting::HOME_DOUBLE_TAP_ACTION,
            BackWakeScreen => setting::BACK_WAKE_SCREEN,
            MenuWakeScreen => setting::MENU_WAKE_SCREEN,
            MenuPress => setting::MENU_ACTION,
            MenuLongPress => setting::MENU_LONG_PRESS_ACTION,
            AssistWakeScreen => setting::ASSIST_WAKE_SCREEN,
            AssistPress => setting::ASSIST_ACTION,
            AssistLongPress => setting::ASSIST_LONG_PRESS_ACTION,
            AppSwitchWakeScreen => setting::APP_SWITCH_WAKE_SCREEN,
            AppSwitchPress => setting::APP_SWITCH_ACTION,
            AppSwitchLongPress => setting::APP_SWITCH_LONG_PRESS_ACTION,
            VolumeWakeScreen => setting::VOLUME_WAKE_SCREEN,
            VolumeMusicControls => setting::VOLUME_MUSIC_CONTROLS,
            VolumeKeyCursorControl => setting::VOLUME_KEY_CURSOR_CONTROL,
            SwapVolumeButtons => setting::SWAP_VOLUME_KEYS_ON_ROTATION,
            VolumeControlRingStream => setting::VOLUME_KEYS_CONTROL_RING_STREAM,
            ButtonBacklight => return None,
            EnableNavigationBar => setting::NAVIGATION_BAR_SHOW,
            NavigationBarLeft => setting::NAVIGATION_BAR_LEFT,
            NavigationRecentsLongPress => setting::RECENTS_LONG_PRESS_ACTIVITY,
            EnableHwKeys => setting::ENABLE_HW_KEYS,
        };
        Some(key)
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl Serialize for PreferenceKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mask_values() {
        assert_eq!(HwKey::Home.mask(), 0x01);
        assert_eq!(HwKey::AppSwitch.mask(), 0x10);
        assert_eq!(HwKey::Volume.mask(), 0x40);
    }

    #[test]
    fn test_key_mask_contains() {
        let mask = KeyMask::from_keys(&[HwKey::Home, HwKey::Menu]);
        assert_eq!(mask, KeyMask(0x05));
        assert!(mask.contains(HwKey::Home));
        assert!(!mask.contains(HwKey::Back));
        assert_eq!(mask.without(HwKey::Home).keys(), vec![HwKey::Menu]);
        assert!(mask.with(HwKey::Back).contains(HwKey::Back));
    }

    #[test]
    fn test_preference_ids_round_trip() {
        for key in PreferenceKey::ALL {
            assert_eq!(PreferenceKey::from_id(key.id()), Some(key));
        }
        for category in Category::ALL {
            assert_eq!(Category::from_id(category.id()), Some(category));
        }
        assert_eq!(PreferenceKey::from_id("nope"), None);
    }

    #[test]
    fn test_wake_toggles_live_in_key_category() {
        assert_eq!(PreferenceKey::BackWakeScreen.category(), Category::Back);
        assert_eq!(PreferenceKey::VolumeWakeScreen.category(), Category::Volume);
        assert_eq!(PreferenceKey::EnableHwKeys.category(), Category::HwKeys);
    }

    #[test]
    fn test_write_keys() {
        assert_eq!(
            PreferenceKey::MenuLongPress.write_key(),
            Some(setting::MENU_LONG_PRESS_ACTION)
        );
        assert_eq!(PreferenceKey::ButtonBacklight.write_key(), None);
    }

    #[test]
    fn test_key_mask_serializes_as_integer() {
        let json = serde_json::to_string(&KeyMask(0x45)).unwrap();
        assert_eq!(json, "69");
    }
}
