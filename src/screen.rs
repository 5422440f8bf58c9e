//! Button settings screen state
//!
//! [`ButtonSettings`] is the per-screen state rebuilt on every load. It owns
//! the collaborators (settings store, private prefs, hardware service,
//! activity resolver), computes which preferences exist, fills each control
//! from the store and writes user changes back.
//!
//! A control exists only when its preference survived removal, so every
//! lookup returns an `Option` and callers must handle absence. Changes are
//! dispatched on [`PreferenceKey`], never on control identity.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::actions::{ActionCode, CursorControl};
use crate::capabilities::{probe_input_keys, DeviceCapabilities};
use crate::config::Config;
use crate::controls::{BacklightControl, ListControl, PreferenceValue, SwitchControl};
use crate::hardware::{Feature, HardwareService, SysfsHardware};
use crate::hwkeys::{self, HW_KEY_DEPENDENT_CATEGORIES, HW_KEY_DEPENDENT_PREFERENCES};
use crate::keys::{setting, Category, PreferenceKey};
use crate::recents::{build_recents_choices, ActivityResolver, ConfiguredActivities};
use crate::resolver::{compute_removals, ACTION_BINDINGS, RemovalSet};
use crate::store::{JsonFileStore, MemoryStore, SettingsStore, StoreError};

/// Collaborators the screen reads from and writes to
pub struct Services {
    /// Platform settings store
    pub settings: Box<dyn SettingsStore + Send>,
    /// Private preferences of the settings screen (brightness snapshot)
    pub prefs: Box<dyn SettingsStore + Send>,
    pub hardware: Box<dyn HardwareService + Send>,
    pub activities: Box<dyn ActivityResolver + Send>,
}

/// State of one preference control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Control {
    List(ListControl),
    Switch(SwitchControl),
    Backlight(BacklightControl),
}

impl Control {
    pub fn enabled(&self) -> bool {
        match self {
            Control::List(l) => l.enabled,
            Control::Switch(s) => s.enabled,
            Control::Backlight(b) => b.enabled,
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        match self {
            Control::List(l) => l.enabled = enabled,
            Control::Switch(s) => s.enabled = enabled,
            Control::Backlight(b) => b.enabled = enabled,
        }
    }

    /// Current value as text
    pub fn value(&self) -> String {
        match self {
            Control::List(l) => l.value.clone(),
            Control::Switch(s) => s.checked.to_string(),
            Control::Backlight(b) => b.brightness.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Control::List(l) => l.summary.clone(),
            Control::Switch(_) => String::new(),
            Control::Backlight(b) => b.summary(),
        }
    }
}

/// Render-ready description of one preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceDescriptor {
    pub key: PreferenceKey,
    pub category: Category,
    /// `false` means removed: never rendered, never accepts input
    pub visible: bool,
    pub enabled: bool,
    pub value: String,
    pub summary: String,
    /// Settings-store key written on change
    pub write_key: Option<&'static str>,
}

// ============================================================================
// Screen
// ============================================================================

/// Per-screen state of the button settings
pub struct ButtonSettings {
    caps: DeviceCapabilities,
    services: Services,
    removals: RemovalSet,
    controls: BTreeMap<PreferenceKey, Control>,
    category_enabled: BTreeMap<Category, bool>,
}

impl ButtonSettings {
    /// Build the screen for `caps`, reading every control from the store
    pub fn create(caps: DeviceCapabilities, services: Services) -> Self {
        let removals = compute_removals(&caps);

        tracing::info!(
            device_keys = caps.device_keys.0,
            wake_keys = caps.wake_keys.0,
            removed = removals.len(),
            "Button settings screen created"
        );

        let mut screen = Self {
            caps,
            services,
            removals,
            controls: BTreeMap::new(),
            category_enabled: BTreeMap::new(),
        };
        screen.load_controls();
        screen
    }

    /// Re-read the stores and refresh every control
    pub fn resume(&mut self) {
        if let Err(e) = self.services.settings.reload() {
            tracing::warn!(error = %e, "Failed to reload settings store, keeping cached values");
        }
        if let Err(e) = self.services.prefs.reload() {
            tracing::warn!(error = %e, "Failed to reload private prefs");
        }
        self.load_controls();
        tracing::debug!("Button settings screen resumed");
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.caps
    }

    pub fn removals(&self) -> &RemovalSet {
        &self.removals
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.services.settings.as_ref()
    }

    pub fn prefs(&self) -> &dyn SettingsStore {
        self.services.prefs.as_ref()
    }

    pub fn control(&self, key: PreferenceKey) -> Option<&Control> {
        self.controls.get(&key)
    }

    pub fn list(&self, key: PreferenceKey) -> Option<&ListControl> {
        match self.controls.get(&key) {
            Some(Control::List(l)) => Some(l),
            _ => None,
        }
    }

    pub fn switch(&self, key: PreferenceKey) -> Option<&SwitchControl> {
        match self.controls.get(&key) {
            Some(Control::Switch(s)) => Some(s),
            _ => None,
        }
    }

    pub fn backlight(&self) -> Option<&BacklightControl> {
        match self.controls.get(&PreferenceKey::ButtonBacklight) {
            Some(Control::Backlight(b)) => Some(b),
            _ => None,
        }
    }

    pub fn is_visible(&self, key: PreferenceKey) -> bool {
        !self.removals.is_removed(key)
    }

    pub fn is_category_enabled(&self, category: Category) -> bool {
        self.category_enabled.get(&category).copied().unwrap_or(true)
    }

    /// Whether `key` accepts input: present, enabled, and in an enabled category
    pub fn is_enabled(&self, key: PreferenceKey) -> bool {
        self.controls
            .get(&key)
            .map(|c| c.enabled() && self.is_category_enabled(key.category()))
            .unwrap_or(false)
    }

    pub fn hw_keys_enabled(&self) -> bool {
        hwkeys::hw_keys_enabled(self.services.settings.as_ref())
    }

    /// One descriptor per preference of the screen, removed ones included
    pub fn descriptors(&self) -> Vec<PreferenceDescriptor> {
        PreferenceKey::ALL
            .iter()
            .map(|&key| {
                let visible = self.is_visible(key);
                let control = if visible { self.controls.get(&key) } else { None };
                PreferenceDescriptor {
                    key,
                    category: key.category(),
                    visible,
                    enabled: visible && self.is_enabled(key),
                    value: control.map(Control::value).unwrap_or_default(),
                    summary: control.map(Control::summary).unwrap_or_default(),
                    write_key: key.write_key(),
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    fn load_controls(&mut self) {
        self.controls.clear();
        self.category_enabled.clear();

        let settings = self.services.settings.as_ref();
        let caps = &self.caps;
        let mut controls = BTreeMap::new();

        let nav_bar_default = if caps.nav_bar_by_default { 1 } else { 0 };
        controls.insert(
            PreferenceKey::EnableNavigationBar,
            Control::Switch(SwitchControl::new(
                settings.get_int(setting::NAVIGATION_BAR_SHOW, nav_bar_default) == 1,
            )),
        );
        controls.insert(
            PreferenceKey::EnableHwKeys,
            Control::Switch(SwitchControl::new(hwkeys::hw_keys_enabled(settings))),
        );

        for binding in ACTION_BINDINGS {
            if !caps.has_key(binding.requires) {
                continue;
            }
            let default = (binding.default)(caps);
            let action = ActionCode::clamped(settings.get_int(binding.setting, default.code()));
            let mut list = ListControl::new(ActionCode::entries());
            list.select(&action.code().to_string());
            controls.insert(binding.preference, Control::List(list));
        }

        if caps.has_volume_rocker {
            let cursor = CursorControl::clamped(settings.get_int(setting::VOLUME_KEY_CURSOR_CONTROL, 0));
            let mut list = ListControl::new(CursorControl::entries());
            list.select(&cursor.code().to_string());
            controls.insert(PreferenceKey::VolumeKeyCursorControl, Control::List(list));

            controls.insert(
                PreferenceKey::SwapVolumeButtons,
                Control::Switch(SwitchControl::new(
                    settings.get_int(setting::SWAP_VOLUME_KEYS_ON_ROTATION, 0) > 0,
                )),
            );
        }

        controls.insert(
            PreferenceKey::VolumeControlRingStream,
            Control::Switch(SwitchControl::new(
                settings.get_int(setting::VOLUME_KEYS_CONTROL_RING_STREAM, 1) > 0,
            )),
        );

        for key in [
            PreferenceKey::HomeWakeScreen,
            PreferenceKey::BackWakeScreen,
            PreferenceKey::MenuWakeScreen,
            PreferenceKey::AssistWakeScreen,
            PreferenceKey::AppSwitchWakeScreen,
            PreferenceKey::VolumeWakeScreen,
            PreferenceKey::NavigationBarLeft,
        ] {
            if let Some(write_key) = key.write_key() {
                controls.insert(
                    key,
                    Control::Switch(SwitchControl::new(settings.get_int(write_key, 0) == 1)),
                );
            }
        }
        controls.insert(
            PreferenceKey::VolumeMusicControls,
            Control::Switch(SwitchControl::new(
                settings.get_int(setting::VOLUME_MUSIC_CONTROLS, 1) == 1,
            )),
        );

        let power_behavior = settings.get_int(
            setting::INCALL_POWER_BUTTON_BEHAVIOR,
            setting::INCALL_POWER_BUTTON_BEHAVIOR_DEFAULT,
        );
        controls.insert(
            PreferenceKey::PowerEndCall,
            Control::Switch(SwitchControl::new(
                power_behavior == setting::INCALL_POWER_BUTTON_BEHAVIOR_HANGUP,
            )),
        );

        let home_behavior = settings.get_int(
            setting::RING_HOME_BUTTON_BEHAVIOR,
            setting::RING_HOME_BUTTON_BEHAVIOR_DEFAULT,
        );
        controls.insert(
            PreferenceKey::HomeAnswerCall,
            Control::Switch(SwitchControl::new(
                home_behavior == setting::RING_HOME_BUTTON_BEHAVIOR_ANSWER,
            )),
        );

        controls.insert(
            PreferenceKey::ButtonBacklight,
            Control::Backlight(BacklightControl {
                brightness: settings.get_int(setting::BUTTON_BRIGHTNESS, caps.default_button_brightness),
                enabled: true,
            }),
        );

        // Removed preferences have no control at all
        controls.retain(|key: &PreferenceKey, _| !self.removals.is_removed(*key));
        self.controls = controls;

        if !self.removals.is_removed(PreferenceKey::NavigationRecentsLongPress) {
            let list = build_recents_choices(
                self.services.activities.as_ref(),
                self.services.settings.as_mut(),
            );
            self.controls
                .insert(PreferenceKey::NavigationRecentsLongPress, Control::List(list));
        }

        self.update_music_controls_dependency();
        self.update_disable_hw_keys_option();
        self.update_nav_bar_settings();
    }

    /// Music controls are unavailable while volume keys wake the screen
    fn update_music_controls_dependency(&mut self) {
        let wake_checked = match self.controls.get(&PreferenceKey::VolumeWakeScreen) {
            Some(Control::Switch(s)) => s.checked,
            _ => return,
        };
        if let Some(music) = self.controls.get_mut(&PreferenceKey::VolumeMusicControls) {
            music.set_enabled(!wake_checked);
        }
    }

    /// Sync the hardware-keys switch and everything that depends on it
    fn update_disable_hw_keys_option(&mut self) {
        let enabled = self.hw_keys_enabled();

        if let Some(Control::Switch(s)) = self.controls.get_mut(&PreferenceKey::EnableHwKeys) {
            s.checked = enabled;
        }

        if let Some(Control::Backlight(b)) = self.controls.get_mut(&PreferenceKey::ButtonBacklight) {
            b.brightness = self
                .services
                .settings
                .get_int(setting::BUTTON_BRIGHTNESS, self.caps.default_button_brightness);
        }

        for category in HW_KEY_DEPENDENT_CATEGORIES {
            if !self.removals.is_category_removed(category) {
                self.category_enabled.insert(category, enabled);
            }
        }
        for key in HW_KEY_DEPENDENT_PREFERENCES {
            if let Some(control) = self.controls.get_mut(&key) {
                control.set_enabled(enabled);
            }
        }
    }

    fn update_nav_bar_settings(&mut self) {
        let default = if self.caps.nav_bar_by_default { 1 } else { 0 };
        let show = self.services.settings.get_int(setting::NAVIGATION_BAR_SHOW, default) == 1;
        if let Some(Control::Switch(s)) = self.controls.get_mut(&PreferenceKey::EnableNavigationBar) {
            s.checked = show;
        }
    }

    // ------------------------------------------------------------------------
    // Changes
    // ------------------------------------------------------------------------

    /// Enable or disable the physical keys and refresh their dependents
    pub fn set_hw_keys_enabled(&mut self, enabled: bool) {
        let services = &mut self.services;
        hwkeys::write_disable_hw_keys_option(
            services.settings.as_mut(),
            services.prefs.as_mut(),
            services.hardware.as_mut(),
            enabled,
            self.caps.default_button_brightness,
        );
        self.update_disable_hw_keys_option();
    }

    /// Apply a user change to `key`
    ///
    /// Removed, absent and disabled preferences reject input. List values must
    /// be one of the list's entries.
    pub fn apply(&mut self, key: PreferenceKey, value: PreferenceValue) -> Result<(), ScreenError> {
        if self.removals.is_removed(key) {
            return Err(ScreenError::Removed(key));
        }
        if !self.controls.contains_key(&key) {
            return Err(ScreenError::NotPresent(key));
        }
        if !self.is_enabled(key) {
            return Err(ScreenError::Disabled(key));
        }

        tracing::debug!(key = %key, value = ?value, "Preference change");

        use PreferenceKey::*;
        match (key, value) {
            (ButtonBacklight, _) => Err(ScreenError::NotWritable(key)),

            (NavigationRecentsLongPress, PreferenceValue::Choice(v)) => self.apply_recents(&v),

            (HomeLongPress | HomeDoubleTap | MenuPress | MenuLongPress | AssistPress
            | AssistLongPress | AppSwitchPress | AppSwitchLongPress | VolumeKeyCursorControl,
             PreferenceValue::Choice(v)) => self.apply_int_choice(key, &v),

            (EnableHwKeys, PreferenceValue::Bool(b)) => {
                self.set_hw_keys_enabled(b);
                Ok(())
            }

            (EnableNavigationBar, PreferenceValue::Bool(b)) => {
                self.write_switch(key, b, if b { 1 } else { 0 });
                Ok(())
            }

            (SwapVolumeButtons, PreferenceValue::Bool(b)) => {
                let value = match (b, self.caps.is_tablet) {
                    (false, _) => 0,
                    (true, true) => 2,
                    (true, false) => 1,
                };
                self.write_switch(key, b, value);
                Ok(())
            }

            (PowerEndCall, PreferenceValue::Bool(b)) => {
                let value = if b {
                    setting::INCALL_POWER_BUTTON_BEHAVIOR_HANGUP
                } else {
                    setting::INCALL_POWER_BUTTON_BEHAVIOR_SCREEN_OFF
                };
                self.write_switch(key, b, value);
                Ok(())
            }

            (HomeAnswerCall, PreferenceValue::Bool(b)) => {
                let value = if b {
                    setting::RING_HOME_BUTTON_BEHAVIOR_ANSWER
                } else {
                    setting::RING_HOME_BUTTON_BEHAVIOR_DO_NOTHING
                };
                self.write_switch(key, b, value);
                Ok(())
            }

            (VolumeControlRingStream | VolumeMusicControls | NavigationBarLeft | HomeWakeScreen
            | BackWakeScreen | MenuWakeScreen | AssistWakeScreen | AppSwitchWakeScreen
            | VolumeWakeScreen, PreferenceValue::Bool(b)) => {
                self.write_switch(key, b, if b { 1 } else { 0 });
                if key == VolumeWakeScreen {
                    self.update_music_controls_dependency();
                }
                Ok(())
            }

            _ => Err(ScreenError::TypeMismatch(key)),
        }
    }

    fn write_switch(&mut self, key: PreferenceKey, checked: bool, stored: i32) {
        if let Some(write_key) = key.write_key() {
            if !self.services.settings.put_int(write_key, stored) {
                tracing::warn!(key = %key, "Settings write failed");
            }
        }
        if let Some(Control::Switch(s)) = self.controls.get_mut(&key) {
            s.checked = checked;
        }
    }

    fn apply_int_choice(&mut self, key: PreferenceKey, value: &str) -> Result<(), ScreenError> {
        let unknown = || ScreenError::UnknownChoice {
            key,
            value: value.to_string(),
        };

        let code: i32 = value.trim().parse().map_err(|_| unknown())?;
        let list = match self.controls.get_mut(&key) {
            Some(Control::List(l)) => l,
            _ => return Err(ScreenError::TypeMismatch(key)),
        };
        list.select(&code.to_string()).ok_or_else(unknown)?;

        if let Some(write_key) = key.write_key() {
            if !self.services.settings.put_int(write_key, code) {
                tracing::warn!(key = %key, code, "Settings write failed");
            }
        }
        tracing::info!(key = %key, code, "Action changed");
        Ok(())
    }

    fn apply_recents(&mut self, value: &str) -> Result<(), ScreenError> {
        let key = PreferenceKey::NavigationRecentsLongPress;
        let list = match self.controls.get_mut(&key) {
            Some(Control::List(l)) => l,
            _ => return Err(ScreenError::TypeMismatch(key)),
        };
        list.select(value).ok_or_else(|| ScreenError::UnknownChoice {
            key,
            value: value.to_string(),
        })?;

        let stored = if value.is_empty() { None } else { Some(value) };
        if !self
            .services
            .settings
            .put_string(setting::RECENTS_LONG_PRESS_ACTIVITY, stored)
        {
            tracing::warn!("Failed to store recents long press activity");
        }
        tracing::info!(activity = value, "Recents long press target changed");
        Ok(())
    }
}

// ============================================================================
// Construction from configuration
// ============================================================================

impl Services {
    /// File-backed stores, sysfs hardware and configured activities
    ///
    /// Without a resolvable config directory the stores fall back to memory.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let settings: Box<dyn SettingsStore + Send> = match config.settings_file() {
            Some(path) => Box::new(JsonFileStore::open(path)?),
            None => {
                tracing::warn!("No settings file location, using an in-memory store");
                Box::new(MemoryStore::new())
            }
        };
        let prefs: Box<dyn SettingsStore + Send> = match config.prefs_file() {
            Some(path) => Box::new(JsonFileStore::open(path)?),
            None => Box::new(MemoryStore::new()),
        };

        Ok(Self {
            settings,
            prefs,
            hardware: Box::new(SysfsHardware::new(config.hardware.clone())),
            activities: Box::new(ConfiguredActivities::new(config.recents_activities.clone())),
        })
    }
}

/// Configured capabilities, with key presence probed from /dev/input when enabled
///
/// A failed probe keeps the configured keys. Backlights whose control node
/// the hardware service reports are supported even when the flags are off.
pub fn effective_capabilities(config: &Config, hardware: &dyn HardwareService) -> DeviceCapabilities {
    let mut caps = if config.probe_input_devices {
        probed_capabilities(config)
    } else {
        config.device.clone()
    };

    caps.button_backlight_supported |= hardware.is_supported(Feature::ButtonBacklight);
    caps.keyboard_backlight_supported |= hardware.is_supported(Feature::KeyboardBacklight);
    caps
}

fn probed_capabilities(config: &Config) -> DeviceCapabilities {
    match probe_input_keys() {
        Ok(probed) => {
            tracing::info!(
                devices = probed.devices.len(),
                device_keys = probed.device_keys.0,
                power = probed.has_power_key,
                "Input keys probed"
            );
            config.device.clone().with_probed(&probed)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Input key probe failed, using configured keys");
            config.device.clone()
        }
    }
}

impl ButtonSettings {
    /// Build the screen the daemon serves from `config`
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let services = Services::from_config(config)?;
        let caps = effective_capabilities(config, services.hardware.as_ref());
        Ok(Self::create(caps, services))
    }

    /// Re-apply the stored hardware-keys state to the device
    pub fn restore_key_disabler(&mut self) -> bool {
        let services = &mut self.services;
        hwkeys::restore_key_disabler(
            services.settings.as_mut(),
            services.prefs.as_mut(),
            services.hardware.as_mut(),
            self.caps.default_button_brightness,
        )
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Rejected preference change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// Preference was removed for this device
    Removed(PreferenceKey),
    /// Preference has no control on this screen
    NotPresent(PreferenceKey),
    /// Preference is currently disabled
    Disabled(PreferenceKey),
    /// Preference is written elsewhere
    NotWritable(PreferenceKey),
    /// Switch value for a list or the other way round
    TypeMismatch(PreferenceKey),
    /// Value is not one of the list's entries
    UnknownChoice { key: PreferenceKey, value: String },
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenError::Removed(k) => write!(f, "Preference removed on this device: {}", k),
            ScreenError::NotPresent(k) => write!(f, "Preference not present: {}", k),
            ScreenError::Disabled(k) => write!(f, "Preference disabled: {}", k),
            ScreenError::NotWritable(k) => write!(f, "Preference not writable here: {}", k),
            ScreenError::TypeMismatch(k) => write!(f, "Wrong value type for {}", k),
            ScreenError::UnknownChoice { key, value } => {
                write!(f, "Unknown choice '{}' for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ScreenError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{HardwareConfig, MemoryHardware};
    use crate::keys::{HwKey, KeyMask};
    use crate::recents::{ConfiguredActivity, RECENTS_LONG_PRESS_ACTION};

    fn full_caps() -> DeviceCapabilities {
        let nav = [HwKey::Home, HwKey::Back, HwKey::Menu, HwKey::Assist, HwKey::AppSwitch];
        DeviceCapabilities {
            device_keys: KeyMask::from_keys(&nav).with(HwKey::Volume),
            wake_keys: KeyMask::from_keys(&[HwKey::Home, HwKey::Back, HwKey::Volume]),
            hw_keys_pref_configurable: true,
            button_backlight_supported: true,
            ..Default::default()
        }
    }

    fn services(settings: MemoryStore, activities: Vec<ConfiguredActivity>) -> Services {
        Services {
            settings: Box::new(settings),
            prefs: Box::new(MemoryStore::new()),
            hardware: Box::new(MemoryHardware::with_features(&[Feature::KeyDisable])),
            activities: Box::new(ConfiguredActivities::new(activities)),
        }
    }

    fn screen(caps: DeviceCapabilities, settings: MemoryStore) -> ButtonSettings {
        ButtonSettings::create(caps, services(settings, Vec::new()))
    }

    #[test]
    fn test_removed_preferences_have_no_control() {
        let caps = DeviceCapabilities {
            device_keys: KeyMask::from_keys(&[HwKey::Home]),
            ..Default::default()
        };
        let s = screen(caps, MemoryStore::new());

        assert!(s.list(PreferenceKey::HomeLongPress).is_some());
        assert!(s.list(PreferenceKey::MenuPress).is_none());
        assert!(s.switch(PreferenceKey::HomeWakeScreen).is_none());
        assert!(s.switch(PreferenceKey::EnableHwKeys).is_none());
        assert!(s.backlight().is_none());

        let descriptor = s
            .descriptors()
            .into_iter()
            .find(|d| d.key == PreferenceKey::MenuPress)
            .unwrap();
        assert!(!descriptor.visible);
        assert!(!descriptor.enabled);
    }

    #[test]
    fn test_action_defaults_and_clamping() {
        let settings = MemoryStore::from_pairs([(setting::HOME_LONG_PRESS_ACTION, "99")]);
        let s = screen(full_caps(), settings);

        let home = s.list(PreferenceKey::HomeLongPress).unwrap();
        assert_eq!(home.value, "0");
        assert_eq!(home.summary, "No action");

        // Assist key present: menu long press defaults to nothing
        assert_eq!(s.list(PreferenceKey::MenuLongPress).unwrap().value, "0");
        assert_eq!(s.list(PreferenceKey::MenuPress).unwrap().value, "1");
        assert_eq!(s.list(PreferenceKey::AssistPress).unwrap().value, "3");
        assert_eq!(s.list(PreferenceKey::AssistLongPress).unwrap().value, "4");
        assert_eq!(s.list(PreferenceKey::AppSwitchPress).unwrap().value, "2");
        // Menu key present: app switch long press defaults to nothing
        assert_eq!(s.list(PreferenceKey::AppSwitchLongPress).unwrap().value, "0");
    }

    #[test]
    fn test_menu_long_press_without_assist_defaults_to_search() {
        let caps = DeviceCapabilities {
            device_keys: KeyMask::from_keys(&[HwKey::Menu]),
            ..Default::default()
        };
        let s = screen(caps, MemoryStore::new());
        let list = s.list(PreferenceKey::MenuLongPress).unwrap();
        assert_eq!(list.value, "3");
        assert_eq!(list.summary, "Search assistant");
    }

    #[test]
    fn test_apply_action_writes_store() {
        let mut s = screen(full_caps(), MemoryStore::new());
        s.apply(PreferenceKey::HomeDoubleTap, PreferenceValue::Choice("7".into()))
            .unwrap();

        assert_eq!(s.settings().get_int(setting::HOME_DOUBLE_TAP_ACTION, -1), 7);
        assert_eq!(s.list(PreferenceKey::HomeDoubleTap).unwrap().summary, "Turn off screen");

        let err = s
            .apply(PreferenceKey::HomeDoubleTap, PreferenceValue::Choice("12".into()))
            .unwrap_err();
        assert!(matches!(err, ScreenError::UnknownChoice { .. }));
        assert_eq!(s.settings().get_int(setting::HOME_DOUBLE_TAP_ACTION, -1), 7);
    }

    #[test]
    fn test_apply_rejects_removed_and_mismatched() {
        let caps = DeviceCapabilities {
            device_keys: KeyMask::from_keys(&[HwKey::Home]),
            ..Default::default()
        };
        let mut s = screen(caps, MemoryStore::new());

        assert_eq!(
            s.apply(PreferenceKey::MenuPress, PreferenceValue::Choice("1".into())),
            Err(ScreenError::Removed(PreferenceKey::MenuPress))
        );
        assert_eq!(
            s.apply(PreferenceKey::HomeLongPress, PreferenceValue::Bool(true)),
            Err(ScreenError::TypeMismatch(PreferenceKey::HomeLongPress))
        );
    }

    #[test]
    fn test_hw_keys_toggle_round_trip() {
        let settings = MemoryStore::from_pairs([(setting::BUTTON_BRIGHTNESS, "133")]);
        let mut s = screen(full_caps(), settings);
        assert!(s.hw_keys_enabled());
        assert!(s.is_category_enabled(Category::Home));

        s.apply(PreferenceKey::EnableHwKeys, PreferenceValue::Bool(false)).unwrap();
        assert!(!s.hw_keys_enabled());
        assert!(!s.switch(PreferenceKey::EnableHwKeys).unwrap().checked);
        assert_eq!(s.settings().get_int(setting::BUTTON_BRIGHTNESS, -1), 0);
        assert_eq!(s.prefs().get_int(setting::PRE_NAVBAR_BUTTON_BACKLIGHT, -1), 133);
        for category in HW_KEY_DEPENDENT_CATEGORIES {
            assert!(!s.is_category_enabled(category));
        }
        assert!(!s.is_enabled(PreferenceKey::ButtonBacklight));
        assert!(!s.is_enabled(PreferenceKey::NavigationBarLeft));
        assert!(!s.is_enabled(PreferenceKey::MenuPress));
        assert_eq!(s.backlight().unwrap().brightness, 0);

        // Disabled preferences reject input
        assert_eq!(
            s.apply(PreferenceKey::MenuPress, PreferenceValue::Choice("0".into())),
            Err(ScreenError::Disabled(PreferenceKey::MenuPress))
        );

        s.apply(PreferenceKey::EnableHwKeys, PreferenceValue::Bool(true)).unwrap();
        assert_eq!(s.settings().get_int(setting::BUTTON_BRIGHTNESS, -1), 133);
        assert!(s.is_enabled(PreferenceKey::MenuPress));
        assert!(s.is_enabled(PreferenceKey::ButtonBacklight));
        assert_eq!(s.backlight().unwrap().brightness, 133);
    }

    #[test]
    fn test_disabled_hw_keys_survive_reload() {
        let settings = MemoryStore::from_pairs([(setting::ENABLE_HW_KEYS, "0")]);
        let s = screen(full_caps(), settings);
        assert!(!s.is_category_enabled(Category::AppSwitch));
        assert!(!s.switch(PreferenceKey::EnableHwKeys).unwrap().checked);
    }

    #[test]
    fn test_switch_writes() {
        let caps = DeviceCapabilities {
            is_tablet: true,
            ..full_caps()
        };
        let mut s = screen(caps, MemoryStore::new());

        s.apply(PreferenceKey::SwapVolumeButtons, PreferenceValue::Bool(true)).unwrap();
        assert_eq!(s.settings().get_int(setting::SWAP_VOLUME_KEYS_ON_ROTATION, -1), 2);
        s.apply(PreferenceKey::SwapVolumeButtons, PreferenceValue::Bool(false)).unwrap();
        assert_eq!(s.settings().get_int(setting::SWAP_VOLUME_KEYS_ON_ROTATION, -1), 0);

        s.apply(PreferenceKey::PowerEndCall, PreferenceValue::Bool(true)).unwrap();
        assert_eq!(
            s.settings().get_int(setting::INCALL_POWER_BUTTON_BEHAVIOR, -1),
            setting::INCALL_POWER_BUTTON_BEHAVIOR_HANGUP
        );

        s.apply(PreferenceKey::HomeAnswerCall, PreferenceValue::Bool(false)).unwrap();
        assert_eq!(
            s.settings().get_int(setting::RING_HOME_BUTTON_BEHAVIOR, -1),
            setting::RING_HOME_BUTTON_BEHAVIOR_DO_NOTHING
        );

        s.apply(PreferenceKey::EnableNavigationBar, PreferenceValue::Bool(true)).unwrap();
        assert_eq!(s.settings().get_int(setting::NAVIGATION_BAR_SHOW, -1), 1);
        assert!(s.switch(PreferenceKey::EnableNavigationBar).unwrap().checked);

        s.apply(PreferenceKey::VolumeControlRingStream, PreferenceValue::Bool(false)).unwrap();
        assert_eq!(s.settings().get_int(setting::VOLUME_KEYS_CONTROL_RING_STREAM, -1), 0);
    }

    #[test]
    fn test_swap_volume_on_phone_writes_one() {
        let mut s = screen(full_caps(), MemoryStore::new());
        s.apply(PreferenceKey::SwapVolumeButtons, PreferenceValue::Bool(true)).unwrap();
        assert_eq!(s.settings().get_int(setting::SWAP_VOLUME_KEYS_ON_ROTATION, -1), 1);
    }

    #[test]
    fn test_resume_reads_call_behaviors() {
        let settings = MemoryStore::from_pairs([
            (setting::INCALL_POWER_BUTTON_BEHAVIOR, "2"),
            (setting::RING_HOME_BUTTON_BEHAVIOR, "1"),
        ]);
        let s = screen(full_caps(), settings);
        assert!(s.switch(PreferenceKey::PowerEndCall).unwrap().checked);
        assert!(!s.switch(PreferenceKey::HomeAnswerCall).unwrap().checked);
    }

    #[test]
    fn test_volume_wake_disables_music_controls() {
        let settings = MemoryStore::from_pairs([(setting::VOLUME_WAKE_SCREEN, "1")]);
        let mut s = screen(full_caps(), settings);
        assert!(!s.is_enabled(PreferenceKey::VolumeMusicControls));

        s.apply(PreferenceKey::VolumeWakeScreen, PreferenceValue::Bool(false)).unwrap();
        assert!(s.is_enabled(PreferenceKey::VolumeMusicControls));
    }

    #[test]
    fn test_nav_bar_default_follows_device() {
        let caps = DeviceCapabilities {
            nav_bar_by_default: true,
            ..full_caps()
        };
        let s = screen(caps, MemoryStore::new());
        assert!(s.switch(PreferenceKey::EnableNavigationBar).unwrap().checked);
    }

    #[test]
    fn test_recents_choice() {
        let activities = vec![
            ConfiguredActivity {
                package: "org.example.a".into(),
                activity: "org.example.a.Main".into(),
                label: Some("Alpha".into()),
                action: RECENTS_LONG_PRESS_ACTION.into(),
            },
            ConfiguredActivity {
                package: "org.example.b".into(),
                activity: "org.example.b.Main".into(),
                label: Some("Beta".into()),
                action: RECENTS_LONG_PRESS_ACTION.into(),
            },
        ];
        let mut s = ButtonSettings::create(full_caps(), services(MemoryStore::new(), activities));

        let key = PreferenceKey::NavigationRecentsLongPress;
        assert_eq!(s.list(key).unwrap().entries.len(), 3);

        s.apply(key, PreferenceValue::Choice("org.example.b/org.example.b.Main".into()))
            .unwrap();
        assert_eq!(s.list(key).unwrap().summary, "Beta");
        assert_eq!(
            s.settings().get_string(setting::RECENTS_LONG_PRESS_ACTIVITY).as_deref(),
            Some("org.example.b/org.example.b.Main")
        );

        s.apply(key, PreferenceValue::Choice(String::new())).unwrap();
        assert_eq!(s.list(key).unwrap().summary, "Last app");
        assert!(!s.settings().contains(setting::RECENTS_LONG_PRESS_ACTIVITY));
    }

    #[test]
    fn test_recents_without_activities_is_disabled() {
        let s = screen(full_caps(), MemoryStore::new());
        let key = PreferenceKey::NavigationRecentsLongPress;
        assert!(!s.list(key).unwrap().enabled);
        assert!(!s.is_enabled(key));
    }

    #[test]
    fn test_backlight_not_writable() {
        let mut s = screen(full_caps(), MemoryStore::new());
        assert_eq!(
            s.apply(PreferenceKey::ButtonBacklight, PreferenceValue::Bool(true)),
            Err(ScreenError::NotWritable(PreferenceKey::ButtonBacklight))
        );
    }

    #[test]
    fn test_descriptors_cover_every_preference() {
        let s = screen(full_caps(), MemoryStore::new());
        let descriptors = s.descriptors();
        assert_eq!(descriptors.len(), PreferenceKey::ALL.len());

        let home = descriptors
            .iter()
            .find(|d| d.key == PreferenceKey::HomeLongPress)
            .unwrap();
        assert!(home.visible);
        assert!(home.enabled);
        assert_eq!(home.category, Category::Home);
        assert_eq!(home.write_key, Some(setting::HOME_LONG_PRESS_ACTION));
    }

    #[test]
    fn test_from_config_uses_file_stores() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.config_path = Some(dir.path().join("config.json"));
        config.device = full_caps();

        let mut s = ButtonSettings::from_config(&config).unwrap();
        assert!(!s.restore_key_disabler());
        s.apply(PreferenceKey::MenuPress, PreferenceValue::Choice("6".into()))
            .unwrap();

        let reopened = JsonFileStore::open(dir.path().join("settings.json")).unwrap();
        assert_eq!(reopened.get_int(setting::MENU_ACTION, -1), 6);
    }

    #[test]
    fn test_backlight_node_makes_backlight_supported() {
        let config = Config::default();
        assert!(!config.device.button_backlight_supported);

        let caps = effective_capabilities(&config, &MemoryHardware::default());
        assert!(compute_removals(&caps).is_removed(PreferenceKey::ButtonBacklight));

        let hardware = MemoryHardware::with_features(&[Feature::ButtonBacklight]);
        let caps = effective_capabilities(&config, &hardware);
        assert!(caps.button_backlight_supported);
        assert!(!caps.keyboard_backlight_supported);
        assert!(!compute_removals(&caps).is_removed(PreferenceKey::ButtonBacklight));
    }

    #[test]
    fn test_from_config_reads_backlight_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let node = dir.path().join("kbd_backlight");
        std::fs::write(&node, "0").unwrap();

        let mut config = Config::default();
        config.config_path = Some(dir.path().join("config.json"));
        config.hardware = HardwareConfig {
            keyboard_backlight_path: Some(node),
            ..Default::default()
        };

        let s = ButtonSettings::from_config(&config).unwrap();
        assert!(s.capabilities().keyboard_backlight_supported);
        assert!(!s.removals().is_removed(PreferenceKey::ButtonBacklight));
    }

    #[test]
    fn test_screen_error_display() {
        let err = ScreenError::UnknownChoice {
            key: PreferenceKey::MenuPress,
            value: "x".into(),
        };
        assert_eq!(format!("{}", err), "Unknown choice 'x' for hardware_keys_menu_press");
    }
}
