//! Hardware key disabling
//!
//! Turning the physical keys off also turns their backlight off. The
//! brightness in effect before the first disable is kept in the private prefs
//! store and restored when the keys come back.

use crate::hardware::{Feature, HardwareService};
use crate::keys::{setting, Category, PreferenceKey};
use crate::store::SettingsStore;

/// Categories usable only while hardware keys are enabled
pub const HW_KEY_DEPENDENT_CATEGORIES: [Category; 4] = [
    Category::Home,
    Category::Menu,
    Category::Assist,
    Category::AppSwitch,
];

/// Single preferences usable only while hardware keys are enabled
pub const HW_KEY_DEPENDENT_PREFERENCES: [PreferenceKey; 2] = [
    PreferenceKey::ButtonBacklight,
    PreferenceKey::NavigationBarLeft,
];

/// Stored hardware-keys state, enabled unless set otherwise
pub fn hw_keys_enabled(settings: &dyn SettingsStore) -> bool {
    settings.get_int(setting::ENABLE_HW_KEYS, 1) == 1
}

/// Persist the hardware-keys state and apply it to the device
///
/// Disabling snapshots the current button brightness (only when no snapshot
/// exists yet) and forces it to 0. Enabling restores the snapshot, or
/// `default_brightness` without one, and drops it. Hardware and store
/// failures are logged and otherwise ignored.
pub fn write_disable_hw_keys_option(
    settings: &mut dyn SettingsStore,
    prefs: &mut dyn SettingsStore,
    hardware: &mut dyn HardwareService,
    enabled: bool,
    default_brightness: i32,
) {
    if !settings.put_int(setting::ENABLE_HW_KEYS, if enabled { 1 } else { 0 }) {
        tracing::warn!(enabled, "Failed to persist hardware keys state");
    }

    if let Err(e) = hardware.set(Feature::KeyDisable, !enabled) {
        tracing::warn!(error = %e, enabled, "Failed to apply key disabler");
    }

    if !enabled {
        let current = settings.get_int(setting::BUTTON_BRIGHTNESS, default_brightness);
        if !prefs.contains(setting::PRE_NAVBAR_BUTTON_BACKLIGHT) {
            prefs.put_int(setting::PRE_NAVBAR_BUTTON_BACKLIGHT, current);
            tracing::debug!(brightness = current, "Saved button brightness");
        }
        settings.put_int(setting::BUTTON_BRIGHTNESS, 0);
    } else {
        let previous = prefs.get_int(setting::PRE_NAVBAR_BUTTON_BACKLIGHT, default_brightness);
        settings.put_int(setting::BUTTON_BRIGHTNESS, previous);
        prefs.remove(setting::PRE_NAVBAR_BUTTON_BACKLIGHT);
        tracing::debug!(brightness = previous, "Restored button brightness");
    }

    tracing::info!(enabled, "Hardware keys state written");
}

/// Re-apply the stored hardware-keys state, e.g. after boot
///
/// Returns `false` without touching anything when the device has no key
/// disabler.
pub fn restore_key_disabler(
    settings: &mut dyn SettingsStore,
    prefs: &mut dyn SettingsStore,
    hardware: &mut dyn HardwareService,
    default_brightness: i32,
) -> bool {
    if !hardware.is_supported(Feature::KeyDisable) {
        tracing::debug!("Key disabler not supported, nothing to restore");
        return false;
    }

    let enabled = hw_keys_enabled(settings);
    write_disable_hw_keys_option(settings, prefs, hardware, enabled, default_brightness);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::MemoryHardware;
    use crate::store::MemoryStore;

    const DEFAULT: i32 = 255;

    struct Rig {
        settings: MemoryStore,
        prefs: MemoryStore,
        hardware: MemoryHardware,
    }

    impl Rig {
        fn new(brightness: Option<&str>) -> Self {
            let settings = match brightness {
                Some(b) => MemoryStore::from_pairs([(setting::BUTTON_BRIGHTNESS, b)]),
                None => MemoryStore::new(),
            };
            Self {
                settings,
                prefs: MemoryStore::new(),
                hardware: MemoryHardware::with_features(&[Feature::KeyDisable]),
            }
        }

        fn write(&mut self, enabled: bool) {
            write_disable_hw_keys_option(
                &mut self.settings,
                &mut self.prefs,
                &mut self.hardware,
                enabled,
                DEFAULT,
            );
        }

        fn brightness(&self) -> i32 {
            self.settings.get_int(setting::BUTTON_BRIGHTNESS, -1)
        }
    }

    #[test]
    fn test_disable_then_enable_restores_brightness() {
        let mut rig = Rig::new(Some("120"));

        rig.write(false);
        assert_eq!(rig.brightness(), 0);
        assert_eq!(rig.hardware.state(Feature::KeyDisable), Some(true));
        assert!(!hw_keys_enabled(&rig.settings));

        rig.write(true);
        assert_eq!(rig.brightness(), 120);
        assert_eq!(rig.hardware.state(Feature::KeyDisable), Some(false));
        assert!(hw_keys_enabled(&rig.settings));
        assert!(!rig.prefs.contains(setting::PRE_NAVBAR_BUTTON_BACKLIGHT));
    }

    #[test]
    fn test_repeated_disable_keeps_first_snapshot() {
        let mut rig = Rig::new(Some("80"));

        rig.write(false);
        rig.write(false);
        assert_eq!(rig.prefs.get_int(setting::PRE_NAVBAR_BUTTON_BACKLIGHT, -1), 80);

        rig.write(true);
        assert_eq!(rig.brightness(), 80);
    }

    #[test]
    fn test_enable_without_snapshot_uses_default() {
        let mut rig = Rig::new(Some("10"));
        rig.write(true);
        assert_eq!(rig.brightness(), DEFAULT);
    }

    #[test]
    fn test_disable_without_brightness_snapshots_default() {
        let mut rig = Rig::new(None);
        rig.write(false);
        assert_eq!(rig.prefs.get_int(setting::PRE_NAVBAR_BUTTON_BACKLIGHT, -1), DEFAULT);
    }

    #[test]
    fn test_unsupported_hardware_still_persists() {
        let mut rig = Rig::new(Some("50"));
        rig.hardware = MemoryHardware::default();
        rig.write(false);
        assert_eq!(rig.brightness(), 0);
        assert_eq!(rig.settings.get_int(setting::ENABLE_HW_KEYS, 1), 0);
    }

    #[test]
    fn test_restore_key_disabler() {
        let mut rig = Rig::new(Some("60"));
        rig.settings.put_int(setting::ENABLE_HW_KEYS, 0);

        assert!(restore_key_disabler(
            &mut rig.settings,
            &mut rig.prefs,
            &mut rig.hardware,
            DEFAULT
        ));
        assert_eq!(rig.hardware.state(Feature::KeyDisable), Some(true));
        assert_eq!(rig.brightness(), 0);
        assert_eq!(rig.prefs.get_int(setting::PRE_NAVBAR_BUTTON_BACKLIGHT, -1), 60);
    }

    #[test]
    fn test_restore_without_key_disabler_is_noop() {
        let mut rig = Rig::new(Some("60"));
        rig.hardware = MemoryHardware::default();

        assert!(!restore_key_disabler(
            &mut rig.settings,
            &mut rig.prefs,
            &mut rig.hardware,
            DEFAULT
        ));
        assert_eq!(rig.brightness(), 60);
    }
}
