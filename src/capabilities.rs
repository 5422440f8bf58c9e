//! Device hardware capability descriptor
//!
//! Describes which physical keys exist, which of them may wake the device,
//! and the device defaults the settings screen falls back to. Normally read
//! from the daemon configuration; the key masks can also be probed from the
//! evdev key bitmaps of the input devices present.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::actions::ActionCode;
use crate::keys::{HwKey, KeyMask};

/// Linux input key codes relevant to the button settings
pub mod scancode {
    pub const KEY_VOLUMEDOWN: u16 = 114;
    pub const KEY_VOLUMEUP: u16 = 115;
    pub const KEY_POWER: u16 = 116;
    pub const KEY_MENU: u16 = 139;
    pub const KEY_BACK: u16 = 158;
    pub const KEY_HOMEPAGE: u16 = 172;
    pub const KEY_CAMERA: u16 = 212;
    pub const KEY_SEARCH: u16 = 217;
    pub const KEY_APPSELECT: u16 = 0x244;
}

/// Default button backlight brightness (0-255)
const DEFAULT_BUTTON_BRIGHTNESS: i32 = 255;

// ============================================================================
// Capabilities
// ============================================================================

/// Static hardware description of the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    /// Keys physically present
    #[serde(default)]
    pub device_keys: KeyMask,

    /// Keys allowed to wake the device from display-off
    #[serde(default)]
    pub wake_keys: KeyMask,

    #[serde(default = "default_true")]
    pub has_power_key: bool,

    /// Whether the navigation bar is shown when the user never chose
    #[serde(default)]
    pub nav_bar_by_default: bool,

    /// Whether the hardware-keys enable/disable category is offered
    #[serde(default)]
    pub hw_keys_pref_configurable: bool,

    /// Whether the device can place voice calls
    #[serde(default = "default_true")]
    pub voice_capable: bool,

    #[serde(default = "default_true")]
    pub has_volume_rocker: bool,

    #[serde(default)]
    pub is_tablet: bool,

    /// Device default for home long press (raw action code)
    #[serde(default)]
    pub default_home_long_press: i32,

    /// Device default for home double tap (raw action code)
    #[serde(default)]
    pub default_home_double_tap: i32,

    #[serde(default = "default_button_brightness")]
    pub default_button_brightness: i32,

    /// Button backlight can be controlled
    #[serde(default)]
    pub button_backlight_supported: bool,

    /// Keyboard backlight can be controlled
    #[serde(default)]
    pub keyboard_backlight_supported: bool,
}

fn default_true() -> bool { true }
fn default_button_brightness() -> i32 { DEFAULT_BUTTON_BRIGHTNESS }

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            device_keys: KeyMask::EMPTY,
            wake_keys: KeyMask::EMPTY,
            has_power_key: true,
            nav_bar_by_default: false,
            hw_keys_pref_configurable: false,
            voice_capable: true,
            has_volume_rocker: true,
            is_tablet: false,
            default_home_long_press: 0,
            default_home_double_tap: 0,
            default_button_brightness: DEFAULT_BUTTON_BRIGHTNESS,
            button_backlight_supported: false,
            keyboard_backlight_supported: false,
        }
    }
}

impl DeviceCapabilities {
    pub fn has_key(&self, key: HwKey) -> bool {
        self.device_keys.contains(key)
    }

    pub fn wakes(&self, key: HwKey) -> bool {
        self.wake_keys.contains(key)
    }

    /// Device default home long-press action, clamped to a valid code
    pub fn home_long_press_default(&self) -> ActionCode {
        ActionCode::clamped(self.default_home_long_press)
    }

    /// Device default home double-tap action, clamped to a valid code
    pub fn home_double_tap_default(&self) -> ActionCode {
        ActionCode::clamped(self.default_home_double_tap)
    }

    /// Replace key presence with what was found on the input devices
    ///
    /// Wake keys and every other flag stay as configured.
    pub fn with_probed(mut self, probed: &ProbedKeys) -> Self {
        self.device_keys = probed.device_keys;
        self.has_power_key = probed.has_power_key;
        self.has_volume_rocker = probed.device_keys.contains(HwKey::Volume);
        self
    }
}

// ============================================================================
// Input device probing
// ============================================================================

/// Keys found on the input devices of this machine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbedKeys {
    pub has_power_key: bool,
    pub device_keys: KeyMask,
    /// Devices that contributed at least one key
    pub devices: Vec<InputDeviceInfo>,
}

/// An input device reporting one of the relevant keys
#[derive(Debug, Clone, PartialEq)]
pub struct InputDeviceInfo {
    /// Path to the event device (e.g., /dev/input/event2)
    pub path: PathBuf,
    /// Device name as reported by the kernel
    pub name: String,
    /// Hardware keys this device provides
    pub keys: KeyMask,
    pub has_power_key: bool,
}

/// Map raw key codes to the power-key flag and a hardware key mask
pub fn keys_from_codes<I: IntoIterator<Item = u16>>(codes: I) -> (bool, KeyMask) {
    let mut power = false;
    let mut mask = KeyMask::EMPTY;

    for code in codes {
        match code {
            scancode::KEY_POWER => power = true,
            scancode::KEY_HOMEPAGE => mask = mask.with(HwKey::Home),
            scancode::KEY_BACK => mask = mask.with(HwKey::Back),
            scancode::KEY_MENU => mask = mask.with(HwKey::Menu),
            scancode::KEY_SEARCH => mask = mask.with(HwKey::Assist),
            scancode::KEY_APPSELECT => mask = mask.with(HwKey::AppSwitch),
            scancode::KEY_CAMERA => mask = mask.with(HwKey::Camera),
            scancode::KEY_VOLUMEUP | scancode::KEY_VOLUMEDOWN => mask = mask.with(HwKey::Volume),
            _ => {}
        }
    }

    (power, mask)
}

/// Scan /dev/input/ and merge the relevant keys of every event device
pub fn probe_input_keys() -> Result<ProbedKeys, ProbeError> {
    #[cfg(not(target_os = "linux"))]
    {
        tracing::warn!("evdev key probing is only available on Linux");
        Err(ProbeError::NoInputDevices)
    }

    #[cfg(target_os = "linux")]
    {
        scan_linux_devices()
    }
}

#[cfg(target_os = "linux")]
fn scan_linux_devices() -> Result<ProbedKeys, ProbeError> {
    use std::fs;

    let input_dir = PathBuf::from("/dev/input");
    if !input_dir.exists() {
        return Err(ProbeError::NoInputDevices);
    }

    let mut probed = ProbedKeys::default();
    let mut opened = 0usize;
    let mut denied = 0usize;

    for entry in fs::read_dir(&input_dir).map_err(ProbeError::IoError)?.flatten() {
        let path = entry.path();
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !filename.starts_with("event") {
            continue;
        }

        match check_device(&path) {
            Ok(Some(info)) => {
                opened += 1;
                tracing::debug!(
                    path = %path.display(),
                    name = %info.name,
                    keys = format!("0x{:02X}", info.keys.0),
                    power = info.has_power_key,
                    "Input device provides hardware keys"
                );
                probed.has_power_key |= info.has_power_key;
                probed.device_keys = KeyMask(probed.device_keys.0 | info.keys.0);
                probed.devices.push(info);
            }
            Ok(None) => opened += 1,
            Err(ProbeError::PermissionDenied) => denied += 1,
            Err(e) => {
                tracing::debug!("Could not check device {:?}: {}", path, e);
            }
        }
    }

    if opened == 0 && denied > 0 {
        return Err(ProbeError::PermissionDenied);
    }

    tracing::info!(
        keys = format!("0x{:02X}", probed.device_keys.0),
        power = probed.has_power_key,
        devices = probed.devices.len(),
        "Probed hardware keys"
    );

    Ok(probed)
}

#[cfg(target_os = "linux")]
fn check_device(path: &PathBuf) -> Result<Option<InputDeviceInfo>, ProbeError> {
    use evdev::Device;

    let device = Device::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ProbeError::PermissionDenied
        } else {
            ProbeError::IoError(e)
        }
    })?;

    let (has_power_key, keys) = match device.supported_keys() {
        Some(supported) => keys_from_codes(supported.iter().map(|k| k.code())),
        None => return Ok(None),
    };

    if !has_power_key && keys == KeyMask::EMPTY {
        return Ok(None);
    }

    Ok(Some(InputDeviceInfo {
        path: path.clone(),
        name: device.name().unwrap_or("Unknown").to_string(),
        keys,
        has_power_key,
    }))
}

/// Key probing error type
#[derive(Debug)]
pub enum ProbeError {
    /// No input devices to inspect
    NoInputDevices,
    /// Permission denied on every input device
    PermissionDenied,
    /// I/O error
    IoError(std::io::Error),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::NoInputDevices => write!(f, "No input devices found"),
            ProbeError::PermissionDenied => write!(
                f,
                "Permission denied. Ensure the user is in the 'input' group."
            ),
            ProbeError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ProbeError {}
