//! Hardware capability service
//!
//! Device-specific toggles behind a small trait. The sysfs implementation
//! maps each feature to a control node (the key disabler writes `1` to
//! ignore the physical keys). A feature is supported when its node exists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Hardware features the button settings care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    /// Ignore the physical navigation keys
    KeyDisable,
    /// Button backlight brightness control
    ButtonBacklight,
    /// Keyboard backlight brightness control
    KeyboardBacklight,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::KeyDisable => "key_disable",
            Feature::ButtonBacklight => "button_backlight",
            Feature::KeyboardBacklight => "keyboard_backlight",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device feature toggles
pub trait HardwareService {
    fn is_supported(&self, feature: Feature) -> bool;

    fn set(&mut self, feature: Feature, enabled: bool) -> Result<(), HardwareError>;
}

// ============================================================================
// Sysfs implementation
// ============================================================================

/// Sysfs node paths per feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Key disabler node; `1` ignores the physical keys
    #[serde(default)]
    pub key_disable_path: Option<PathBuf>,

    #[serde(default)]
    pub button_backlight_path: Option<PathBuf>,

    #[serde(default)]
    pub keyboard_backlight_path: Option<PathBuf>,
}

/// Hardware service backed by sysfs control nodes
#[derive(Debug, Clone)]
pub struct SysfsHardware {
    config: HardwareConfig,
}

impl SysfsHardware {
    pub fn new(config: HardwareConfig) -> Self {
        Self { config }
    }

    fn node(&self, feature: Feature) -> Option<&PathBuf> {
        match feature {
            Feature::KeyDisable => self.config.key_disable_path.as_ref(),
            Feature::ButtonBacklight => self.config.button_backlight_path.as_ref(),
            Feature::KeyboardBacklight => self.config.keyboard_backlight_path.as_ref(),
        }
    }
}

impl HardwareService for SysfsHardware {
    fn is_supported(&self, feature: Feature) -> bool {
        self.node(feature).map(|p| p.exists()).unwrap_or(false)
    }

    fn set(&mut self, feature: Feature, enabled: bool) -> Result<(), HardwareError> {
        let path = self
            .node(feature)
            .filter(|p| p.exists())
            .ok_or(HardwareError::Unsupported(feature))?;

        let value = if enabled { "1" } else { "0" };
        fs::write(path, value).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                HardwareError::PermissionDenied(path.clone())
            } else {
                HardwareError::IoError(e)
            }
        })?;

        tracing::debug!(feature = %feature, enabled, path = %path.display(), "Hardware feature set");
        Ok(())
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Feature table kept in memory, for setups without control nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryHardware {
    supported: Vec<Feature>,
    state: BTreeMap<Feature, bool>,
}

impl MemoryHardware {
    pub fn with_features(supported: &[Feature]) -> Self {
        Self {
            supported: supported.to_vec(),
            state: BTreeMap::new(),
        }
    }

    /// Last value set for `feature`
    pub fn state(&self, feature: Feature) -> Option<bool> {
        self.state.get(&feature).copied()
    }
}

impl HardwareService for MemoryHardware {
    fn is_supported(&self, feature: Feature) -> bool {
        self.supported.contains(&feature)
    }

    fn set(&mut self, feature: Feature, enabled: bool) -> Result<(), HardwareError> {
        if !self.is_supported(feature) {
            return Err(HardwareError::Unsupported(feature));
        }
        self.state.insert(feature, enabled);
        Ok(())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Hardware service error type
#[derive(Debug)]
pub enum HardwareError {
    /// Feature has no control on this device
    Unsupported(Feature),
    /// Permission denied writing the control node
    PermissionDenied(PathBuf),
    /// I/O error
    IoError(std::io::Error),
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::Unsupported(feature) => write!(f, "Feature not supported: {}", feature),
            HardwareError::PermissionDenied(path) => {
                write!(f, "Permission denied writing {}", path.display())
            }
            HardwareError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for HardwareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HardwareError::IoError(e) => Some(e),
            _ => None,
        }
    }
}
