//! Configuration management for the button settings daemon
//!
//! Handles loading, validation and reload of the JSON configuration file.
//! Configuration is stored at `~/.config/buttonsettings/config.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::capabilities::DeviceCapabilities;
use crate::hardware::HardwareConfig;
use crate::recents::ConfiguredActivity;

// ============================================================================
// Constants
// ============================================================================

/// Default config directory name
const CONFIG_DIR: &str = "buttonsettings";

/// Default config file name
const CONFIG_FILE: &str = "config.json";

/// Default settings store file name
const SETTINGS_FILE: &str = "settings.json";

/// Default private prefs file name
const PREFS_FILE: &str = "prefs.json";

/// Highest brightness the backlight accepts
const MAX_BUTTON_BRIGHTNESS: i32 = 255;

// ============================================================================
// Main Configuration
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Device capability descriptor
    #[serde(default)]
    pub device: DeviceCapabilities,

    /// Settings store file (default: `settings.json` next to the config)
    #[serde(default)]
    pub settings_path: Option<PathBuf>,

    /// Private prefs file (default: `prefs.json` next to the config)
    #[serde(default)]
    pub prefs_path: Option<PathBuf>,

    /// Sysfs control nodes
    #[serde(default)]
    pub hardware: HardwareConfig,

    /// Activities offered for the recents long-press action
    #[serde(default)]
    pub recents_activities: Vec<ConfiguredActivity>,

    /// Replace configured key presence with keys found on /dev/input
    #[serde(default)]
    pub probe_input_devices: bool,

    /// Watch the settings file and refresh on external writes
    #[serde(default = "default_true")]
    pub watch_settings: bool,

    /// Configuration file path (not serialized)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_true() -> bool { true }

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceCapabilities::default(),
            settings_path: None,
            prefs_path: None,
            hardware: HardwareConfig::default(),
            recents_activities: Vec::new(),
            probe_input_devices: false,
            watch_settings: true,
            config_path: None,
        }
    }
}

impl Config {
    /// Get the default config directory path
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(CONFIG_DIR))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Load configuration from the default location
    ///
    /// Returns default config if file doesn't exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_config_path() {
            Some(path) => Self::load(&path),
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from file path
    ///
    /// Returns default config if file doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            let mut config = Self::default();
            config.config_path = Some(path.to_path_buf());
            return Ok(config);
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::IoError)?;
        let mut config: Config =
            serde_json::from_str(&contents).map_err(ConfigError::ParseError)?;

        config.validate()?;
        config.config_path = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            device_keys = config.device.device_keys.0,
            wake_keys = config.device.wake_keys.0,
            recents_activities = config.recents_activities.len(),
            probe = config.probe_input_devices,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Clamp out-of-range values and reject unusable entries
    ///
    /// Key and wake masks are kept as configured.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.device.default_button_brightness =
            self.device.default_button_brightness.clamp(0, MAX_BUTTON_BRIGHTNESS);

        if let Some(bad) = self
            .recents_activities
            .iter()
            .find(|a| a.package.is_empty() || a.activity.is_empty())
        {
            return Err(ConfigError::ValidationError(format!(
                "Recents activity needs package and activity: {:?}",
                bad
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = match &self.config_path {
            Some(p) => p.clone(),
            None => Self::default_config_path()
                .ok_or_else(|| ConfigError::ValidationError("No config path".to_string()))?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::IoError)?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::ParseError)?;
        fs::write(&path, contents).map_err(ConfigError::IoError)?;

        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Directory relative store paths resolve against
    fn base_dir(&self) -> Option<PathBuf> {
        self.config_path
            .as_ref()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .or_else(Self::default_config_dir)
    }

    fn resolve(&self, configured: &Option<PathBuf>, file: &str) -> Option<PathBuf> {
        match configured {
            Some(p) if p.is_absolute() => Some(p.clone()),
            Some(p) => self.base_dir().map(|dir| dir.join(p)),
            None => self.base_dir().map(|dir| dir.join(file)),
        }
    }

    /// Settings store file
    pub fn settings_file(&self) -> Option<PathBuf> {
        self.resolve(&self.settings_path, SETTINGS_FILE)
    }

    /// Private prefs file
    pub fn prefs_file(&self) -> Option<PathBuf> {
        self.resolve(&self.prefs_path, PREFS_FILE)
    }

    /// Settings file the daemon watches, `None` when watching is off
    pub fn watched_settings_file(&self) -> Option<PathBuf> {
        self.settings_file().filter(|_| self.watch_settings)
    }
}

// ============================================================================
// Shared Config (for reload)
// ============================================================================

use std::sync::{Arc, RwLock};

/// Thread-safe shared configuration for reload support
pub type SharedConfig = Arc<RwLock<Config>>;

/// Create a new shared config with defaults
pub fn new_shared_config() -> SharedConfig {
    Arc::new(RwLock::new(Config::default()))
}

/// Wrap a loaded config for sharing with the D-Bus service
pub fn into_shared_config(config: Config) -> SharedConfig {
    Arc::new(RwLock::new(config))
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration error type
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading/writing file
    IoError(std::io::Error),
    /// JSON parsing error
    ParseError(serde_json::Error),
    /// Validation error
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::ParseError(e) => Some(e),
            ConfigError::ValidationError(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
