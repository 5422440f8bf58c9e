//! Button Settings Daemon Library
//!
//! Public API for testing and integration.

pub mod actions;
pub mod capabilities;
pub mod config;
pub mod controls;
pub mod dbus;
pub mod hardware;
pub mod hwkeys;
pub mod keys;
pub mod recents;
pub mod resolver;
pub mod screen;
pub mod store;
pub mod watcher;

/// Re-export commonly used types
pub use actions::{ActionCode, CursorControl};
pub use capabilities::{probe_input_keys, DeviceCapabilities, InputDeviceInfo, ProbeError, ProbedKeys};
pub use config::{Config, ConfigError, SharedConfig, new_shared_config, into_shared_config};
pub use controls::{BacklightControl, ListControl, ListEntry, PreferenceValue, SwitchControl};
pub use dbus::{init_dbus_service, ButtonSettingsService, SharedScreen, WatchTarget, DBUS_INTERFACE, DBUS_NAME, DBUS_PATH};
pub use hardware::{Feature, HardwareConfig, HardwareError, HardwareService, MemoryHardware, SysfsHardware};
pub use hwkeys::{restore_key_disabler, write_disable_hw_keys_option};
pub use keys::{Category, HwKey, KeyMask, PreferenceKey};
pub use recents::{build_recents_choices, ActivityResolver, ComponentName, ConfiguredActivities};
pub use resolver::{compute_removals, non_indexable_keys, Removal, RemovalSet};
pub use screen::{ButtonSettings, PreferenceDescriptor, ScreenError, Services};
pub use store::{JsonFileStore, MemoryStore, SettingsStore, StoreError};
pub use watcher::{SettingsEvent, SettingsWatcher, WatchError};
