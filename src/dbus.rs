//! D-Bus IPC server for the button settings daemon
//!
//! Implements the org.buttonsettings.Daemon interface used by the settings
//! UI to read the screen state and push user changes.
//!
//! ## Interface: org.buttonsettings.Daemon
//!
//! ### Methods:
//! - `GetRemovals()` - Ids of removed categories and preferences
//! - `GetPreferences()` - JSON array of preference descriptors
//! - `SetSwitch(key: String, value: bool)` - Apply a switch change
//! - `SetChoice(key: String, value: String)` - Apply a list selection
//! - `SetHwKeysEnabled(enabled: bool)` - Toggle the physical keys
//! - `Resume()` - Re-read the stores
//! - `ReloadConfig()` - Reload config.json and rebuild the screen
//!
//! A reload that moves the settings file sends the new watch target to the
//! daemon loop, which rebuilds the watcher.
//!
//! ### Signals:
//! - `PreferencesChanged()` - Emitted after any change to the screen state

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use zbus::{fdo, interface, object_server::SignalEmitter};

use crate::config::{Config, SharedConfig};
use crate::controls::PreferenceValue;
use crate::keys::PreferenceKey;
use crate::resolver::non_indexable_keys;
use crate::screen::{ButtonSettings, ScreenError};

/// D-Bus interface name
pub const DBUS_INTERFACE: &str = "org.buttonsettings.Daemon";

/// D-Bus object path
pub const DBUS_PATH: &str = "/org/buttonsettings/Daemon";

/// D-Bus bus name
pub const DBUS_NAME: &str = "org.buttonsettings";

/// Screen state shared between the D-Bus service and the watcher loop
pub type SharedScreen = Arc<Mutex<ButtonSettings>>;

pub fn new_shared_screen(screen: ButtonSettings) -> SharedScreen {
    Arc::new(Mutex::new(screen))
}

/// Settings file the watcher should follow; `None` stops watching
pub type WatchTarget = Option<PathBuf>;

/// Button settings D-Bus service
pub struct ButtonSettingsService {
    /// Daemon version
    version: String,
    screen: SharedScreen,
    /// Shared configuration for reload
    config: SharedConfig,
    /// Receives the new watch target when a reload moves the settings file
    watch_tx: Option<mpsc::Sender<WatchTarget>>,
}

impl ButtonSettingsService {
    pub fn new(screen: SharedScreen, config: SharedConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            screen,
            config,
            watch_tx: None,
        }
    }

    /// Report watch target changes on `tx`
    pub fn with_watch_targets(mut self, tx: mpsc::Sender<WatchTarget>) -> Self {
        self.watch_tx = Some(tx);
        self
    }

    fn with_screen<T>(&self, f: impl FnOnce(&mut ButtonSettings) -> T) -> fdo::Result<T> {
        match self.screen.lock() {
            Ok(mut screen) => Ok(f(&mut screen)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock screen state");
                Err(fdo::Error::Failed(format!("Lock error: {}", e)))
            }
        }
    }

    fn removals(&self) -> fdo::Result<Vec<String>> {
        self.with_screen(|s| non_indexable_keys(s.capabilities()))
    }

    fn preferences_json(&self) -> fdo::Result<String> {
        let descriptors = self.with_screen(|s| s.descriptors())?;
        serde_json::to_string(&descriptors)
            .map_err(|e| fdo::Error::Failed(format!("Serialization failed: {}", e)))
    }

    fn apply(&self, key: &str, value: PreferenceValue) -> fdo::Result<()> {
        let key = PreferenceKey::from_id(key)
            .ok_or_else(|| fdo::Error::InvalidArgs(format!("Unknown preference: {}", key)))?;

        self.with_screen(|s| s.apply(key, value))?
            .map_err(|e| {
                tracing::warn!(key = %key, error = %e, "Preference change rejected");
                screen_error(e)
            })
    }

    fn resume_screen(&self) -> fdo::Result<()> {
        self.with_screen(|s| s.resume())
    }

    fn reload(&self) -> fdo::Result<()> {
        let path = self
            .config
            .read()
            .map_err(|e| fdo::Error::Failed(format!("Lock error: {}", e)))?
            .config_path
            .clone();

        let new_config = match path {
            Some(p) => Config::load(p),
            None => Config::load_default(),
        }
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to reload configuration");
            fdo::Error::Failed(format!("Config reload failed: {}", e))
        })?;

        let screen = ButtonSettings::from_config(&new_config).map_err(|e| {
            tracing::error!(error = %e, "Failed to open settings stores");
            fdo::Error::Failed(format!("Store open failed: {}", e))
        })?;

        let new_target = new_config.watched_settings_file();
        self.with_screen(|s| *s = screen)?;
        let old_target = match self.config.write() {
            Ok(mut config) => std::mem::replace(&mut *config, new_config).watched_settings_file(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire config write lock");
                return Err(fdo::Error::Failed(format!("Lock error: {}", e)));
            }
        };

        if new_target != old_target {
            self.retarget_watcher(new_target);
        }

        tracing::info!("Configuration reloaded successfully");
        Ok(())
    }

    fn retarget_watcher(&self, target: WatchTarget) {
        let Some(tx) = &self.watch_tx else {
            return;
        };
        match &target {
            Some(path) => tracing::info!(path = %path.display(), "Settings watch target changed"),
            None => tracing::info!("Settings watching turned off"),
        }
        if let Err(e) = tx.try_send(target) {
            tracing::warn!(error = %e, "Failed to retarget settings watcher");
        }
    }
}

fn screen_error(e: ScreenError) -> fdo::Error {
    match e {
        ScreenError::UnknownChoice { .. } | ScreenError::TypeMismatch(_) => {
            fdo::Error::InvalidArgs(e.to_string())
        }
        _ => fdo::Error::Failed(e.to_string()),
    }
}

#[interface(name = "org.buttonsettings.Daemon")]
impl ButtonSettingsService {
    // =========================================================================
    // METHODS
    // =========================================================================

    /// Ids of categories and preferences removed on this device
    ///
    /// Search indexing excludes exactly these ids.
    async fn get_removals(&self) -> fdo::Result<Vec<String>> {
        self.removals()
    }

    /// Every preference as a JSON array of descriptors
    async fn get_preferences(&self) -> fdo::Result<String> {
        self.preferences_json()
    }

    /// Apply a switch change
    async fn set_switch(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
        key: &str,
        value: bool,
    ) -> fdo::Result<()> {
        tracing::info!(key, value, "SetSwitch called");
        self.apply(key, PreferenceValue::Bool(value))?;
        if key == PreferenceKey::EnableHwKeys.id() {
            self.hw_keys_enabled_changed(&emitter).await?;
        }
        Self::preferences_changed(&emitter).await?;
        Ok(())
    }

    /// Apply a list selection
    async fn set_choice(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
        key: &str,
        value: String,
    ) -> fdo::Result<()> {
        tracing::info!(key, value = %value, "SetChoice called");
        self.apply(key, PreferenceValue::Choice(value))?;
        Self::preferences_changed(&emitter).await?;
        Ok(())
    }

    /// Enable or disable the physical navigation keys
    async fn set_hw_keys_enabled(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
        enabled: bool,
    ) -> fdo::Result<()> {
        tracing::info!(enabled, "SetHwKeysEnabled called");
        self.apply(PreferenceKey::EnableHwKeys.id(), PreferenceValue::Bool(enabled))?;
        self.hw_keys_enabled_changed(&emitter).await?;
        Self::preferences_changed(&emitter).await?;
        Ok(())
    }

    /// Re-read the stores and refresh every control
    async fn resume(&self, #[zbus(signal_emitter)] emitter: SignalEmitter<'_>) -> fdo::Result<()> {
        tracing::info!("Resume called");
        self.resume_screen()?;
        Self::preferences_changed(&emitter).await?;
        Ok(())
    }

    /// Reload configuration from disk
    ///
    /// Reloads config.json and rebuilds the screen for the new device description.
    async fn reload_config(
        &self,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
    ) -> fdo::Result<()> {
        tracing::info!("ReloadConfig called - reloading configuration from disk");
        self.reload()?;
        Self::preferences_changed(&emitter).await?;
        Ok(())
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Screen state changed; clients should re-read the preferences
    #[zbus(signal)]
    async fn preferences_changed(emitter: &SignalEmitter<'_>) -> zbus::Result<()>;

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    /// Whether the physical keys are enabled
    #[zbus(property)]
    async fn hw_keys_enabled(&self) -> bool {
        self.screen
            .lock()
            .map(|s| s.hw_keys_enabled())
            .unwrap_or(true)
    }

    /// Get daemon version
    #[zbus(property)]
    async fn daemon_version(&self) -> &str {
        &self.version
    }
}

/// Initialize and run the D-Bus service
///
/// Connects to the session bus, registers the service name, and exports
/// the interface at the specified object path.
///
/// Reloads that move the watched settings file send the new target on
/// `watch_tx`.
///
/// # Returns
/// A `zbus::Connection` that should be kept alive for the service to run.
pub async fn init_dbus_service(
    screen: SharedScreen,
    config: SharedConfig,
    watch_tx: mpsc::Sender<WatchTarget>,
) -> zbus::Result<zbus::Connection> {
    let service = ButtonSettingsService::new(screen, config).with_watch_targets(watch_tx);

    let connection = zbus::connection::Builder::session()?
        .name(DBUS_NAME)?
        .serve_at(DBUS_PATH, service)?
        .build()
        .await?;

    tracing::info!(
        name = DBUS_NAME,
        path = DBUS_PATH,
        "D-Bus service registered"
    );

    Ok(connection)
}

/// Emit `PreferencesChanged` for changes made outside a method call
pub async fn emit_preferences_changed(connection: &zbus::Connection) -> zbus::Result<()> {
    let iface = connection
        .object_server()
        .interface::<_, ButtonSettingsService>(DBUS_PATH)
        .await?;
    ButtonSettingsService::preferences_changed(iface.signal_emitter()).await
}
