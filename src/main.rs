//! Button Settings Daemon
//!
//! Serves the hardware button preferences of this device over D-Bus and
//! keeps them in sync with the settings store.

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{info, warn, error, Level};
use tracing_subscriber::FmtSubscriber;

use buttonsettingsd::{
    capabilities::probe_input_keys,
    config::{into_shared_config, Config},
    dbus::{
        emit_preferences_changed, init_dbus_service, new_shared_screen, SharedScreen, WatchTarget, DBUS_NAME,
        DBUS_PATH,
    },
    hardware::SysfsHardware,
    resolver::non_indexable_keys,
    screen::{effective_capabilities, ButtonSettings},
    watcher::{SettingsEvent, SettingsWatcher},
};

/// Quiet period before re-reading after a settings file event
const SETTINGS_DEBOUNCE_MS: u64 = 100;

/// Button Settings Daemon - hardware key, navigation bar and backlight preferences
#[derive(Parser, Debug)]
#[command(name = "buttonsettingsd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/buttonsettings/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// List input devices with hardware keys and exit
    #[arg(long)]
    list_keys: bool,

    /// Re-apply the stored hardware-keys state and exit
    #[arg(long)]
    restore: bool,

    /// Print the ids hidden from search on this device and exit
    #[arg(long)]
    print_removals: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Button Settings Daemon starting...");

    if args.list_keys {
        list_input_keys();
        return Ok(());
    }

    let config = load_config(args.config.as_ref());

    if args.print_removals {
        let hardware = SysfsHardware::new(config.hardware.clone());
        for id in non_indexable_keys(&effective_capabilities(&config, &hardware)) {
            println!("{}", id);
        }
        return Ok(());
    }

    let mut screen = match ButtonSettings::from_config(&config) {
        Ok(screen) => screen,
        Err(e) => {
            error!("Failed to open settings stores: {}", e);
            return Err(e.into());
        }
    };

    // Boot restore of the key disabler
    if screen.restore_key_disabler() {
        info!(enabled = screen.hw_keys_enabled(), "Key disabler state restored");
    }
    if args.restore {
        return Ok(());
    }

    let settings_file = config.watched_settings_file();
    let shared_config = into_shared_config(config);
    let shared_screen = new_shared_screen(screen);
    let (target_tx, target_rx) = mpsc::channel::<WatchTarget>(4);

    let dbus_connection = match init_dbus_service(shared_screen.clone(), shared_config, target_tx).await {
        Ok(conn) => {
            info!(name = DBUS_NAME, path = DBUS_PATH, "D-Bus service initialized successfully");
            conn
        }
        Err(e) => {
            error!("Failed to initialize D-Bus service: {}", e);
            return Err(e.into());
        }
    };

    let event_handle = tokio::spawn(async move {
        process_settings_events(settings_file, target_rx, &shared_screen, &dbus_connection).await
    });

    info!("Button Settings Daemon ready");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, exiting...");
        }
        result = event_handle => {
            if let Err(e) = result {
                error!("Settings event task panicked: {:?}", e);
            }
        }
    }

    Ok(())
}

/// Load the configuration, falling back to defaults on error
fn load_config(path: Option<&PathBuf>) -> Config {
    let result = match path {
        Some(p) => Config::load(p),
        None => Config::load_default(),
    };

    match result {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            warn!("Failed to load config, using defaults: {}", e);
            let mut config = Config::default();
            config.config_path = path.cloned();
            config
        }
    }
}

/// List input devices reporting hardware keys
fn list_input_keys() {
    println!("Scanning for input devices with hardware keys...\n");

    let probed = match probe_input_keys() {
        Ok(probed) => probed,
        Err(e) => {
            println!("No usable input devices: {}", e);
            println!("\nTroubleshooting:");
            println!("  - Check that /dev/input/event* exists");
            println!("  - Verify user is in 'input' group");
            return;
        }
    };

    println!("Found {} device(s):\n", probed.devices.len());

    for (i, device) in probed.devices.iter().enumerate() {
        let power = if device.has_power_key { " [power]" } else { "" };
        let keys: Vec<&str> = device.keys.keys().iter().map(|k| k.name()).collect();
        println!("{}. {}{}", i + 1, device.name, power);
        println!("   Path: {:?}", device.path);
        println!("   Keys: {}", keys.join(", "));
        println!();
    }

    println!("Key mask: 0x{:02X}", probed.device_keys.0);
}

// ============================================================================
// Settings file watching
// ============================================================================

/// Watcher for the current settings file, rebuilt when the file moves
struct SettingsWatch {
    tx: mpsc::Sender<SettingsEvent>,
    watcher: Option<SettingsWatcher>,
}

impl SettingsWatch {
    fn new(target: Option<&Path>, tx: mpsc::Sender<SettingsEvent>) -> Self {
        let mut watch = Self { tx, watcher: None };
        watch.retarget(target);
        watch
    }

    /// Stop watching the old file and start on `target`
    fn retarget(&mut self, target: Option<&Path>) {
        self.watcher = None;
        let Some(path) = target else {
            info!("Settings file watching disabled");
            return;
        };

        match SettingsWatcher::start(path, self.tx.clone()) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => warn!("Settings watcher unavailable, external writes need Resume: {}", e),
        }
    }

    fn path(&self) -> Option<&Path> {
        self.watcher.as_ref().map(SettingsWatcher::path)
    }
}

/// Re-read the stores on settings file events and notify clients
///
/// Watch targets from `ReloadConfig` rebuild the watcher. The loop ends
/// when the D-Bus service drops its sender.
async fn process_settings_events(
    initial: WatchTarget,
    mut target_rx: mpsc::Receiver<WatchTarget>,
    screen: &SharedScreen,
    connection: &zbus::Connection,
) {
    let (event_tx, mut event_rx) = mpsc::channel::<SettingsEvent>(4);
    let mut watch = SettingsWatch::new(initial.as_deref(), event_tx);

    loop {
        tokio::select! {
            target = target_rx.recv() => {
                let Some(target) = target else {
                    break;
                };
                watch.retarget(target.as_deref());
                // The reload already rebuilt the screen
                drain_pending(&mut event_rx);
            }
            Some(event) = event_rx.recv() => {
                sleep(Duration::from_millis(SETTINGS_DEBOUNCE_MS)).await;
                let coalesced = drain_pending(&mut event_rx);

                match &event {
                    SettingsEvent::Changed(path) => {
                        tracing::debug!(path = %path.display(), coalesced, "Settings file changed")
                    }
                    SettingsEvent::Removed(path) => {
                        warn!(path = %path.display(), "Settings file removed, defaults apply")
                    }
                }

                if !refresh_screen(screen) {
                    continue;
                }

                if let Err(e) = emit_preferences_changed(connection).await {
                    warn!("Failed to emit PreferencesChanged: {}", e);
                }
            }
        }
    }

    tracing::debug!(watching = ?watch.path(), "Settings event loop stopped");
}

/// Drop queued events; one refresh covers them all
fn drain_pending(event_rx: &mut mpsc::Receiver<SettingsEvent>) -> usize {
    let mut count = 0;
    while event_rx.try_recv().is_ok() {
        count += 1;
    }
    count
}

fn refresh_screen(screen: &SharedScreen) -> bool {
    match screen.lock() {
        Ok(mut screen) => {
            screen.resume();
            true
        }
        Err(e) => {
            error!("Failed to lock screen state: {}", e);
            false
        }
    }
}
