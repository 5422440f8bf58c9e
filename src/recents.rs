//! Recents long-press target list
//!
//! Long-pressing recents either switches to the last app (the default) or
//! launches an activity registered for [`RECENTS_LONG_PRESS_ACTION`]. The
//! choice is stored as a flattened component name.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actions::ActionCode;
use crate::controls::{ListControl, ListEntry};
use crate::keys::setting;
use crate::store::SettingsStore;

/// Intent action activities register for to appear in the list
pub const RECENTS_LONG_PRESS_ACTION: &str = "android.intent.action.RECENTS_LONG_PRESS";

/// Package + activity class identifying a launch target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentName {
    pub package: String,
    pub class: String,
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        let package = package.into();
        let class = class.into();
        // ".Foo" is shorthand for a class inside the package
        let class = if class.starts_with('.') {
            format!("{}{}", package, class)
        } else {
            class
        };
        Self { package, class }
    }

    /// `package/class`
    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package, self.class)
    }

    /// Parse `package/class` or `package/.Class`
    pub fn unflatten(s: &str) -> Option<Self> {
        let (package, class) = s.split_once('/')?;
        if package.is_empty() || class.is_empty() {
            return None;
        }
        Some(Self::new(package, class))
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

/// Activity found for an intent action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedActivity {
    pub package: String,
    pub activity: String,
}

/// Package manager view used to build the list
pub trait ActivityResolver {
    /// Activities registered for `action`, in resolution order
    fn query_activities(&self, action: &str) -> Vec<ResolvedActivity>;

    /// Display label of an installed application
    fn application_label(&self, package: &str) -> Result<String, ResolveError>;
}

/// Application metadata lookup failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    PackageNotFound(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::PackageNotFound(p) => write!(f, "Package not found: {}", p),
        }
    }
}

impl std::error::Error for ResolveError {}

// ============================================================================
// Configured resolver
// ============================================================================

/// Activity entry from the daemon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredActivity {
    pub package: String,
    pub activity: String,

    /// Application label; lookups fail without one
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default = "default_action")]
    pub action: String,
}

fn default_action() -> String {
    RECENTS_LONG_PRESS_ACTION.to_string()
}

/// Resolver answering from a fixed list of activities
#[derive(Debug, Clone, Default)]
pub struct ConfiguredActivities {
    activities: Vec<ConfiguredActivity>,
}

impl ConfiguredActivities {
    pub fn new(activities: Vec<ConfiguredActivity>) -> Self {
        Self { activities }
    }
}

impl ActivityResolver for ConfiguredActivities {
    fn query_activities(&self, action: &str) -> Vec<ResolvedActivity> {
        self.activities
            .iter()
            .filter(|a| a.action == action)
            .map(|a| ResolvedActivity {
                package: a.package.clone(),
                activity: a.activity.clone(),
            })
            .collect()
    }

    fn application_label(&self, package: &str) -> Result<String, ResolveError> {
        self.activities
            .iter()
            .find(|a| a.package == package)
            .and_then(|a| a.label.clone())
            .ok_or_else(|| ResolveError::PackageNotFound(package.to_string()))
    }
}

// ============================================================================
// List construction
// ============================================================================

/// Build the recents long-press list from the resolver and the stored target
///
/// Entry 0 is always the last-app default (value `""`). With no activities
/// the list is disabled and the stored target cleared.
pub fn build_recents_choices(
    resolver: &dyn ActivityResolver,
    store: &mut dyn SettingsStore,
) -> ListControl {
    let default_label = ActionCode::LastApp.label();
    let mut list = ListControl::new(vec![ListEntry::new(default_label, "")]);
    list.summary = default_label.to_string();

    let target = store
        .get_string(setting::RECENTS_LONG_PRESS_ACTIVITY)
        .and_then(|s| ComponentName::unflatten(&s));

    let activities = resolver.query_activities(RECENTS_LONG_PRESS_ACTION);
    if activities.is_empty() {
        if store.contains(setting::RECENTS_LONG_PRESS_ACTIVITY)
            && !store.remove(setting::RECENTS_LONG_PRESS_ACTIVITY)
        {
            tracing::warn!("Failed to clear recents long press activity");
        }
        list.enabled = false;
        tracing::debug!("No recents long press activities, list disabled");
        return list;
    }

    for info in activities {
        let label = match resolver.application_label(&info.package) {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!(package = %info.package, error = %e, "Falling back to package name");
                info.package.clone()
            }
        };

        let component = ComponentName::new(info.package, info.activity);
        list.entries.push(ListEntry::new(label, component.flatten()));
    }

    match target.and_then(|t| list.find_index_of_value(&t.flatten())) {
        Some(index) => {
            list.value = list.entries[index].value.clone();
            list.summary = list.entries[index].label.clone();
        }
        None => list.value.clear(),
    }

    list
}
