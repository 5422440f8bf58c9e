//! Preference removal resolver
//!
//! Which parts of the screen exist on a device is a pure function of its
//! capabilities. The rules live in [`REMOVAL_RULES`] as data: a predicate
//! over [`DeviceCapabilities`] and the items removed when it holds. Rules are
//! independent of each other and of evaluation order.

use std::collections::BTreeSet;

use crate::actions::ActionCode;
use crate::capabilities::DeviceCapabilities;
use crate::keys::{setting, Category, HwKey, PreferenceKey};

/// Something taken off the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Removal {
    /// A whole category with everything in it
    Category(Category),
    /// A single preference, removed from its category
    Preference(PreferenceKey),
}

impl Removal {
    pub fn id(&self) -> &'static str {
        match self {
            Removal::Category(c) => c.id(),
            Removal::Preference(p) => p.id(),
        }
    }

    /// Parent category for a single preference, `None` for a category
    pub fn parent(&self) -> Option<Category> {
        match self {
            Removal::Category(_) => None,
            Removal::Preference(p) => Some(p.category()),
        }
    }
}

/// One row of the removal table
pub struct RemovalRule {
    /// Short rule name, for logging
    pub name: &'static str,
    pub applies: fn(&DeviceCapabilities) -> bool,
    pub removes: &'static [Removal],
}

fn present_not_waking(caps: &DeviceCapabilities, key: HwKey) -> bool {
    caps.has_key(key) && !caps.wakes(key)
}

/// Removal rules of the button settings screen
pub static REMOVAL_RULES: &[RemovalRule] = &[
    RemovalRule {
        name: "no power key",
        applies: |c| !c.has_power_key,
        removes: &[Removal::Category(Category::Power)],
    },
    RemovalRule {
        name: "power key without telephony",
        applies: |c| c.has_power_key && !c.voice_capable,
        removes: &[Removal::Preference(PreferenceKey::PowerEndCall)],
    },
    RemovalRule {
        name: "no home key",
        applies: |c| !c.has_key(HwKey::Home),
        removes: &[Removal::Category(Category::Home)],
    },
    RemovalRule {
        name: "home key does not wake",
        applies: |c| present_not_waking(c, HwKey::Home),
        removes: &[Removal::Preference(PreferenceKey::HomeWakeScreen)],
    },
    RemovalRule {
        name: "home key without telephony",
        applies: |c| c.has_key(HwKey::Home) && !c.voice_capable,
        removes: &[Removal::Preference(PreferenceKey::HomeAnswerCall)],
    },
    RemovalRule {
        name: "no back key",
        applies: |c| !c.has_key(HwKey::Back),
        removes: &[Removal::Category(Category::Back)],
    },
    // The wake toggle is the only back key preference, and the category goes
    // with it. Unlike the other keys; kept as the shipped behavior.
    RemovalRule {
        name: "back key does not wake",
        applies: |c| present_not_waking(c, HwKey::Back),
        removes: &[
            Removal::Preference(PreferenceKey::BackWakeScreen),
            Removal::Category(Category::Back),
        ],
    },
    RemovalRule {
        name: "no menu key",
        applies: |c| !c.has_key(HwKey::Menu),
        removes: &[Removal::Category(Category::Menu)],
    },
    RemovalRule {
        name: "menu key does not wake",
        applies: |c| present_not_waking(c, HwKey::Menu),
        removes: &[Removal::Preference(PreferenceKey::MenuWakeScreen)],
    },
    RemovalRule {
        name: "no assist key",
        applies: |c| !c.has_key(HwKey::Assist),
        removes: &[Removal::Category(Category::Assist)],
    },
    RemovalRule {
        name: "assist key does not wake",
        applies: |c| present_not_waking(c, HwKey::Assist),
        removes: &[Removal::Preference(PreferenceKey::AssistWakeScreen)],
    },
    RemovalRule {
        name: "no app switch key",
        applies: |c| !c.has_key(HwKey::AppSwitch),
        removes: &[Removal::Category(Category::AppSwitch)],
    },
    RemovalRule {
        name: "app switch key does not wake",
        applies: |c| present_not_waking(c, HwKey::AppSwitch),
        removes: &[Removal::Preference(PreferenceKey::AppSwitchWakeScreen)],
    },
    RemovalRule {
        name: "no volume rocker",
        applies: |c| !c.has_volume_rocker,
        removes: &[Removal::Category(Category::Volume)],
    },
    RemovalRule {
        name: "volume rocker does not wake",
        applies: |c| c.has_volume_rocker && !c.wakes(HwKey::Volume),
        removes: &[Removal::Preference(PreferenceKey::VolumeWakeScreen)],
    },
    RemovalRule {
        name: "no controllable backlight",
        applies: |c| !c.button_backlight_supported && !c.keyboard_backlight_supported,
        removes: &[Removal::Preference(PreferenceKey::ButtonBacklight)],
    },
    RemovalRule {
        name: "hardware keys category not configurable",
        applies: |c| !c.hw_keys_pref_configurable,
        removes: &[Removal::Category(Category::HwKeys)],
    },
];

/// Everything removed from the screen for one device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSet {
    items: BTreeSet<Removal>,
}

impl RemovalSet {
    pub fn contains(&self, removal: Removal) -> bool {
        self.items.contains(&removal)
    }

    pub fn is_category_removed(&self, category: Category) -> bool {
        self.contains(Removal::Category(category))
    }

    /// Whether `key` is gone, directly or with its category
    pub fn is_removed(&self, key: PreferenceKey) -> bool {
        self.contains(Removal::Preference(key)) || self.is_category_removed(key.category())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Removal> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// String ids of every removed item
    pub fn ids(&self) -> Vec<&'static str> {
        self.items.iter().map(|r| r.id()).collect()
    }
}

impl FromIterator<Removal> for RemovalSet {
    fn from_iter<T: IntoIterator<Item = Removal>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Evaluate [`REMOVAL_RULES`] against `caps`
pub fn compute_removals(caps: &DeviceCapabilities) -> RemovalSet {
    REMOVAL_RULES
        .iter()
        .filter(|rule| (rule.applies)(caps))
        .inspect(|rule| tracing::debug!(rule = rule.name, "Removal rule applies"))
        .flat_map(|rule| rule.removes.iter().copied())
        .collect()
}

/// Keys the search index must not offer on this device
pub fn non_indexable_keys(caps: &DeviceCapabilities) -> Vec<String> {
    compute_removals(caps)
        .ids()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Action list bindings
// ============================================================================

/// Action preference bound to a settings key
pub struct ActionBinding {
    pub preference: PreferenceKey,
    /// Key that must be present for the preference to exist
    pub requires: HwKey,
    pub setting: &'static str,
    pub default: fn(&DeviceCapabilities) -> ActionCode,
}

/// Action lists of the screen, with their defaults
pub static ACTION_BINDINGS: &[ActionBinding] = &[
    ActionBinding {
        preference: PreferenceKey::HomeLongPress,
        requires: HwKey::Home,
        setting: setting::HOME_LONG_PRESS_ACTION,
        default: |c| c.home_long_press_default(),
    },
    ActionBinding {
        preference: PreferenceKey::HomeDoubleTap,
        requires: HwKey::Home,
        setting: setting::HOME_DOUBLE_TAP_ACTION,
        default: |c| c.home_double_tap_default(),
    },
    ActionBinding {
        preference: PreferenceKey::MenuPress,
        requires: HwKey::Menu,
        setting: setting::MENU_ACTION,
        default: |_| ActionCode::Menu,
    },
    ActionBinding {
        preference: PreferenceKey::MenuLongPress,
        requires: HwKey::Menu,
        setting: setting::MENU_LONG_PRESS_ACTION,
        default: |c| {
            if c.has_key(HwKey::Assist) {
                ActionCode::Nothing
            } else {
                ActionCode::Search
            }
        },
    },
    ActionBinding {
        preference: PreferenceKey::AssistPress,
        requires: HwKey::Assist,
        setting: setting::ASSIST_ACTION,
        default: |_| ActionCode::Search,
    },
    ActionBinding {
        preference: PreferenceKey::AssistLongPress,
        requires: HwKey::Assist,
        setting: setting::ASSIST_LONG_PRESS_ACTION,
        default: |_| ActionCode::VoiceSearch,
    },
    ActionBinding {
        preference: PreferenceKey::AppSwitchPress,
        requires: HwKey::AppSwitch,
        setting: setting::APP_SWITCH_ACTION,
        default: |_| ActionCode::AppSwitch,
    },
    ActionBinding {
        preference: PreferenceKey::AppSwitchLongPress,
        requires: HwKey::AppSwitch,
        setting: setting::APP_SWITCH_LONG_PRESS_ACTION,
        default: |c| {
            if c.has_key(HwKey::Menu) {
                ActionCode::Nothing
            } else {
                ActionCode::Menu
            }
        },
    },
];

/// Binding for an action preference, `None` for other preferences
pub fn action_binding(preference: PreferenceKey) -> Option<&'static ActionBinding> {
    ACTION_BINDINGS.iter().find(|b| b.preference == preference)
}
