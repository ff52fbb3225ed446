use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::effect::Effect;
use super::location::LocationType;
use super::player::OnceScope;
use super::role::Role;

fn default_description() -> String {
    "An event occurs.".to_string()
}

fn default_option_text() -> String {
    "...".to_string()
}

/// Matching predicate for special events. Absent or empty fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub location: FxHashSet<String>,
    #[serde(default, alias = "type", alias = "locationType")]
    pub location_type: Option<LocationType>,
    #[serde(default)]
    pub role: FxHashSet<Role>,
    #[serde(default)]
    pub once: bool,
}

impl Trigger {
    /// Scope selector for one-time consumption.
    ///
    /// A trigger tied to places (a `location` list, or the `major_port`
    /// type) is consumed per location; anything else is consumed once per
    /// playthrough.
    pub fn once_scope<'a>(&self, current_location: &'a str) -> OnceScope<'a> {
        if !self.location.is_empty() || self.location_type == Some(LocationType::MajorPort) {
            OnceScope::Location(current_location)
        } else {
            OnceScope::Anywhere
        }
    }
}

/// One selectable choice inside an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
    #[serde(default = "default_option_text")]
    pub text: String,
    #[serde(default)]
    pub effect: Effect,
}

impl Default for EventOption {
    fn default() -> Self {
        Self {
            text: default_option_text(),
            effect: Effect::default(),
        }
    }
}

/// Partial option replacement inside a role variant. Supplied fields win
/// over the base option; omitted fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionOverride {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub effect: Option<Effect>,
}

/// Role-specific override of an event's description and options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleVariant {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, OptionOverride>,
}

/// Authored event data. Read-only; every resolution stage works on a
/// [`ResolvedEvent`] copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub id: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub options: BTreeMap<String, EventOption>,
    #[serde(default)]
    pub when: Option<Trigger>,
    #[serde(default)]
    pub variants: HashMap<Role, RoleVariant>,
}

/// A concrete event payload ready to present: variant merged, text rendered.
///
/// Options are keyed in a `BTreeMap`, so iteration is in sorted key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEvent {
    pub id: String,
    pub description: String,
    pub options: BTreeMap<String, EventOption>,
}

impl From<&EventTemplate> for ResolvedEvent {
    fn from(template: &EventTemplate) -> Self {
        Self {
            id: template.id.clone(),
            description: template.description.clone(),
            options: template.options.clone(),
        }
    }
}

impl ResolvedEvent {
    /// Heading derived from the id: `harbormaster_intro` → `Harbormaster Intro`.
    pub fn title(&self) -> String {
        if self.id.is_empty() {
            return "Event".to_string();
        }
        self.id
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Names of the four event pools in an event document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolName {
    Sea,
    Harbor,
    Village,
    Special,
}

impl PoolName {
    pub const ALL: [PoolName; 4] = [
        PoolName::Sea,
        PoolName::Harbor,
        PoolName::Village,
        PoolName::Special,
    ];

    /// Document key: "sea_events", "harbor_events", ...
    pub fn key(&self) -> &'static str {
        match self {
            Self::Sea => "sea_events",
            Self::Harbor => "harbor_events",
            Self::Village => "village_events",
            Self::Special => "special_events",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sea => "sea events",
            Self::Harbor => "harbor events",
            Self::Village => "village events",
            Self::Special => "special events",
        }
    }

    /// Ambient pool used on landfall when no special event fires.
    pub fn ambient_for(location_type: LocationType) -> PoolName {
        match location_type {
            LocationType::MajorPort => Self::Harbor,
            LocationType::Village => Self::Village,
            LocationType::Sea => Self::Harbor,
        }
    }

    /// Ambient pools pick at random and ignore `when`; the special pool
    /// is matched in order.
    pub fn is_ambient(&self) -> bool {
        !matches!(self, Self::Special)
    }
}

impl fmt::Display for PoolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The four named pools of an event document. Missing pools are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPools {
    #[serde(default)]
    pub sea_events: Vec<EventTemplate>,
    #[serde(default)]
    pub harbor_events: Vec<EventTemplate>,
    #[serde(default)]
    pub village_events: Vec<EventTemplate>,
    #[serde(default)]
    pub special_events: Vec<EventTemplate>,
}

impl EventPools {
    pub fn pool(&self, name: PoolName) -> &[EventTemplate] {
        match name {
            PoolName::Sea => &self.sea_events,
            PoolName::Harbor => &self.harbor_events,
            PoolName::Village => &self.village_events,
            PoolName::Special => &self.special_events,
        }
    }

    pub fn pool_mut(&mut self, name: PoolName) -> &mut Vec<EventTemplate> {
        match name {
            PoolName::Sea => &mut self.sea_events,
            PoolName::Harbor => &mut self.harbor_events,
            PoolName::Village => &mut self.village_events,
            PoolName::Special => &mut self.special_events,
        }
    }

    pub fn len(&self) -> usize {
        PoolName::ALL.iter().map(|name| self.pool(*name).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_id() {
        let event = ResolvedEvent {
            id: "harbormaster_intro".to_string(),
            description: String::new(),
            options: BTreeMap::new(),
        };
        assert_eq!(event.title(), "Harbormaster Intro");

        let unnamed = ResolvedEvent {
            id: String::new(),
            ..event
        };
        assert_eq!(unnamed.title(), "Event");
    }

    #[test]
    fn once_scope_selection() {
        let port_bound = Trigger {
            location_type: Some(LocationType::MajorPort),
            once: true,
            ..Trigger::default()
        };
        assert_eq!(
            port_bound.once_scope("Malacca Harbor"),
            OnceScope::Location("Malacca Harbor")
        );

        let named = Trigger {
            location: ["Aceh".to_string()].into_iter().collect(),
            once: true,
            ..Trigger::default()
        };
        assert_eq!(named.once_scope("Aceh"), OnceScope::Location("Aceh"));

        let village_type = Trigger {
            location_type: Some(LocationType::Village),
            once: true,
            ..Trigger::default()
        };
        assert_eq!(village_type.once_scope("Kampung Laut"), OnceScope::Anywhere);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let event: EventTemplate =
            serde_json::from_str(r#"{"id": "calm", "options": {"1": {}}}"#).unwrap();
        assert_eq!(event.description, "An event occurs.");
        assert_eq!(event.options["1"].text, "...");
        assert!(event.options["1"].effect.is_empty());
        assert!(event.when.is_none());
        assert!(event.variants.is_empty());
    }

    #[test]
    fn legacy_json_trigger_keys() {
        let trigger: Trigger =
            serde_json::from_str(r#"{"type": "major_port", "once": true, "role": ["Chinese Trader"]}"#)
                .unwrap();
        assert_eq!(trigger.location_type, Some(LocationType::MajorPort));
        assert!(trigger.role.contains(&Role::ChineseTrader));
        assert!(trigger.location.is_empty());
    }

    #[test]
    fn unknown_role_in_variants_is_rejected() {
        let result: Result<EventTemplate, _> = serde_json::from_str(
            r#"{"id": "x", "variants": {"Dutch Merchant": {"description": "hi"}}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn landfall_pool_mapping() {
        assert_eq!(PoolName::ambient_for(LocationType::MajorPort), PoolName::Harbor);
        assert_eq!(PoolName::ambient_for(LocationType::Village), PoolName::Village);
        assert_eq!(PoolName::ambient_for(LocationType::Sea), PoolName::Harbor);
        assert!(!PoolName::Special.is_ambient());
    }
}
