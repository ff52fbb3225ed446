use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::effect::{apply_gauge, apply_stock, Effect, GAUGE_MAX};
use super::location::{LocationType, AT_SEA};
use super::role::Role;

/// Composite key marking a one-time event as consumed: `"<event_id>|<scope>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OnceKey(String);

/// Where a one-time event's consumption applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnceScope<'a> {
    /// Once per named location (selector is the location name).
    Location(&'a str),
    /// Once per playthrough (selector `*`).
    Anywhere,
}

impl OnceScope<'_> {
    pub fn selector(&self) -> &str {
        match self {
            Self::Location(name) => *name,
            Self::Anywhere => "*",
        }
    }
}

impl OnceKey {
    pub fn new(event_id: &str, scope: OnceScope<'_>) -> Self {
        Self(format!("{}|{}", event_id, scope.selector()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OnceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a voyage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOver {
    Shipwrecked,
    Deserted,
}

impl GameOver {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Shipwrecked => "Your ship has been wrecked by misfortune at sea.",
            Self::Deserted => "Your crew has lost all spirit and deserted you.",
        }
    }
}

impl fmt::Display for GameOver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Mutable session state for one playthrough.
///
/// Resource invariants: `gold` and `spices` never go below zero,
/// `ship_health` and `morale` stay within `[0, 100]`. All resource changes
/// go through [`PlayerState::apply_effect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub role: Role,
    pub gold: u32,
    pub spices: u32,
    pub ship_health: u32,
    pub morale: u32,
    pub day: u32,
    pub current_location: String,
    pub current_location_type: LocationType,
    #[serde(default)]
    pub once_flags: BTreeSet<OnceKey>,
}

impl PlayerState {
    pub const START_GOLD: u32 = 30;
    pub const START_SPICES: u32 = 0;
    pub const START_SHIP_HEALTH: u32 = 100;
    pub const START_MORALE: u32 = 50;

    /// Fresh state for a new game: base resources plus the role's starting
    /// adjustment, day 1, at sea.
    pub fn new(role: Role) -> Self {
        let mut state = Self {
            role,
            gold: Self::START_GOLD,
            spices: Self::START_SPICES,
            ship_health: Self::START_SHIP_HEALTH,
            morale: Self::START_MORALE,
            day: 1,
            current_location: AT_SEA.to_string(),
            current_location_type: LocationType::Sea,
            once_flags: BTreeSet::new(),
        };
        state.apply_effect(&role.starting_effect());
        state
    }

    pub fn apply_effect(&mut self, effect: &Effect) {
        self.gold = apply_stock(self.gold, effect.gold);
        self.spices = apply_stock(self.spices, effect.spices);
        self.ship_health = apply_gauge(self.ship_health, effect.ship_health);
        self.morale = apply_gauge(self.morale, effect.morale);
    }

    /// `Some` once the voyage has ended. A terminal state takes no further actions.
    pub fn game_over(&self) -> Option<GameOver> {
        if self.ship_health == 0 {
            Some(GameOver::Shipwrecked)
        } else if self.morale == 0 {
            Some(GameOver::Deserted)
        } else {
            None
        }
    }

    pub fn set_location(&mut self, name: &str, location_type: LocationType) {
        self.current_location = name.to_string();
        self.current_location_type = location_type;
    }

    pub fn has_once_flag(&self, key: &OnceKey) -> bool {
        self.once_flags.contains(key)
    }

    /// Returns false if the key was already recorded.
    pub fn record_once_flag(&mut self, key: OnceKey) -> bool {
        self.once_flags.insert(key)
    }

    /// Returns a description of the first violated invariant, if any.
    pub fn invariant_violation(&self) -> Option<String> {
        if self.ship_health > GAUGE_MAX {
            return Some(format!(
                "ship_health {} exceeds {}",
                self.ship_health, GAUGE_MAX
            ));
        }
        if self.morale > GAUGE_MAX {
            return Some(format!("morale {} exceeds {}", self.morale, GAUGE_MAX));
        }
        if self.day == 0 {
            return Some("day must start at 1".to_string());
        }
        None
    }

    pub fn status_text(&self) -> String {
        format!(
            "Day {}\nRole: {}\nLocation: {} ({})\nGold: {} | Spices: {}\nShip Health: {} | Morale: {}",
            self.day,
            self.role,
            self.current_location,
            self.current_location_type,
            self.gold,
            self.spices,
            self.ship_health,
            self.morale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_resources_per_role() {
        let trader = PlayerState::new(Role::ChineseTrader);
        assert_eq!((trader.gold, trader.spices), (45, 5));
        assert_eq!((trader.ship_health, trader.morale), (100, 50));

        let conquistador = PlayerState::new(Role::PortugueseConquistador);
        assert_eq!((conquistador.gold, conquistador.morale), (40, 55));

        let dai = PlayerState::new(Role::ArabMuslimDai);
        assert_eq!((dai.spices, dai.morale), (2, 60));

        assert_eq!(dai.day, 1);
        assert_eq!(dai.current_location, AT_SEA);
        assert_eq!(dai.current_location_type, LocationType::Sea);
        assert!(dai.once_flags.is_empty());
    }

    #[test]
    fn effects_respect_bounds_for_any_magnitude() {
        let deltas = [i64::MIN, -1_000, -101, -1, 0, 1, 99, 1_000, i64::MAX];
        for &d in &deltas {
            let mut state = PlayerState::new(Role::ArabMuslimDai);
            state.apply_effect(&Effect {
                gold: d,
                spices: d,
                ship_health: d,
                morale: d,
            });
            assert!(state.ship_health <= GAUGE_MAX, "delta {}", d);
            assert!(state.morale <= GAUGE_MAX, "delta {}", d);
            assert!(state.invariant_violation().is_none());
        }
    }

    #[test]
    fn game_over_reasons() {
        let mut state = PlayerState::new(Role::ChineseTrader);
        assert_eq!(state.game_over(), None);
        state.apply_effect(&Effect {
            morale: -500,
            ..Effect::default()
        });
        assert_eq!(state.game_over(), Some(GameOver::Deserted));
        state.apply_effect(&Effect {
            ship_health: -100,
            ..Effect::default()
        });
        assert_eq!(state.game_over(), Some(GameOver::Shipwrecked));
    }

    #[test]
    fn once_key_composition() {
        let key = OnceKey::new("harbormaster_intro", OnceScope::Location("Malacca Harbor"));
        assert_eq!(key.as_str(), "harbormaster_intro|Malacca Harbor");
        let key = OnceKey::new("eclipse", OnceScope::Anywhere);
        assert_eq!(key.to_string(), "eclipse|*");
    }

    #[test]
    fn record_once_flag_is_idempotent() {
        let mut state = PlayerState::new(Role::ChineseTrader);
        let key = OnceKey::new("eclipse", OnceScope::Anywhere);
        assert!(state.record_once_flag(key.clone()));
        assert!(!state.record_once_flag(key.clone()));
        assert!(state.has_once_flag(&key));
        assert_eq!(state.once_flags.len(), 1);
    }

    #[test]
    fn status_text_lists_resources() {
        let state = PlayerState::new(Role::ChineseTrader);
        let text = state.status_text();
        assert!(text.contains("Day 1"));
        assert!(text.contains("Role: Chinese Trader"));
        assert!(text.contains("Location: At Sea (sea)"));
        assert!(text.contains("Gold: 45 | Spices: 5"));
    }
}
