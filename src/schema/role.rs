use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::effect::Effect;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// The player's background. Chosen once at new-game start; it shifts the
/// starting resources and selects role variants of event content.
///
/// Serialized as the display name (`"Chinese Trader"`), so content files
/// and save snapshots read naturally. Any other string fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    PortugueseConquistador,
    ArabMuslimDai,
    ChineseTrader,
}

impl Default for Role {
    fn default() -> Self {
        Self::PortugueseConquistador
    }
}

impl Role {
    pub const ALL: [Role; 3] = [
        Role::PortugueseConquistador,
        Role::ArabMuslimDai,
        Role::ChineseTrader,
    ];

    /// Display name, also the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PortugueseConquistador => "Portuguese Conquistador",
            Self::ArabMuslimDai => "Arab Muslim Dāʿī",
            Self::ChineseTrader => "Chinese Trader",
        }
    }

    /// ASCII identifier accepted as an alternative spelling in content files.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::PortugueseConquistador => "portuguese_conquistador",
            Self::ArabMuslimDai => "arab_muslim_dai",
            Self::ChineseTrader => "chinese_trader",
        }
    }

    /// Adjustment applied on top of the base starting resources.
    pub fn starting_effect(&self) -> Effect {
        match self {
            Self::PortugueseConquistador => Effect {
                gold: 10,
                morale: 5,
                ..Effect::default()
            },
            Self::ArabMuslimDai => Effect {
                spices: 2,
                morale: 10,
                ..Effect::default()
            },
            Self::ChineseTrader => Effect {
                gold: 15,
                spices: 5,
                ..Effect::default()
            },
        }
    }

    /// Map a new-game menu selection ("1".."3") to a role. Anything else
    /// falls back to the default role.
    pub fn from_menu_choice(choice: &str) -> Role {
        match choice.trim() {
            "2" => Self::ArabMuslimDai,
            "3" => Self::ChineseTrader,
            _ => Self::PortugueseConquistador,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.name() == trimmed || role.slug().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.name().to_string()
    }
}
