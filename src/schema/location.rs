use serde::{Deserialize, Serialize};
use std::fmt;

/// Location name used while the ship is between ports.
pub const AT_SEA: &str = "At Sea";

/// The kind of place the player currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Sea,
    MajorPort,
    Village,
}

impl Default for LocationType {
    fn default() -> Self {
        Self::Sea
    }
}

impl LocationType {
    /// Serialized identifier: "sea", "major_port", "village".
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Sea => "sea",
            Self::MajorPort => "major_port",
            Self::Village => "village",
        }
    }

    /// Human-readable label for menus.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sea => "sea",
            Self::MajorPort => "major port",
            Self::Village => "village",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_identifiers() {
        let t: LocationType = ron::from_str("major_port").unwrap();
        assert_eq!(t, LocationType::MajorPort);
        let t: LocationType = serde_json::from_str("\"village\"").unwrap();
        assert_eq!(t, LocationType::Village);
        assert_eq!(LocationType::MajorPort.label(), "major port");
    }
}
