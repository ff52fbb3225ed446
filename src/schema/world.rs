use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::location::LocationType;

/// A named destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
}

/// The official who greets ships at a major port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarborMaster {
    pub port: String,
    pub name: String,
    #[serde(alias = "fees")]
    pub fee: u32,
}

/// Raw world document. Missing collections are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldData {
    #[serde(default)]
    pub major_ports: Vec<Place>,
    #[serde(default)]
    pub villages: Vec<Place>,
    #[serde(default)]
    pub harbor_masters: Vec<HarborMaster>,
}

/// Static reference data for a session, with harbor masters indexed by port.
#[derive(Debug, Clone, Default)]
pub struct WorldRegistry {
    data: WorldData,
    masters_by_port: FxHashMap<String, usize>,
}

impl WorldRegistry {
    /// Index a world document. If a port lists more than one harbor master,
    /// the first entry is kept.
    pub fn new(data: WorldData) -> Self {
        let mut masters_by_port = FxHashMap::default();
        for (index, master) in data.harbor_masters.iter().enumerate() {
            masters_by_port.entry(master.port.clone()).or_insert(index);
        }
        Self {
            data,
            masters_by_port,
        }
    }

    pub fn harbor_master_for(&self, port: &str) -> Option<&HarborMaster> {
        self.masters_by_port
            .get(port)
            .map(|&index| &self.data.harbor_masters[index])
    }

    pub fn major_ports(&self) -> &[Place] {
        &self.data.major_ports
    }

    pub fn villages(&self) -> &[Place] {
        &self.data.villages
    }

    /// Destination names offered for a landfall of the given kind, in
    /// document order. The open sea is not a destination.
    pub fn destinations(&self, location_type: LocationType) -> Vec<&str> {
        let places: &[Place] = match location_type {
            LocationType::MajorPort => self.major_ports(),
            LocationType::Village => self.villages(),
            LocationType::Sea => &[],
        };
        places.iter().map(|place| place.name.as_str()).collect()
    }

    /// True if `name` is a registered port or village.
    pub fn is_known_place(&self, name: &str) -> bool {
        self.data
            .major_ports
            .iter()
            .chain(self.data.villages.iter())
            .any(|place| place.name == name)
    }

    pub fn data(&self) -> &WorldData {
        &self.data
    }
}

impl From<WorldData> for WorldRegistry {
    fn from(data: WorldData) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_world() -> WorldRegistry {
        WorldRegistry::new(WorldData {
            major_ports: vec![
                Place {
                    name: "Malacca Harbor".to_string(),
                },
                Place {
                    name: "Calicut".to_string(),
                },
            ],
            villages: vec![Place {
                name: "Kampung Laut".to_string(),
            }],
            harbor_masters: vec![
                HarborMaster {
                    port: "Malacca Harbor".to_string(),
                    name: "Syahbandar Raja Mendeliar".to_string(),
                    fee: 12,
                },
                HarborMaster {
                    port: "Malacca Harbor".to_string(),
                    name: "Impostor".to_string(),
                    fee: 1,
                },
            ],
        })
    }

    #[test]
    fn harbor_master_lookup() {
        let world = make_world();
        let master = world.harbor_master_for("Malacca Harbor").unwrap();
        assert_eq!(master.name, "Syahbandar Raja Mendeliar");
        assert_eq!(master.fee, 12);
        assert!(world.harbor_master_for("Calicut").is_none());
    }

    #[test]
    fn destinations_by_kind() {
        let world = make_world();
        assert_eq!(
            world.destinations(LocationType::MajorPort),
            vec!["Malacca Harbor", "Calicut"]
        );
        assert_eq!(world.destinations(LocationType::Village), vec!["Kampung Laut"]);
        assert!(world.destinations(LocationType::Sea).is_empty());
        assert!(world.is_known_place("Kampung Laut"));
        assert!(!world.is_known_place("Atlantis"));
    }

    #[test]
    fn legacy_fees_field() {
        let master: HarborMaster =
            serde_json::from_str(r#"{"port": "Aceh", "name": "Tun Ali", "fees": 9}"#).unwrap();
        assert_eq!(master.fee, 9);
    }

    #[test]
    fn missing_collections_default_empty() {
        let data: WorldData = ron::from_str("(major_ports: [(name: \"Goa\")])").unwrap();
        assert_eq!(data.major_ports.len(), 1);
        assert!(data.villages.is_empty());
        assert!(data.harbor_masters.is_empty());
    }
}
