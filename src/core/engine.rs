/// The voyage engine: sailing, landfall dispatch, and save slots.
///
/// Wires together matching, role variants, templating, and the
/// resolution cycle against one set of event pools and one world.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::cycle::{resolve, Notice, Presenter, Resolution};
use crate::core::data::DataError;
use crate::core::matcher::{first_eligible, pick_ambient};
use crate::core::persist::{load_snapshot, save_snapshot, PersistError};
use crate::core::resolver::apply_role_variant;
use crate::core::template::{render, TemplateContext};
use crate::schema::event::{EventPools, EventTemplate, PoolName};
use crate::schema::location::{LocationType, AT_SEA};
use crate::schema::player::{GameOver, OnceKey, PlayerState};
use crate::schema::role::Role;
use crate::schema::world::WorldRegistry;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("save error: {0}")]
    Persist(#[from] PersistError),
    #[error("the voyage is over: {0}")]
    GameOver(GameOver),
}

/// File locations for event data, world data, and the save slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub events: PathBuf,
    pub world: PathBuf,
    pub save: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            events: PathBuf::from("data/events.ron"),
            world: PathBuf::from("data/world.ron"),
            save: PathBuf::from("saves/slot1.ron"),
        }
    }
}

impl DataPaths {
    /// `events.ron` and `world.ron` inside `dir`; default save slot.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            events: dir.join("events.ron"),
            world: dir.join("world.ron"),
            ..Self::default()
        }
    }
}

/// One event that fired, and how it resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    pub pool: PoolName,
    pub event_id: String,
    pub once_key: Option<OnceKey>,
    pub resolution: Resolution,
}

/// The top-level engine. Built via `StraitsEngine::builder()`.
pub struct StraitsEngine {
    events: EventPools,
    world: WorldRegistry,
    paths: DataPaths,
    rng: StdRng,
}

/// Builder for constructing a `StraitsEngine`.
pub struct StraitsEngineBuilder {
    paths: DataPaths,
    seed: Option<u64>,
    /// Directly provided events (for testing without files).
    events: Option<EventPools>,
    /// Directly provided world (for testing without files).
    world: Option<WorldRegistry>,
}

impl StraitsEngine {
    pub fn builder() -> StraitsEngineBuilder {
        StraitsEngineBuilder {
            paths: DataPaths::default(),
            seed: None,
            events: None,
            world: None,
        }
    }

    pub fn events(&self) -> &EventPools {
        &self.events
    }

    pub fn world(&self) -> &WorldRegistry {
        &self.world
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn new_game(&self, role: Role) -> PlayerState {
        info!(%role, "new voyage");
        PlayerState::new(role)
    }

    /// Put out to sea: one sea event fires, then the day advances.
    pub fn sail<P: Presenter + ?Sized>(
        &mut self,
        state: &mut PlayerState,
        presenter: &mut P,
    ) -> Result<Option<EventOutcome>, EngineError> {
        ensure_playable(state)?;
        state.set_location(AT_SEA, LocationType::Sea);
        let outcome = self.trigger_ambient(PoolName::Sea, state, presenter)?;
        state.day = state.day.saturating_add(1);
        Ok(outcome)
    }

    /// Arrive at `name`: landfall events fire, then the day advances.
    pub fn make_landfall<P: Presenter + ?Sized>(
        &mut self,
        state: &mut PlayerState,
        name: &str,
        location_type: LocationType,
        presenter: &mut P,
    ) -> Result<Option<EventOutcome>, EngineError> {
        ensure_playable(state)?;
        if location_type != LocationType::Sea && !self.world.is_known_place(name) {
            warn!(destination = name, "landfall at a place missing from the world data");
        }
        state.set_location(name, location_type);
        info!(destination = name, kind = %location_type, day = state.day, "landfall");
        let outcome = self.on_landfall(state, presenter)?;
        state.day = state.day.saturating_add(1);
        Ok(outcome)
    }

    /// Fire exactly one event for the current location.
    ///
    /// The special pool is tried first (first eligible wins). If nothing
    /// there matches, a random event from the location type's ambient pool
    /// fires instead. `None` means that pool was empty. The day does not
    /// advance here; `make_landfall` does that.
    pub fn on_landfall<P: Presenter + ?Sized>(
        &mut self,
        state: &mut PlayerState,
        presenter: &mut P,
    ) -> Result<Option<EventOutcome>, EngineError> {
        if let Some(outcome) = self.trigger_special(state, presenter)? {
            return Ok(Some(outcome));
        }
        let pool = PoolName::ambient_for(state.current_location_type);
        self.trigger_ambient(pool, state, presenter)
    }

    /// Resolve the first eligible special event, if any.
    pub fn trigger_special<P: Presenter + ?Sized>(
        &mut self,
        state: &mut PlayerState,
        presenter: &mut P,
    ) -> Result<Option<EventOutcome>, EngineError> {
        ensure_playable(state)?;
        let Some((event, once_key)) = first_eligible(self.events.pool(PoolName::Special), state)
        else {
            return Ok(None);
        };
        let event = event.clone();
        Ok(Some(self.fire(PoolName::Special, &event, once_key, state, presenter)))
    }

    /// Resolve a random event from an ambient pool. Triggers and once-flags
    /// are not consulted.
    pub fn trigger_ambient<P: Presenter + ?Sized>(
        &mut self,
        pool: PoolName,
        state: &mut PlayerState,
        presenter: &mut P,
    ) -> Result<Option<EventOutcome>, EngineError> {
        ensure_playable(state)?;
        let Some(event) = pick_ambient(self.events.pool(pool), &mut self.rng).cloned() else {
            warn!(%pool, "no events available");
            presenter.notice(&Notice::NoEventsAvailable(pool));
            return Ok(None);
        };
        Ok(Some(self.fire(pool, &event, None, state, presenter)))
    }

    fn fire<P: Presenter + ?Sized>(
        &self,
        pool: PoolName,
        event: &EventTemplate,
        once_key: Option<OnceKey>,
        state: &mut PlayerState,
        presenter: &mut P,
    ) -> EventOutcome {
        debug!(%pool, event = %event.id, "event selected");
        let merged = apply_role_variant(event, state.role);
        let ctx = TemplateContext::for_state(state, &self.world);
        let rendered = render(&merged, &ctx);
        let resolution = resolve(&rendered, state, once_key.clone(), presenter);
        EventOutcome {
            pool,
            event_id: event.id.clone(),
            once_key,
            resolution,
        }
    }

    /// Write `state` to the configured save slot.
    pub fn save(&self, state: &PlayerState) -> Result<(), EngineError> {
        save_snapshot(&self.paths.save, state)?;
        Ok(())
    }

    /// Read the configured save slot. `Ok(None)` when there is no save.
    pub fn load(&self) -> Result<Option<PlayerState>, EngineError> {
        Ok(load_snapshot(&self.paths.save)?)
    }
}

fn ensure_playable(state: &PlayerState) -> Result<(), EngineError> {
    match state.game_over() {
        Some(reason) => Err(EngineError::GameOver(reason)),
        None => Ok(()),
    }
}

impl StraitsEngineBuilder {
    pub fn data_paths(mut self, paths: DataPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn events_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.events = path.into();
        self
    }

    pub fn world_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.world = path.into();
        self
    }

    pub fn save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.save = path.into();
        self
    }

    /// Seed for ambient event selection. Unseeded engines draw from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Provide events directly (for testing without files).
    pub fn with_events(mut self, events: EventPools) -> Self {
        self.events = Some(events);
        self
    }

    /// Provide the world directly (for testing without files).
    pub fn with_world(mut self, world: WorldRegistry) -> Self {
        self.world = Some(world);
        self
    }

    /// Load whatever was not provided directly. Missing or malformed data
    /// files are fatal.
    pub fn build(self) -> Result<StraitsEngine, EngineError> {
        let events = match self.events {
            Some(events) => events,
            None => EventPools::load(&self.paths.events)?,
        };
        let world = match self.world {
            Some(world) => world,
            None => WorldRegistry::load(&self.paths.world)?,
        };
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(StraitsEngine {
            events,
            world,
            paths: self.paths,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cycle::ScriptedPresenter;
    use crate::schema::effect::Effect;
    use crate::schema::event::{EventOption, Trigger};
    use crate::schema::world::{HarborMaster, Place, WorldData};
    use std::collections::{BTreeMap, HashMap};

    fn make_event(id: &str, description: &str, when: Option<Trigger>) -> EventTemplate {
        EventTemplate {
            id: id.to_string(),
            description: description.to_string(),
            options: BTreeMap::from([(
                "1".to_string(),
                EventOption {
                    text: "Carry on".to_string(),
                    effect: Effect {
                        morale: 1,
                        ..Effect::default()
                    },
                },
            )]),
            when,
            variants: HashMap::new(),
        }
    }

    fn build_test_engine(events: EventPools) -> StraitsEngine {
        let world = WorldRegistry::new(WorldData {
            major_ports: vec![Place {
                name: "Malacca Harbor".to_string(),
            }],
            villages: vec![Place {
                name: "Kampung Laut".to_string(),
            }],
            harbor_masters: vec![HarborMaster {
                port: "Malacca Harbor".to_string(),
                name: "Raja Mendeliar".to_string(),
                fee: 12,
            }],
        });
        StraitsEngine::builder()
            .seed(42)
            .with_events(events)
            .with_world(world)
            .build()
            .unwrap()
    }

    #[test]
    fn sail_moves_to_sea_and_advances_day() {
        let mut engine = build_test_engine(EventPools {
            sea_events: vec![make_event("squall", "A squall.", None)],
            ..EventPools::default()
        });
        let mut state = engine.new_game(Role::ChineseTrader);
        state.set_location("Malacca Harbor", LocationType::MajorPort);
        let mut presenter = ScriptedPresenter::new(["1"]);

        let outcome = engine.sail(&mut state, &mut presenter).unwrap().unwrap();

        assert_eq!(outcome.pool, PoolName::Sea);
        assert_eq!(outcome.event_id, "squall");
        assert_eq!(state.current_location, AT_SEA);
        assert_eq!(state.current_location_type, LocationType::Sea);
        assert_eq!(state.day, 2);
        assert_eq!(state.morale, 51);
    }

    #[test]
    fn empty_pool_notices_and_still_advances_day() {
        let mut engine = build_test_engine(EventPools::default());
        let mut state = engine.new_game(Role::ChineseTrader);
        let mut presenter = ScriptedPresenter::default();

        assert!(engine.sail(&mut state, &mut presenter).unwrap().is_none());
        assert_eq!(state.day, 2);
        assert_eq!(
            presenter.notices,
            vec![Notice::NoEventsAvailable(PoolName::Sea)]
        );
    }

    #[test]
    fn special_event_takes_priority_over_ambient() {
        let mut engine = build_test_engine(EventPools {
            harbor_events: vec![make_event("dock_gossip", "Gossip.", None)],
            special_events: vec![make_event(
                "welcome",
                "{harbormaster_name} collects {harbor_fee}.",
                Some(Trigger {
                    location_type: Some(LocationType::MajorPort),
                    ..Trigger::default()
                }),
            )],
            ..EventPools::default()
        });
        let mut state = engine.new_game(Role::ChineseTrader);
        let mut presenter = ScriptedPresenter::new(["1"]);

        let outcome = engine
            .make_landfall(&mut state, "Malacca Harbor", LocationType::MajorPort, &mut presenter)
            .unwrap()
            .unwrap();

        assert_eq!(outcome.pool, PoolName::Special);
        assert_eq!(presenter.views[0].description, "Raja Mendeliar collects 12.");
    }

    #[test]
    fn landfall_falls_back_to_location_pool() {
        let mut engine = build_test_engine(EventPools {
            harbor_events: vec![make_event("dock_gossip", "Gossip.", None)],
            village_events: vec![make_event("fish_market", "Fish.", None)],
            ..EventPools::default()
        });
        let mut state = engine.new_game(Role::ChineseTrader);
        let mut presenter = ScriptedPresenter::default();

        let village = engine
            .make_landfall(&mut state, "Kampung Laut", LocationType::Village, &mut presenter)
            .unwrap()
            .unwrap();
        assert_eq!(village.pool, PoolName::Village);

        let port = engine
            .make_landfall(&mut state, "Malacca Harbor", LocationType::MajorPort, &mut presenter)
            .unwrap()
            .unwrap();
        assert_eq!(port.pool, PoolName::Harbor);

        state.set_location(AT_SEA, LocationType::Sea);
        let stray = engine.on_landfall(&mut state, &mut presenter).unwrap().unwrap();
        assert_eq!(stray.pool, PoolName::Harbor);
        assert_eq!(state.day, 3);
    }

    #[test]
    fn game_over_blocks_actions() {
        let mut engine = build_test_engine(EventPools::default());
        let mut state = engine.new_game(Role::ChineseTrader);
        state.apply_effect(&Effect {
            ship_health: -100,
            ..Effect::default()
        });
        let before = state.clone();
        let mut presenter = ScriptedPresenter::default();

        let err = engine.sail(&mut state, &mut presenter).unwrap_err();
        assert!(matches!(err, EngineError::GameOver(GameOver::Shipwrecked)));
        assert_eq!(state, before);
    }

    #[test]
    fn game_over_blocks_direct_event_triggers() {
        let mut engine = build_test_engine(EventPools {
            harbor_events: vec![make_event("dock_gossip", "Gossip.", None)],
            special_events: vec![make_event("welcome", "Welcome.", None)],
            ..EventPools::default()
        });
        let mut state = engine.new_game(Role::ChineseTrader);
        state.set_location("Malacca Harbor", LocationType::MajorPort);
        state.apply_effect(&Effect {
            morale: -100,
            ..Effect::default()
        });
        let before = state.clone();
        let mut presenter = ScriptedPresenter::new(["1", "1", "1"]);

        assert!(matches!(
            engine.on_landfall(&mut state, &mut presenter),
            Err(EngineError::GameOver(GameOver::Deserted))
        ));
        assert!(matches!(
            engine.trigger_special(&mut state, &mut presenter),
            Err(EngineError::GameOver(GameOver::Deserted))
        ));
        assert!(matches!(
            engine.trigger_ambient(PoolName::Harbor, &mut state, &mut presenter),
            Err(EngineError::GameOver(GameOver::Deserted))
        ));
        assert_eq!(state, before);
        assert!(presenter.views.is_empty());
    }

    #[test]
    fn day_counter_saturates_at_the_limit() {
        let mut engine = build_test_engine(EventPools {
            sea_events: vec![make_event("squall", "A squall.", None)],
            village_events: vec![make_event("fish_market", "Fish.", None)],
            ..EventPools::default()
        });
        let mut state = engine.new_game(Role::ChineseTrader);
        state.day = u32::MAX;
        let mut presenter = ScriptedPresenter::new(["1", "1"]);

        engine.sail(&mut state, &mut presenter).unwrap();
        assert_eq!(state.day, u32::MAX);
        engine
            .make_landfall(&mut state, "Kampung Laut", LocationType::Village, &mut presenter)
            .unwrap();
        assert_eq!(state.day, u32::MAX);
    }

    #[test]
    fn builder_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = StraitsEngine::builder()
            .data_paths(DataPaths::in_dir(dir.path()))
            .build();
        assert!(matches!(
            result,
            Err(EngineError::Data(DataError::MissingFile(_)))
        ));
    }

    #[test]
    fn data_paths_in_dir() {
        let paths = DataPaths::in_dir("content");
        assert_eq!(paths.events, PathBuf::from("content/events.ron"));
        assert_eq!(paths.world, PathBuf::from("content/world.ron"));
        assert_eq!(paths.save, PathBuf::from("saves/slot1.ron"));
    }
}
