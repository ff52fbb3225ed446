/// Event eligibility: trigger matching, once-flag checks and pool selection.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::schema::event::EventTemplate;
use crate::schema::player::{OnceKey, PlayerState};

/// Result of matching one event against the player's state.
///
/// `once_key` is set whenever the event is a one-time event whose other
/// conditions matched, including when it is blocked by an existing flag.
/// That lets callers tell "already consumed" apart from "never matched".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub eligible: bool,
    pub once_key: Option<OnceKey>,
}

impl MatchResult {
    fn rejected() -> Self {
        Self {
            eligible: false,
            once_key: None,
        }
    }

    /// True if every condition matched but the once-flag was already set.
    pub fn is_consumed(&self) -> bool {
        !self.eligible && self.once_key.is_some()
    }
}

/// Check `event.when` against `state`. Absent conditions always match.
pub fn matches(event: &EventTemplate, state: &PlayerState) -> MatchResult {
    let Some(trigger) = &event.when else {
        return MatchResult {
            eligible: true,
            once_key: None,
        };
    };

    if !trigger.location.is_empty() && !trigger.location.contains(&state.current_location) {
        return MatchResult::rejected();
    }
    if let Some(location_type) = trigger.location_type {
        if location_type != state.current_location_type {
            return MatchResult::rejected();
        }
    }
    if !trigger.role.is_empty() && !trigger.role.contains(&state.role) {
        return MatchResult::rejected();
    }

    if !trigger.once {
        return MatchResult {
            eligible: true,
            once_key: None,
        };
    }

    let key = OnceKey::new(&event.id, trigger.once_scope(&state.current_location));
    MatchResult {
        eligible: !state.has_once_flag(&key),
        once_key: Some(key),
    }
}

/// First eligible event in pool order. Used for the special pool, where
/// authoring order is priority order.
pub fn first_eligible<'a>(
    pool: &'a [EventTemplate],
    state: &PlayerState,
) -> Option<(&'a EventTemplate, Option<OnceKey>)> {
    for event in pool {
        let result = matches(event, state);
        if result.eligible {
            debug!(event = %event.id, "special event eligible");
            return Some((event, result.once_key));
        }
        if result.is_consumed() {
            debug!(event = %event.id, "special event already consumed here");
        }
    }
    None
}

/// Uniform random pick from an ambient pool. Triggers are not consulted.
pub fn pick_ambient<'a, R: Rng + ?Sized>(
    pool: &'a [EventTemplate],
    rng: &mut R,
) -> Option<&'a EventTemplate> {
    pool.choose(rng)
}
