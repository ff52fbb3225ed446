use serde::{Deserialize, Serialize};

/// Upper bound for ship health and crew morale.
pub const GAUGE_MAX: u32 = 100;

/// Signed resource deltas carried by an event option.
///
/// Every field defaults to zero, so content only lists what changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Effect {
    pub gold: i64,
    pub spices: i64,
    #[serde(alias = "shipHealth")]
    pub ship_health: i64,
    pub morale: i64,
}

impl Effect {
    pub fn is_empty(&self) -> bool {
        *self == Effect::default()
    }
}

/// Apply `delta` to a stock that is floored at zero but has no cap.
pub fn apply_stock(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta);
    next.clamp(0, i64::from(u32::MAX)) as u32
}

/// Apply `delta` to a gauge held within `[0, GAUGE_MAX]`.
pub fn apply_gauge(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta);
    next.clamp(0, i64::from(GAUGE_MAX)) as u32
}
