//! Straits Engine — data-driven narrative events for a text trading voyage.
//!
//! Given a player's location, role, and history, the engine picks an
//! eligible event from authored pools, merges the role's variant, fills in
//! port-specific placeholders, presents the choices, and applies the chosen
//! effect to the player's state.

pub mod core;
pub mod schema;
