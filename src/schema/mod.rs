pub mod effect;
pub mod event;
pub mod location;
pub mod player;
pub mod role;
pub mod world;
