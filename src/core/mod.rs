pub mod cycle;
pub mod data;
pub mod engine;
pub mod matcher;
pub mod persist;
pub mod resolver;
pub mod template;
