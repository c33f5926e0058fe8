//! Domain model for the draw context.

pub mod angle;
pub mod commands;
pub mod engine;
pub mod item;
pub mod layout;
pub mod palette;
pub mod policy;
pub mod session;
