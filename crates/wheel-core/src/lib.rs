//! Wheel Core: shared domain abstractions.
//!
//! This crate defines the traits and types that the draw context and its
//! adapters depend on. It contains no infrastructure code beyond the
//! production RNG and clock.

pub mod clock;
pub mod command;
pub mod error;
pub mod rng;
pub mod store;
