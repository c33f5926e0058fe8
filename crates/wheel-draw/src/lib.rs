//! Wheel Draw: the weighted draw bounded context.
//!
//! Responsible for picking a winner from a weighted pool, carrying the
//! weight-space offset between draws, applying the depletion policy when a
//! spin settles, and mapping each winner to the rotation that brings its
//! slice under the pointer.

pub mod application;
pub mod domain;
