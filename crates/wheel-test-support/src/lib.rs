//! Shared test mocks and utilities for the weighted wheel draw engine.

mod clock;
mod rng;
mod store;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingStore, RecordingStore};
