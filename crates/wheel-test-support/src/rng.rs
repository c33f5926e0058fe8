//! Test RNG: deterministic `DeterministicRng` implementations for tests.

use std::collections::VecDeque;

use wheel_core::rng::DeterministicRng;

/// A no-op RNG that always returns `min` for `next_u32_range` and `0.0` for
/// `next_f64`. Suitable for tests that do not depend on specific random values.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// An RNG that returns values from predetermined sequences. Integer and float
/// requests draw from separate queues so a test can script the weight-space
/// sample (`next_f64`) and the sub-segment pick (`next_u32_range`)
/// independently.
///
/// Panics if the integer sequence is exhausted. An exhausted float sequence
/// yields `0.0`.
#[derive(Debug, Default)]
pub struct SequenceRng {
    values: VecDeque<u32>,
    fractions: VecDeque<f64>,
}

impl SequenceRng {
    /// Create a new `SequenceRng` returning `values` from `next_u32_range`.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values: values.into(),
            fractions: VecDeque::new(),
        }
    }

    /// Script the values returned by `next_f64`. Each must lie in `[0, 1)`.
    #[must_use]
    pub fn with_fractions(mut self, fractions: Vec<f64>) -> Self {
        self.fractions = fractions.into();
        self
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        self.values
            .pop_front()
            .expect("SequenceRng integer sequence exhausted")
    }

    fn next_f64(&mut self) -> f64 {
        self.fractions.pop_front().unwrap_or(0.0)
    }
}
