//! Angle mapper: from a weight-space winner to a wheel rotation.
//!
//! Slices are laid out in reverse pool order, clockwise, starting at the top
//! (see [`super::layout`]). Under that rule a weight-space position `p` sits
//! `(total - p) / total * 360` degrees clockwise of the top, so rotating the
//! wheel clockwise by `p / total * 360` degrees brings `p` under a pointer
//! fixed at the top.

use serde::{Deserialize, Serialize};
use wheel_core::error::DomainError;
use wheel_core::rng::DeterministicRng;

use super::engine::total_weight;
use super::item::Item;

/// Degrees in one full turn.
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Full turns added to every spin so the animation travels visibly.
pub const DEFAULT_SPIN_TURNS: u32 = 10;

/// Animation easing reported to the renderer.
pub const SPIN_EASING: &str = "cubic-bezier(0.1, 0.9, 0.2, 1)";

/// Animation instructions for one spin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinPlan {
    /// Rotation the wheel rests at before the spin.
    pub from_degrees: f64,
    /// Rotation the animation ends at (`turns * 360 + target`).
    pub to_degrees: f64,
    /// `to_degrees mod 360`, applied instantly once the animation ends.
    pub resting_degrees: f64,
    /// Weight-space position the pointer lands on.
    pub target_position: f64,
}

/// Converts a weight-space position to a clockwise rotation in degrees.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn position_to_degrees(position: f64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    position / total as f64 * FULL_TURN_DEGREES
}

/// Picks where inside the winner's interval the pointer should stop.
///
/// The winner's weight `w` is split into `w` unit sub-segments and one is
/// chosen uniformly; the result is that sub-segment's midpoint,
/// `cursor_start + k + 0.5`. When the winner is the only drawable item it
/// covers the whole wheel, so no random pick is made and the interval
/// midpoint is returned.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn target_position(
    winner: &Item,
    cursor_start: u64,
    sole_drawable: bool,
    rng: &mut dyn DeterministicRng,
) -> f64 {
    let start = cursor_start as f64;
    if sole_drawable {
        return start + f64::from(winner.weight) / 2.0;
    }
    let segments = winner.weight.max(1);
    let k = rng.next_u32_range(0, segments - 1).min(segments - 1);
    start + f64::from(k) + 0.5
}

/// Rotation in `[0, 360)` that lands the pointer inside the winner's slice.
///
/// # Errors
///
/// Returns `DomainError::ItemNotFound` if `winner_index` is outside the pool,
/// and `DomainError::NoAvailableItems` if the pool has no weight at all.
pub fn target_angle(
    pool: &[Item],
    winner_index: usize,
    cursor_start: u64,
    rng: &mut dyn DeterministicRng,
) -> Result<f64, DomainError> {
    let (_, angle) = target(pool, winner_index, cursor_start, rng)?;
    Ok(angle)
}

fn target(
    pool: &[Item],
    winner_index: usize,
    cursor_start: u64,
    rng: &mut dyn DeterministicRng,
) -> Result<(f64, f64), DomainError> {
    let winner = pool
        .get(winner_index)
        .ok_or(DomainError::ItemNotFound(winner_index))?;
    let total = total_weight(pool);
    if total == 0 {
        return Err(DomainError::NoAvailableItems);
    }
    let sole_drawable = pool.iter().filter(|item| item.is_available()).count() == 1;
    let position = target_position(winner, cursor_start, sole_drawable, rng);
    let angle = position_to_degrees(position, total).rem_euclid(FULL_TURN_DEGREES);
    Ok((position, angle))
}

/// Plans the animation from the current resting rotation to the winner.
///
/// # Errors
///
/// Same as [`target_angle`].
pub fn plan_spin(
    pool: &[Item],
    winner_index: usize,
    cursor_start: u64,
    from_degrees: f64,
    turns: u32,
    rng: &mut dyn DeterministicRng,
) -> Result<SpinPlan, DomainError> {
    let (target_position, angle) = target(pool, winner_index, cursor_start, rng)?;
    let to_degrees = f64::from(turns) * FULL_TURN_DEGREES + angle;
    Ok(SpinPlan {
        from_degrees,
        to_degrees,
        resting_degrees: to_degrees.rem_euclid(FULL_TURN_DEGREES),
        target_position,
    })
}
