//! Weighted draw engine.
//!
//! Selection happens in weight-space: the drawable items are laid end to end
//! as half-open intervals `[start, start + weight)` in pool order, and the
//! winner is the item whose interval contains the cursor. The cursor is not a
//! fresh sample each time; it is the previous offset advanced by the sample,
//! wrapped at the total weight, so successive draws walk around the pool the
//! way a physical wheel keeps turning from where it stopped.

use wheel_core::error::DomainError;
use wheel_core::rng::DeterministicRng;

use super::item::Item;

/// Offset at startup and after every reset of the winner log.
pub const INITIAL_OFFSET: f64 = 0.5;

/// Outcome of a single draw. Nothing in the pool has been mutated yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    /// Index of the winner in the full pool (zero-weight items included).
    pub winner_index: usize,
    /// Start of the winner's interval in weight-space.
    pub cursor_start: u64,
    /// Weight-space position that selected the winner.
    pub cursor: f64,
    /// The uniform sample `r` in `[0, total)`.
    pub sample: f64,
    /// Sum of all drawable weights.
    pub total: u64,
    /// Number of items with a positive weight.
    pub available: usize,
    /// Offset to carry into the next draw; equal to `cursor`.
    pub new_offset: f64,
}

/// Sum of the weights of every item. Zero-weight items contribute nothing,
/// so this is also the total of the drawable subset.
#[must_use]
pub fn total_weight(pool: &[Item]) -> u64 {
    pool.iter().map(|item| u64::from(item.weight)).sum()
}

fn drawable_total(pool: &[Item]) -> Result<u64, DomainError> {
    if pool.is_empty() {
        return Err(DomainError::EmptyPool);
    }
    match total_weight(pool) {
        0 => Err(DomainError::NoAvailableItems),
        total => Ok(total),
    }
}

/// Draws a winner, sampling `r` uniformly from `[0, total)`.
///
/// # Errors
///
/// Returns `DomainError::EmptyPool` if the pool has no items, and
/// `DomainError::NoAvailableItems` if every weight is zero.
#[allow(clippy::cast_precision_loss)]
pub fn draw(
    pool: &[Item],
    offset: f64,
    rng: &mut dyn DeterministicRng,
) -> Result<Draw, DomainError> {
    let total = drawable_total(pool)?;
    let sample = rng.next_f64() * total as f64;
    draw_at(pool, offset, sample)
}

/// Draws a winner for a given sample `r`. For a fixed pool, the result is a
/// pure function of `(offset, sample)`.
///
/// # Errors
///
/// Same as [`draw`].
#[allow(clippy::cast_precision_loss)]
pub fn draw_at(pool: &[Item], offset: f64, sample: f64) -> Result<Draw, DomainError> {
    let total = drawable_total(pool)?;
    let cursor = (offset + sample).rem_euclid(total as f64);

    let mut start = 0u64;
    let mut last = None;
    let mut available = 0usize;
    let mut winner = None;

    for (index, item) in pool.iter().enumerate().filter(|(_, item)| item.is_available()) {
        available += 1;
        let end = start + u64::from(item.weight);
        if winner.is_none() && cursor >= start as f64 && cursor < end as f64 {
            winner = Some((index, start));
        }
        last = Some((index, start));
        start = end;
    }

    // `rem_euclid` can round up to exactly `total`; that position belongs to
    // the last interval.
    let (winner_index, cursor_start) = winner
        .or(last)
        .ok_or(DomainError::NoAvailableItems)?;

    Ok(Draw {
        winner_index,
        cursor_start,
        cursor,
        sample,
        total,
        available,
        new_offset: cursor,
    })
}
