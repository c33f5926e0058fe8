//! Query handlers for the draw context.
//!
//! These build read-only views of the session for rendering.

use serde::Serialize;
use wheel_core::rng::DeterministicRng;

use crate::domain::engine::total_weight;
use crate::domain::layout::{WheelLayout, layout};
use crate::domain::palette::assign_colors;
use crate::domain::session::{Session, SpinPhase, SpinToken};

/// Read-only view of a single item.
#[derive(Debug, Serialize)]
pub struct ItemView {
    /// Pool index; the handle for removal.
    pub index: usize,
    /// Display name.
    pub name: String,
    /// Current weight.
    pub weight: u32,
    /// Weight restored on reset.
    pub original_weight: u32,
    /// CSS color of the item's slice.
    pub color: String,
}

/// Read-only view of the whole wheel.
#[derive(Debug, Serialize)]
pub struct WheelView {
    /// Items in pool order.
    pub items: Vec<ItemView>,
    /// Slice geometry.
    pub layout: WheelLayout,
    /// Rotation the wheel currently rests at.
    pub rotation_degrees: f64,
    /// Winner names in settle order.
    pub winners: Vec<String>,
    /// Whether no-repeat is on.
    pub no_repeat_enabled: bool,
    /// Whether finite pool is on.
    pub finite_pool_enabled: bool,
    /// Token of the spin in flight, if any.
    pub spinning: Option<SpinToken>,
    /// Sum of the current weights.
    pub total_weight: u64,
    /// Weight-space offset of the next draw.
    pub offset: f64,
}

/// Builds the view of the current session. Colors are recomputed on every
/// call; `rng` is only consulted when the hue walk runs out of steps.
#[must_use]
pub fn get_wheel(session: &Session, rng: &mut dyn DeterministicRng) -> WheelView {
    let pool = session.pool();
    let colors = assign_colors(pool.len(), rng);
    let items = pool
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(index, (item, color))| ItemView {
            index,
            name: item.name.clone(),
            weight: item.weight,
            original_weight: item.original_weight,
            color,
        })
        .collect();

    let policy = session.policy();
    let draw_state = session.draw_state();
    let spinning = match session.phase() {
        SpinPhase::Spinning { token } => Some(token),
        SpinPhase::Idle => None,
    };

    WheelView {
        items,
        layout: layout(pool),
        rotation_degrees: draw_state.last_rotation,
        winners: session.winners().to_vec(),
        no_repeat_enabled: policy.no_repeat_enabled(),
        finite_pool_enabled: policy.finite_pool_enabled(),
        spinning,
        total_weight: total_weight(pool),
        offset: draw_state.offset,
    }
}
