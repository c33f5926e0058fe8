//! Pie-chart layout of the pool.
//!
//! Layout rule: slices are placed in **reverse pool order**, clockwise,
//! starting at [`LAYOUT_START_DEGREES`] (the top of the wheel, in screen
//! coordinates where angles grow clockwise). Each slice spans
//! `weight / total * 360` degrees. The angle mapper depends on this exact
//! rule; changing the order or the start angle breaks the pointer landing
//! inside the drawn winner.

use serde::Serialize;

use super::angle::FULL_TURN_DEGREES;
use super::engine::total_weight;
use super::item::Item;

/// Angle of the first slice's leading edge.
pub const LAYOUT_START_DEGREES: f64 = -90.0;

/// Slices narrower than this get a compact label.
pub const COMPACT_LABEL_DEGREES: f64 = 30.0;

/// One wedge of the wheel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    /// Index of the item in the pool.
    pub index: usize,
    /// Leading edge, in degrees.
    pub start_degrees: f64,
    /// Angular width, in degrees.
    pub sweep_degrees: f64,
    /// Angle of the label anchor.
    pub mid_degrees: f64,
    /// SVG large-arc flag: the wedge is wider than a half turn.
    pub large_arc: bool,
    /// The wedge is too narrow for a full-size label.
    pub compact_label: bool,
}

/// How the wheel should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WheelLayout {
    /// Nothing to draw.
    Empty,
    /// A single item occupies the whole circle, either because it is the
    /// only item or because it is the only one with weight left.
    FullCircle {
        /// Index of the item in the pool.
        index: usize,
    },
    /// Proportional wedges in layout order.
    Slices {
        /// Wedges, first one starting at the top.
        slices: Vec<Slice>,
    },
}

/// Computes the layout for the current pool.
///
/// Zero-weight items keep a zero-width wedge so indices stay aligned with
/// the pool. If every weight is zero the wedges are all zero-width.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout(pool: &[Item]) -> WheelLayout {
    match pool.len() {
        0 => return WheelLayout::Empty,
        1 => return WheelLayout::FullCircle { index: 0 },
        _ => {}
    }

    let mut drawable = pool.iter().enumerate().filter(|(_, item)| item.is_available());
    if let (Some((index, _)), None) = (drawable.next(), drawable.next()) {
        return WheelLayout::FullCircle { index };
    }

    let total = total_weight(pool);
    let mut current = LAYOUT_START_DEGREES;
    let slices = pool
        .iter()
        .enumerate()
        .rev()
        .map(|(index, item)| {
            let sweep = if total == 0 {
                0.0
            } else {
                f64::from(item.weight) / total as f64 * FULL_TURN_DEGREES
            };
            let slice = Slice {
                index,
                start_degrees: current,
                sweep_degrees: sweep,
                mid_degrees: current + sweep / 2.0,
                large_arc: sweep > FULL_TURN_DEGREES / 2.0,
                compact_label: sweep < COMPACT_LABEL_DEGREES,
            };
            current += sweep;
            slice
        })
        .collect();

    WheelLayout::Slices { slices }
}

impl WheelLayout {
    /// Pool index of the wedge under a pointer fixed at the top, after the
    /// wheel has been rotated clockwise by `rotation_degrees`.
    #[must_use]
    pub fn index_under_pointer(&self, rotation_degrees: f64) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::FullCircle { index } => Some(*index),
            Self::Slices { slices } => {
                // Position of the pointer in the unrotated wheel, measured
                // clockwise from the layout start.
                let relative = (-rotation_degrees).rem_euclid(FULL_TURN_DEGREES);
                slices
                    .iter()
                    .filter(|slice| slice.sweep_degrees > 0.0)
                    .find(|slice| {
                        let start = slice.start_degrees - LAYOUT_START_DEGREES;
                        relative >= start && relative < start + slice.sweep_degrees
                    })
                    .map(|slice| slice.index)
            }
        }
    }
}
