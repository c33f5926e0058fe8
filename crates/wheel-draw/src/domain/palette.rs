//! Display colors for wheel slices.
//!
//! Hues are spread evenly around the color wheel by pool position, so the
//! assignment is recomputed whenever the item count or order changes and
//! never depends on previous assignments. A collision walks the hue forward
//! in 30 degree steps; if every step collides a random hue is used, which
//! may itself collide.

use wheel_core::rng::DeterministicRng;

const SATURATION: u32 = 70;
const LIGHTNESS: u32 = 50;
const HUE_STEP: f64 = 30.0;

fn css(hue: f64) -> String {
    format!("hsl({hue}, {SATURATION}%, {LIGHTNESS}%)")
}

#[allow(clippy::cast_precision_loss)]
fn unique_color(
    existing: &[String],
    index: usize,
    count: usize,
    rng: &mut dyn DeterministicRng,
) -> String {
    let hue = 360.0 / count.max(1) as f64 * index as f64;
    let candidate = css(hue);
    if !existing.contains(&candidate) {
        return candidate;
    }

    let mut offset = HUE_STEP;
    while offset < 360.0 {
        let shifted = css((hue + offset) % 360.0);
        if !existing.contains(&shifted) {
            return shifted;
        }
        offset += HUE_STEP;
    }

    css(f64::from(rng.next_u32_range(0, 359)))
}

/// Assigns a CSS color to each of `count` items, in pool order.
#[must_use]
pub fn assign_colors(count: usize, rng: &mut dyn DeterministicRng) -> Vec<String> {
    let mut colors: Vec<String> = Vec::with_capacity(count);
    for index in 0..count {
        let color = unique_color(&colors, index, count, rng);
        colors.push(color);
    }
    colors
}
