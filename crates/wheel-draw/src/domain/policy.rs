//! Depletion policies.

use serde::{Deserialize, Serialize};

use super::item::Item;

/// Rule governing how a winner's weight changes once its spin settles.
///
/// Exactly one policy is active at a time. The two boolean toggles exposed to
/// the input surface and the store are views of this enum, so they can never
/// both be on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepletionPolicy {
    /// Winners stay in the pool unchanged.
    #[default]
    Unlimited,
    /// A winner's weight drops to zero until the next reset.
    NoRepeat,
    /// A winner loses one unit of weight per win, floored at zero.
    FinitePool,
}

impl DepletionPolicy {
    /// Builds the policy from the two stored toggles. If both are set,
    /// `NoRepeat` wins.
    #[must_use]
    pub fn from_flags(no_repeat: bool, finite_pool: bool) -> Self {
        if no_repeat {
            Self::NoRepeat
        } else if finite_pool {
            Self::FinitePool
        } else {
            Self::Unlimited
        }
    }

    /// Whether the no-repeat toggle is on.
    #[must_use]
    pub fn no_repeat_enabled(self) -> bool {
        self == Self::NoRepeat
    }

    /// Whether the finite-pool toggle is on.
    #[must_use]
    pub fn finite_pool_enabled(self) -> bool {
        self == Self::FinitePool
    }

    /// Result of flipping the no-repeat toggle. Enabling it switches finite
    /// pool off; disabling it only matters when it was the active policy.
    #[must_use]
    pub fn with_no_repeat(self, enabled: bool) -> Self {
        match (enabled, self) {
            (true, _) => Self::NoRepeat,
            (false, Self::NoRepeat) => Self::Unlimited,
            (false, other) => other,
        }
    }

    /// Result of flipping the finite-pool toggle.
    #[must_use]
    pub fn with_finite_pool(self, enabled: bool) -> Self {
        match (enabled, self) {
            (true, _) => Self::FinitePool,
            (false, Self::FinitePool) => Self::Unlimited,
            (false, other) => other,
        }
    }

    /// Applies the policy to a freshly settled winner.
    pub fn apply(self, item: &mut Item) {
        match self {
            Self::Unlimited => {}
            Self::NoRepeat => item.weight = 0,
            Self::FinitePool => item.weight = item.weight.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(weight: u32) -> Item {
        Item {
            name: "A".to_owned(),
            weight,
            original_weight: weight,
        }
    }

    #[test]
    fn test_unlimited_leaves_weight_untouched() {
        let mut winner = item(4);
        DepletionPolicy::Unlimited.apply(&mut winner);
        assert_eq!(winner.weight, 4);
    }

    #[test]
    fn test_no_repeat_zeroes_weight() {
        let mut winner = item(4);
        DepletionPolicy::NoRepeat.apply(&mut winner);
        assert_eq!(winner.weight, 0);
        assert_eq!(winner.original_weight, 4);
    }

    #[test]
    fn test_finite_pool_decrements_and_floors_at_zero() {
        let mut winner = item(3);
        for expected in [2, 1, 0, 0, 0] {
            DepletionPolicy::FinitePool.apply(&mut winner);
            assert_eq!(winner.weight, expected);
        }
    }

    #[test]
    fn test_enabling_no_repeat_clears_finite_pool() {
        let policy = DepletionPolicy::FinitePool.with_no_repeat(true);

        assert_eq!(policy, DepletionPolicy::NoRepeat);
        assert!(policy.no_repeat_enabled());
        assert!(!policy.finite_pool_enabled());
    }

    #[test]
    fn test_enabling_finite_pool_clears_no_repeat() {
        let policy = DepletionPolicy::NoRepeat.with_finite_pool(true);

        assert_eq!(policy, DepletionPolicy::FinitePool);
        assert!(!policy.no_repeat_enabled());
        assert!(policy.finite_pool_enabled());
    }

    #[test]
    fn test_disabling_inactive_toggle_is_noop() {
        assert_eq!(
            DepletionPolicy::FinitePool.with_no_repeat(false),
            DepletionPolicy::FinitePool
        );
        assert_eq!(
            DepletionPolicy::NoRepeat.with_finite_pool(false),
            DepletionPolicy::NoRepeat
        );
    }

    #[test]
    fn test_disabling_active_toggle_returns_to_unlimited() {
        assert_eq!(
            DepletionPolicy::NoRepeat.with_no_repeat(false),
            DepletionPolicy::Unlimited
        );
        assert_eq!(
            DepletionPolicy::FinitePool.with_finite_pool(false),
            DepletionPolicy::Unlimited
        );
    }

    #[test]
    fn test_toggles_never_both_enabled() {
        let all = [
            DepletionPolicy::Unlimited,
            DepletionPolicy::NoRepeat,
            DepletionPolicy::FinitePool,
        ];
        for start in all {
            for enabled in [true, false] {
                for next in [start.with_no_repeat(enabled), start.with_finite_pool(enabled)] {
                    assert!(!(next.no_repeat_enabled() && next.finite_pool_enabled()));
                }
            }
        }
    }

    #[test]
    fn test_from_flags_prefers_no_repeat() {
        assert_eq!(DepletionPolicy::from_flags(true, true), DepletionPolicy::NoRepeat);
        assert_eq!(DepletionPolicy::from_flags(false, true), DepletionPolicy::FinitePool);
        assert_eq!(DepletionPolicy::from_flags(false, false), DepletionPolicy::Unlimited);
    }
}
