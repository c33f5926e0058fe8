//! Commands for the draw context.

use wheel_core::command::Command;

use super::session::SpinToken;

/// Command to append an item to the pool.
#[derive(Debug, Clone)]
pub struct AddItem {
    /// Display name; surrounding whitespace is trimmed.
    pub name: String,
    /// Requested weight; must be positive.
    pub weight: i64,
}

impl Command for AddItem {
    fn command_type(&self) -> &'static str {
        "draw.add_item"
    }
}

/// Command to delete the item at a pool index.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    /// Pool index of the item.
    pub index: usize,
}

impl Command for RemoveItem {
    fn command_type(&self) -> &'static str {
        "draw.remove_item"
    }
}

/// Command to empty the pool and the winner log.
#[derive(Debug, Clone)]
pub struct ClearAll;

impl Command for ClearAll {
    fn command_type(&self) -> &'static str {
        "draw.clear_all"
    }
}

/// Command to draw a winner and start the spin animation.
#[derive(Debug, Clone)]
pub struct StartSpin;

impl Command for StartSpin {
    fn command_type(&self) -> &'static str {
        "draw.start_spin"
    }
}

/// Command to apply a finished spin's consequences.
#[derive(Debug, Clone)]
pub struct SettleSpin {
    /// Token returned when the spin started.
    pub token: SpinToken,
}

impl Command for SettleSpin {
    fn command_type(&self) -> &'static str {
        "draw.settle_spin"
    }
}

/// Command to restore all weights and clear the winner log.
#[derive(Debug, Clone)]
pub struct ResetWinners;

impl Command for ResetWinners {
    fn command_type(&self) -> &'static str {
        "draw.reset_winners"
    }
}

/// Command to flip the no-repeat toggle.
#[derive(Debug, Clone)]
pub struct SetNoRepeat {
    /// New toggle state.
    pub enabled: bool,
}

impl Command for SetNoRepeat {
    fn command_type(&self) -> &'static str {
        "draw.set_no_repeat"
    }
}

/// Command to flip the finite-pool toggle.
#[derive(Debug, Clone)]
pub struct SetFinitePool {
    /// New toggle state.
    pub enabled: bool,
}

impl Command for SetFinitePool {
    fn command_type(&self) -> &'static str {
        "draw.set_finite_pool"
    }
}
