//! The session aggregate.
//!
//! A `Session` owns everything one wheel needs between events: the pool, the
//! active depletion policy, the draw state (weight-space offset and resting
//! rotation), the winner log and the spin in flight, if any.
//!
//! Spin state machine: `Idle -> Spinning -> Settled -> Idle`. Starting a spin
//! draws the winner and advances the offset, but the winner's weight and the
//! winner log are only touched when the spin settles. Each spin carries a
//! [`SpinToken`]; reset, clear-all and removal invalidate the spin in flight so
//! a late settle for it does nothing.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use wheel_core::clock::Clock;
use wheel_core::error::DomainError;
use wheel_core::rng::DeterministicRng;

use super::angle::{self, DEFAULT_SPIN_TURNS, SPIN_EASING, SpinPlan};
use super::engine::{self, INITIAL_OFFSET};
use super::item::Item;
use super::policy::DepletionPolicy;

/// Default animation length before a spin settles.
pub const DEFAULT_SPIN_DURATION_MS: u64 = 6_000;

/// Identifies one spin. Tokens are drawn from the session's generation
/// counter and are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpinToken(pub u64);

impl fmt::Display for SpinToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weight-space pointer and resting rotation carried between draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawState {
    /// Weight-space offset added to the next sample.
    pub offset: f64,
    /// Rotation the wheel rests at, in `[0, 360)`.
    pub last_rotation: f64,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            offset: INITIAL_OFFSET,
            last_rotation: 0.0,
        }
    }
}

/// Animation parameters for spins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinSettings {
    /// Time between start and settle.
    pub duration_ms: u64,
    /// Full turns added to every spin.
    pub turns: u32,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_SPIN_DURATION_MS,
            turns: DEFAULT_SPIN_TURNS,
        }
    }
}

/// Observable spin phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinPhase {
    /// No spin in flight; a draw may start.
    Idle,
    /// A spin is animating; its consequences are pending.
    Spinning {
        /// Token of the spin in flight.
        token: SpinToken,
    },
}

/// A drawn but not yet settled spin.
#[derive(Debug, Clone, PartialEq)]
struct PendingSpin {
    token: SpinToken,
    winner_index: usize,
    winner_name: String,
    policy: DepletionPolicy,
}

/// Everything the renderer needs to animate a spin that just started.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinTicket {
    /// Token to settle the spin with.
    pub token: SpinToken,
    /// Pool index of the winner.
    pub winner_index: usize,
    /// Name of the winner.
    pub winner_name: String,
    /// Rotation instructions.
    pub plan: SpinPlan,
    /// Animation length.
    pub duration_ms: u64,
    /// CSS easing curve for the animation.
    pub easing: &'static str,
    /// When the spin started.
    pub started_at: DateTime<Utc>,
    /// When the spin is due to settle.
    pub settles_at: DateTime<Utc>,
}

/// Consequences applied when a spin settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    /// Token of the settled spin.
    pub token: SpinToken,
    /// Pool index of the winner.
    pub winner_index: usize,
    /// Name appended to the winner log.
    pub winner_name: String,
    /// Winner's weight after depletion.
    pub remaining_weight: u32,
    /// Policy that was applied.
    pub policy: DepletionPolicy,
}

/// The aggregate root for one wheel.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) pool: Vec<Item>,
    pub(crate) policy: DepletionPolicy,
    pub(crate) draw_state: DrawState,
    pub(crate) winners: Vec<String>,
    pending: Option<PendingSpin>,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session in its initial epoch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            policy: DepletionPolicy::default(),
            draw_state: DrawState::default(),
            winners: Vec::new(),
            pending: None,
            generation: 0,
        }
    }

    /// Rebuilds a session from persisted parts. The restored session is idle.
    #[must_use]
    pub fn restore(
        pool: Vec<Item>,
        policy: DepletionPolicy,
        draw_state: DrawState,
        winners: Vec<String>,
    ) -> Self {
        Self {
            pool,
            policy,
            draw_state,
            winners,
            pending: None,
            generation: 0,
        }
    }

    /// Items in pool order.
    #[must_use]
    pub fn pool(&self) -> &[Item] {
        &self.pool
    }

    /// Active depletion policy.
    #[must_use]
    pub fn policy(&self) -> DepletionPolicy {
        self.policy
    }

    /// Offset and resting rotation.
    #[must_use]
    pub fn draw_state(&self) -> DrawState {
        self.draw_state
    }

    /// Winner names in the order they settled.
    #[must_use]
    pub fn winners(&self) -> &[String] {
        &self.winners
    }

    /// Current spin phase.
    #[must_use]
    pub fn phase(&self) -> SpinPhase {
        match &self.pending {
            Some(pending) => SpinPhase::Spinning {
                token: pending.token,
            },
            None => SpinPhase::Idle,
        }
    }

    /// Whether a spin is in flight.
    #[must_use]
    pub fn is_spinning(&self) -> bool {
        self.pending.is_some()
    }

    /// Spin generation counter; bumped by every spin and every invalidation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn invalidate_spin(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(token = %pending.token, "invalidated spin in flight");
        }
        self.generation += 1;
    }

    /// Appends a validated item and returns a copy of it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidItem` for an empty name or non-positive
    /// weight; the pool is left unchanged.
    pub fn add_item(&mut self, name: &str, weight: i64) -> Result<Item, DomainError> {
        let item = Item::new(name, weight)?;
        self.pool.push(item.clone());
        Ok(item)
    }

    /// Removes the item at `index`, invalidating any spin in flight.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ItemNotFound` if `index` is out of range.
    pub fn remove_item(&mut self, index: usize) -> Result<Item, DomainError> {
        if index >= self.pool.len() {
            return Err(DomainError::ItemNotFound(index));
        }
        self.invalidate_spin();
        Ok(self.pool.remove(index))
    }

    /// Empties the pool and the winner log and starts a new epoch.
    pub fn clear_all(&mut self) {
        self.invalidate_spin();
        self.pool.clear();
        self.winners.clear();
        self.draw_state = DrawState::default();
    }

    /// Restores every weight, clears the winner log and resets the offset.
    ///
    /// The resting rotation is re-derived from the reset offset so the wheel
    /// shows the pointer at the start of the new epoch.
    pub fn reset_winners(&mut self) {
        self.invalidate_spin();
        for item in &mut self.pool {
            item.restore();
        }
        self.winners.clear();
        let total = engine::total_weight(&self.pool);
        self.draw_state = DrawState {
            offset: INITIAL_OFFSET,
            last_rotation: angle::position_to_degrees(INITIAL_OFFSET, total),
        };
    }

    /// Flips the no-repeat toggle and returns the resulting policy.
    pub fn set_no_repeat(&mut self, enabled: bool) -> DepletionPolicy {
        self.policy = self.policy.with_no_repeat(enabled);
        self.policy
    }

    /// Flips the finite-pool toggle and returns the resulting policy.
    pub fn set_finite_pool(&mut self, enabled: bool) -> DepletionPolicy {
        self.policy = self.policy.with_finite_pool(enabled);
        self.policy
    }

    /// Draws a winner and moves the session into `Spinning`.
    ///
    /// The offset and resting rotation advance immediately. The winner's
    /// weight and the winner log are left alone until [`Session::settle`]
    /// is called with the returned token. The policy in force now is the one
    /// applied at settle time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrentDraw` if a spin is already in flight,
    /// `DomainError::EmptyPool` or `DomainError::NoAvailableItems` if nothing
    /// can be drawn. No state changes on error.
    pub fn start_spin(
        &mut self,
        settings: SpinSettings,
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
    ) -> Result<SpinTicket, DomainError> {
        if self.pending.is_some() {
            return Err(DomainError::ConcurrentDraw);
        }

        let draw = engine::draw(&self.pool, self.draw_state.offset, rng)?;
        let plan = angle::plan_spin(
            &self.pool,
            draw.winner_index,
            draw.cursor_start,
            self.draw_state.last_rotation,
            settings.turns,
            rng,
        )?;
        let winner_name = self.pool[draw.winner_index].name.clone();

        tracing::debug!(
            winner = %winner_name,
            sample = draw.sample,
            cursor = draw.cursor,
            total = draw.total,
            target = plan.target_position,
            "drew winner"
        );

        self.generation += 1;
        let token = SpinToken(self.generation);
        self.draw_state = DrawState {
            offset: draw.new_offset,
            last_rotation: plan.resting_degrees,
        };
        self.pending = Some(PendingSpin {
            token,
            winner_index: draw.winner_index,
            winner_name: winner_name.clone(),
            policy: self.policy,
        });

        let started_at = clock.now();
        let duration = i64::try_from(settings.duration_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX);
        let settles_at = started_at
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Ok(SpinTicket {
            token,
            winner_index: draw.winner_index,
            winner_name,
            plan,
            duration_ms: settings.duration_ms,
            easing: SPIN_EASING,
            started_at,
            settles_at,
        })
    }

    /// Applies the consequences of the spin identified by `token`: the
    /// winner's weight is depleted per the captured policy and its name is
    /// appended to the winner log.
    ///
    /// Returns `None`, changing nothing, if `token` is not the spin in
    /// flight (already settled, or superseded by a reset, clear or removal).
    pub fn settle(&mut self, token: SpinToken) -> Option<Settlement> {
        if self.pending.as_ref().map(|pending| pending.token) != Some(token) {
            return None;
        }
        let pending = self.pending.take()?;
        let winner = self.pool.get_mut(pending.winner_index)?;

        pending.policy.apply(winner);
        let remaining_weight = winner.weight;
        self.winners.push(pending.winner_name.clone());

        Some(Settlement {
            token,
            winner_index: pending.winner_index,
            winner_name: pending.winner_name,
            remaining_weight,
            policy: pending.policy,
        })
    }
}
