//! Command handlers for the draw context.
//!
//! Each handler applies a command to a working copy of the session, persists
//! the copy and only then commits it. A failed save leaves the caller's
//! session exactly as it was.

use std::sync::Mutex;

use tracing::{debug, info};
use wheel_core::clock::Clock;
use wheel_core::command::Command;
use wheel_core::error::DomainError;
use wheel_core::rng::DeterministicRng;
use wheel_core::store::KeyValueStore;

use crate::application::snapshot::save_session;
use crate::domain::commands::{
    AddItem, ClearAll, RemoveItem, ResetWinners, SetFinitePool, SetNoRepeat, SettleSpin,
    StartSpin,
};
use crate::domain::item::Item;
use crate::domain::policy::DepletionPolicy;
use crate::domain::session::{Session, Settlement, SpinSettings, SpinTicket};

async fn commit(
    session: &mut Session,
    working: Session,
    store: &dyn KeyValueStore,
) -> Result<(), DomainError> {
    save_session(&working, store).await?;
    *session = working;
    Ok(())
}

/// Handles the `AddItem` command: validates and appends the item, then
/// persists the session.
///
/// # Errors
///
/// Returns `DomainError::InvalidItem` for a blank name or non-positive weight,
/// or `DomainError::Infrastructure` if the save fails.
pub async fn handle_add_item(
    command: &AddItem,
    session: &mut Session,
    store: &dyn KeyValueStore,
) -> Result<Item, DomainError> {
    info!(command = command.command_type(), name = %command.name, weight = command.weight);

    let mut working = session.clone();
    let item = working.add_item(&command.name, command.weight)?;
    commit(session, working, store).await?;
    Ok(item)
}

/// Handles the `RemoveItem` command.
///
/// # Errors
///
/// Returns `DomainError::ItemNotFound` for an out-of-range index, or
/// `DomainError::Infrastructure` if the save fails.
pub async fn handle_remove_item(
    command: &RemoveItem,
    session: &mut Session,
    store: &dyn KeyValueStore,
) -> Result<Item, DomainError> {
    info!(command = command.command_type(), index = command.index);

    let mut working = session.clone();
    let removed = working.remove_item(command.index)?;
    commit(session, working, store).await?;
    Ok(removed)
}

/// Handles the `ClearAll` command.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the save fails.
pub async fn handle_clear_all(
    command: &ClearAll,
    session: &mut Session,
    store: &dyn KeyValueStore,
) -> Result<(), DomainError> {
    info!(command = command.command_type());

    let mut working = session.clone();
    working.clear_all();
    commit(session, working, store).await
}

/// Handles the `ResetWinners` command.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the save fails.
pub async fn handle_reset_winners(
    command: &ResetWinners,
    session: &mut Session,
    store: &dyn KeyValueStore,
) -> Result<(), DomainError> {
    info!(command = command.command_type());

    let mut working = session.clone();
    working.reset_winners();
    commit(session, working, store).await
}

/// Handles the `SetNoRepeat` command and returns the resulting policy.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the save fails.
pub async fn handle_set_no_repeat(
    command: &SetNoRepeat,
    session: &mut Session,
    store: &dyn KeyValueStore,
) -> Result<DepletionPolicy, DomainError> {
    info!(command = command.command_type(), enabled = command.enabled);

    let mut working = session.clone();
    let policy = working.set_no_repeat(command.enabled);
    commit(session, working, store).await?;
    Ok(policy)
}

/// Handles the `SetFinitePool` command and returns the resulting policy.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the save fails.
pub async fn handle_set_finite_pool(
    command: &SetFinitePool,
    session: &mut Session,
    store: &dyn KeyValueStore,
) -> Result<DepletionPolicy, DomainError> {
    info!(command = command.command_type(), enabled = command.enabled);

    let mut working = session.clone();
    let policy = working.set_finite_pool(command.enabled);
    commit(session, working, store).await?;
    Ok(policy)
}

/// Handles the `StartSpin` command: draws a winner, persists the advanced
/// offset and resting rotation, and returns the ticket the caller animates
/// and later settles.
///
/// The `Mutex` is locked only around the synchronous draw so the guard is
/// never held across an await.
///
/// # Errors
///
/// Returns `DomainError::ConcurrentDraw`, `DomainError::EmptyPool` or
/// `DomainError::NoAvailableItems` from the draw, or
/// `DomainError::Infrastructure` if the RNG mutex is poisoned or the save
/// fails.
pub async fn handle_start_spin(
    command: &StartSpin,
    session: &mut Session,
    settings: SpinSettings,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &dyn KeyValueStore,
) -> Result<SpinTicket, DomainError> {
    info!(command = command.command_type());

    let mut working = session.clone();
    let ticket = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        working.start_spin(settings, clock, &mut *rng_guard)?
    };

    commit(session, working, store).await?;
    info!(token = %ticket.token, winner = %ticket.winner_name, "spin started");
    Ok(ticket)
}

/// Handles the `SettleSpin` command.
///
/// Returns `Ok(None)` without touching the store when the token is stale;
/// settling is idempotent.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the save fails, in which case the
/// spin stays pending and may be settled again.
pub async fn handle_settle_spin(
    command: &SettleSpin,
    session: &mut Session,
    store: &dyn KeyValueStore,
) -> Result<Option<Settlement>, DomainError> {
    info!(command = command.command_type(), token = %command.token);

    let mut working = session.clone();
    let Some(settlement) = working.settle(command.token) else {
        debug!(token = %command.token, "ignored stale settle");
        return Ok(None);
    };

    commit(session, working, store).await?;
    info!(
        winner = %settlement.winner_name,
        remaining_weight = settlement.remaining_weight,
        "spin settled"
    );
    Ok(Some(settlement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wheel_test_support::{FailingStore, FixedClock, MockRng, RecordingStore, SequenceRng};

    use crate::application::snapshot::{POOL_KEY, WINNERS_KEY, load_session};
    use crate::domain::session::SpinPhase;

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn add(name: &str, weight: i64) -> AddItem {
        AddItem {
            name: name.to_owned(),
            weight,
        }
    }

    async fn seeded(store: &RecordingStore, items: &[(&str, i64)]) -> Session {
        let mut session = Session::new();
        for (name, weight) in items {
            handle_add_item(&add(name, *weight), &mut session, store)
                .await
                .unwrap();
        }
        session
    }

    async fn start(session: &mut Session, store: &dyn KeyValueStore) -> SpinTicket {
        let rng: Mutex<MockRng> = Mutex::new(MockRng);
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;
        handle_start_spin(
            &StartSpin,
            session,
            SpinSettings::default(),
            &fixed_clock(),
            rng_ref,
            store,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_handle_add_item_persists_trimmed_item() {
        let store = RecordingStore::new();
        let mut session = Session::new();

        let item = handle_add_item(&add("  Alice ", 3), &mut session, &store)
            .await
            .unwrap();

        assert_eq!(item.name, "Alice");
        assert_eq!(session.pool().len(), 1);
        assert_eq!(
            store.get(POOL_KEY).as_deref(),
            Some(r#"[{"name":"Alice","weight":3,"originalWeight":3}]"#)
        );
    }

    #[tokio::test]
    async fn test_handle_add_item_invalid_does_not_save() {
        let store = RecordingStore::new();
        let mut session = Session::new();

        let result = handle_add_item(&add("   ", 3), &mut session, &store).await;

        assert!(matches!(result, Err(DomainError::InvalidItem(_))));
        assert_eq!(store.save_count(), 0);
        assert!(session.pool().is_empty());
    }

    #[tokio::test]
    async fn test_failing_store_leaves_session_unchanged() {
        let mut session = Session::new();

        let result = handle_add_item(&add("A", 1), &mut session, &FailingStore).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(session.pool().is_empty());
    }

    #[tokio::test]
    async fn test_handle_remove_item_out_of_range_returns_not_found() {
        let store = RecordingStore::new();
        let mut session = seeded(&store, &[("A", 1)]).await;

        let result = handle_remove_item(&RemoveItem { index: 3 }, &mut session, &store).await;

        assert!(matches!(result, Err(DomainError::ItemNotFound(3))));
        assert_eq!(session.pool().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_start_spin_persists_draw_state_but_not_winner() {
        let store = RecordingStore::new();
        let mut session = seeded(&store, &[("A", 3), ("B", 1)]).await;
        let rng: Mutex<SequenceRng> =
            Mutex::new(SequenceRng::new(vec![0]).with_fractions(vec![0.75]));
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;

        let ticket = handle_start_spin(
            &StartSpin,
            &mut session,
            SpinSettings::default(),
            &fixed_clock(),
            rng_ref,
            &store,
        )
        .await
        .unwrap();

        assert_eq!(ticket.winner_name, "B");
        assert_eq!(session.phase(), SpinPhase::Spinning { token: ticket.token });

        let persisted = load_session(&store).await.unwrap();
        assert!((persisted.draw_state().offset - 3.5).abs() < f64::EPSILON);
        assert!(persisted.winners().is_empty());
        assert!(!persisted.is_spinning());
    }

    #[tokio::test]
    async fn test_handle_start_spin_with_failing_store_stays_idle() {
        let store = RecordingStore::new();
        let mut session = seeded(&store, &[("A", 1), ("B", 1)]).await;
        let rng: Mutex<MockRng> = Mutex::new(MockRng);
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;

        let result = handle_start_spin(
            &StartSpin,
            &mut session,
            SpinSettings::default(),
            &fixed_clock(),
            rng_ref,
            &FailingStore,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert_eq!(session.phase(), SpinPhase::Idle);
        assert!((session.draw_state().offset - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_handle_start_spin_on_empty_pool_returns_error() {
        let store = RecordingStore::new();
        let mut session = Session::new();
        let rng: Mutex<MockRng> = Mutex::new(MockRng);
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;

        let result = handle_start_spin(
            &StartSpin,
            &mut session,
            SpinSettings::default(),
            &fixed_clock(),
            rng_ref,
            &store,
        )
        .await;

        assert!(matches!(result, Err(DomainError::EmptyPool)));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_settle_spin_persists_winner_and_depletion() {
        let store = RecordingStore::new();
        let mut session = seeded(&store, &[("A", 2), ("B", 2)]).await;
        handle_set_finite_pool(&SetFinitePool { enabled: true }, &mut session, &store)
            .await
            .unwrap();
        let ticket = start(&mut session, &store).await;

        let settlement = handle_settle_spin(
            &SettleSpin {
                token: ticket.token,
            },
            &mut session,
            &store,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(settlement.winner_name, "A");
        assert_eq!(settlement.remaining_weight, 1);
        assert_eq!(store.get(WINNERS_KEY).as_deref(), Some(r#"["A"]"#));
    }

    #[tokio::test]
    async fn test_handle_settle_spin_twice_saves_once() {
        let store = RecordingStore::new();
        let mut session = seeded(&store, &[("A", 2)]).await;
        let ticket = start(&mut session, &store).await;
        let command = SettleSpin {
            token: ticket.token,
        };

        assert!(
            handle_settle_spin(&command, &mut session, &store)
                .await
                .unwrap()
                .is_some()
        );
        let saves = store.save_count();
        assert!(
            handle_settle_spin(&command, &mut session, &store)
                .await
                .unwrap()
                .is_none()
        );

        assert_eq!(store.save_count(), saves);
        assert_eq!(session.winners().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_reset_winners_invalidates_pending_spin() {
        let store = RecordingStore::new();
        let mut session = seeded(&store, &[("A", 2), ("B", 2)]).await;
        let ticket = start(&mut session, &store).await;

        handle_reset_winners(&ResetWinners, &mut session, &store)
            .await
            .unwrap();
        let settled = handle_settle_spin(
            &SettleSpin {
                token: ticket.token,
            },
            &mut session,
            &store,
        )
        .await
        .unwrap();

        assert!(settled.is_none());
        assert!(session.winners().is_empty());
    }

    #[tokio::test]
    async fn test_handle_clear_all_empties_persisted_pool() {
        let store = RecordingStore::new();
        let mut session = seeded(&store, &[("A", 2), ("B", 2)]).await;

        handle_clear_all(&ClearAll, &mut session, &store)
            .await
            .unwrap();

        assert!(session.pool().is_empty());
        assert_eq!(store.get(POOL_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_handle_toggles_return_resulting_policy() {
        let store = RecordingStore::new();
        let mut session = Session::new();

        let policy = handle_set_finite_pool(&SetFinitePool { enabled: true }, &mut session, &store)
            .await
            .unwrap();
        assert_eq!(policy, DepletionPolicy::FinitePool);

        let policy = handle_set_no_repeat(&SetNoRepeat { enabled: true }, &mut session, &store)
            .await
            .unwrap();
        assert_eq!(policy, DepletionPolicy::NoRepeat);

        let policy = handle_set_no_repeat(&SetNoRepeat { enabled: false }, &mut session, &store)
            .await
            .unwrap();
        assert_eq!(policy, DepletionPolicy::Unlimited);
        assert_eq!(store.get("finitePoolEnabled").as_deref(), Some("false"));
    }
}
