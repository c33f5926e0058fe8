//! Animation controller: settles a spin once its animation has run.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use wheel_draw::application::command_handlers;
use wheel_draw::domain::commands::SettleSpin;
use wheel_draw::domain::session::SpinToken;

use crate::state::AppState;

/// Spawns a task that waits `after` and then settles the spin identified by
/// `token`.
///
/// If the spin was already settled through the API, or was invalidated by a
/// reset, clear or removal in the meantime, the task changes nothing. A
/// failed save is logged and leaves the spin pending, so a later settle
/// request can retry it.
pub fn schedule_settle(state: AppState, token: SpinToken, after: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;

        let mut session = state.session.lock().await;
        let command = SettleSpin { token };
        match command_handlers::handle_settle_spin(&command, &mut session, state.store.as_ref())
            .await
        {
            Ok(Some(settlement)) => {
                debug!(token = %token, winner = %settlement.winner_name, "timer settled spin");
            }
            Ok(None) => debug!(token = %token, "spin already settled or invalidated"),
            Err(e) => warn!(token = %token, error = %e, "failed to persist settled spin"),
        }
    })
}
