//! Routes for the wheel: pool editing, policy toggles and spins.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use wheel_core::error::DomainError;
use wheel_draw::application::command_handlers;
use wheel_draw::application::query_handlers::{self, WheelView};
use wheel_draw::domain::commands;
use wheel_draw::domain::session::{Session, Settlement, SpinTicket, SpinToken};

use crate::error::ApiError;
use crate::settle::schedule_settle;
use crate::state::AppState;

/// Weight as sent by a form: either a JSON number or the raw text field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WeightInput {
    /// Already numeric.
    Number(i64),
    /// Text to be parsed as an integer.
    Text(String),
    /// Anything else: floats, booleans, integers wider than `i64`.
    Other(serde_json::Value),
}

impl WeightInput {
    fn parse(&self) -> Result<i64, DomainError> {
        match self {
            Self::Number(weight) => Ok(*weight),
            Self::Text(raw) => raw.trim().parse().map_err(|_| {
                DomainError::InvalidItem(format!("weight must be a positive integer, got {raw:?}"))
            }),
            Self::Other(value) => Err(DomainError::InvalidItem(format!(
                "weight must be a positive integer, got {value}"
            ))),
        }
    }
}

/// Request body for POST /items.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    /// Display name.
    pub name: String,
    /// Positive weight.
    pub weight: WeightInput,
}

/// Request body for the policy toggles.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    /// New toggle state.
    pub enabled: bool,
}

/// Response body for POST /spin/{token}/settle.
#[derive(Debug, Serialize)]
pub struct SettleResponse {
    /// Whether this request applied the spin's consequences.
    pub settled: bool,
    /// What was applied, if anything.
    pub settlement: Option<Settlement>,
}

fn render(state: &AppState, session: &Session) -> Result<Json<WheelView>, ApiError> {
    let mut rng = state
        .rng
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
    Ok(Json(query_handlers::get_wheel(session, &mut *rng)))
}

/// GET /
#[instrument(skip(state))]
async fn get_wheel(State(state): State<AppState>) -> Result<Json<WheelView>, ApiError> {
    let session = state.session.lock().await;
    render(&state, &session)
}

/// POST /items
#[instrument(skip(state, request), fields(name = %request.name))]
async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<WheelView>), ApiError> {
    let command = commands::AddItem {
        weight: request.weight.parse()?,
        name: request.name,
    };

    let mut session = state.session.lock().await;
    let item =
        command_handlers::handle_add_item(&command, &mut session, state.store.as_ref()).await?;
    info!(name = %item.name, weight = item.weight, "item added");

    Ok((StatusCode::CREATED, render(&state, &session)?))
}

/// DELETE /items/{index}
#[instrument(skip(state))]
async fn remove_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<WheelView>, ApiError> {
    let command = commands::RemoveItem { index };

    let mut session = state.session.lock().await;
    let removed =
        command_handlers::handle_remove_item(&command, &mut session, state.store.as_ref()).await?;
    info!(name = %removed.name, "item removed");

    render(&state, &session)
}

/// DELETE /items
#[instrument(skip(state))]
async fn clear_all(State(state): State<AppState>) -> Result<Json<WheelView>, ApiError> {
    let mut session = state.session.lock().await;
    command_handlers::handle_clear_all(&commands::ClearAll, &mut session, state.store.as_ref())
        .await?;

    render(&state, &session)
}

/// POST /spin
#[instrument(skip(state))]
async fn start_spin(State(state): State<AppState>) -> Result<Json<SpinTicket>, ApiError> {
    let ticket = {
        let mut session = state.session.lock().await;
        command_handlers::handle_start_spin(
            &commands::StartSpin,
            &mut session,
            state.spin,
            state.clock.as_ref(),
            &state.rng,
            state.store.as_ref(),
        )
        .await?
    };

    schedule_settle(
        state.clone(),
        ticket.token,
        Duration::from_millis(ticket.duration_ms),
    );

    Ok(Json(ticket))
}

/// POST /spin/{token}/settle
#[instrument(skip(state))]
async fn settle_spin(
    State(state): State<AppState>,
    Path(token): Path<u64>,
) -> Result<Json<SettleResponse>, ApiError> {
    let command = commands::SettleSpin {
        token: SpinToken(token),
    };

    let mut session = state.session.lock().await;
    let settlement =
        command_handlers::handle_settle_spin(&command, &mut session, state.store.as_ref()).await?;

    Ok(Json(SettleResponse {
        settled: settlement.is_some(),
        settlement,
    }))
}

/// POST /winners/reset
#[instrument(skip(state))]
async fn reset_winners(State(state): State<AppState>) -> Result<Json<WheelView>, ApiError> {
    let mut session = state.session.lock().await;
    command_handlers::handle_reset_winners(
        &commands::ResetWinners,
        &mut session,
        state.store.as_ref(),
    )
    .await?;

    render(&state, &session)
}

/// PUT /policy/no-repeat
#[instrument(skip(state, request), fields(enabled = request.enabled))]
async fn set_no_repeat(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<WheelView>, ApiError> {
    let command = commands::SetNoRepeat {
        enabled: request.enabled,
    };

    let mut session = state.session.lock().await;
    command_handlers::handle_set_no_repeat(&command, &mut session, state.store.as_ref()).await?;

    render(&state, &session)
}

/// PUT /policy/finite-pool
#[instrument(skip(state, request), fields(enabled = request.enabled))]
async fn set_finite_pool(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<WheelView>, ApiError> {
    let command = commands::SetFinitePool {
        enabled: request.enabled,
    };

    let mut session = state.session.lock().await;
    command_handlers::handle_set_finite_pool(&command, &mut session, state.store.as_ref())
        .await?;

    render(&state, &session)
}

/// Returns the router for the wheel.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wheel))
        .route("/items", post(add_item).delete(clear_all))
        .route("/items/{index}", delete(remove_item))
        .route("/spin", post(start_spin))
        .route("/spin/{token}/settle", post(settle_spin))
        .route("/winners/reset", post(reset_winners))
        .route("/policy/no-repeat", put(set_no_repeat))
        .route("/policy/finite-pool", put(set_finite_pool))
}
