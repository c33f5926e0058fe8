//! Mapping between a `Session` and the key-value store.
//!
//! Each part of the session lives under its own key so that external tools
//! reading the store see the familiar layout:
//!
//! | key                 | value                                             |
//! |---------------------|---------------------------------------------------|
//! | `pool`              | JSON array of `{name, weight, originalWeight}`    |
//! | `noRepeatEnabled`   | JSON boolean                                      |
//! | `finitePoolEnabled` | JSON boolean                                      |
//! | `winners`           | JSON array of names                               |
//! | `drawState`         | JSON object `{offset, lastRotation}`              |
//!
//! The spin in flight is never persisted; a restarted session is idle.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use wheel_core::error::DomainError;
use wheel_core::store::KeyValueStore;

use crate::domain::engine::INITIAL_OFFSET;
use crate::domain::item::Item;
use crate::domain::policy::DepletionPolicy;
use crate::domain::session::{DrawState, Session};

/// Key of the serialized pool.
pub const POOL_KEY: &str = "pool";
/// Key of the no-repeat toggle.
pub const NO_REPEAT_KEY: &str = "noRepeatEnabled";
/// Key of the finite-pool toggle.
pub const FINITE_POOL_KEY: &str = "finitePoolEnabled";
/// Key of the winner log.
pub const WINNERS_KEY: &str = "winners";
/// Key of the offset and resting rotation.
pub const DRAW_STATE_KEY: &str = "drawState";

/// Stored item shape. Older stores may lack `originalWeight`, or carry a
/// zero there; either way the current weight stands in for it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    name: String,
    weight: u32,
    #[serde(default)]
    original_weight: Option<u32>,
}

impl From<StoredItem> for Item {
    fn from(stored: StoredItem) -> Self {
        let original_weight = match stored.original_weight {
            Some(original) if original > 0 => original,
            _ => stored.weight,
        };
        Self {
            name: stored.name,
            weight: stored.weight,
            original_weight,
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, DomainError> {
    serde_json::from_str(raw)
        .map_err(|e| DomainError::Infrastructure(format!("stored {key} is malformed: {e}")))
}

fn encode<T: serde::Serialize + ?Sized>(key: &str, value: &T) -> Result<String, DomainError> {
    serde_json::to_string(value)
        .map_err(|e| DomainError::Infrastructure(format!("could not encode {key}: {e}")))
}

async fn load_key<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, DomainError> {
    match store.load(key).await? {
        Some(raw) => decode(key, &raw).map(Some),
        None => Ok(None),
    }
}

fn sanitize(state: DrawState) -> DrawState {
    let offset = if state.offset.is_finite() && state.offset >= 0.0 {
        state.offset
    } else {
        INITIAL_OFFSET
    };
    let last_rotation = if state.last_rotation.is_finite() {
        state.last_rotation.rem_euclid(360.0)
    } else {
        0.0
    };
    DrawState {
        offset,
        last_rotation,
    }
}

/// Builds a session from whatever the store holds. Missing keys fall back to
/// the defaults of a fresh session.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails or a stored value
/// cannot be decoded.
pub async fn load_session(store: &dyn KeyValueStore) -> Result<Session, DomainError> {
    let pool: Vec<StoredItem> = load_key(store, POOL_KEY).await?.unwrap_or_default();
    let no_repeat: bool = load_key(store, NO_REPEAT_KEY).await?.unwrap_or(false);
    let finite_pool: bool = load_key(store, FINITE_POOL_KEY).await?.unwrap_or(false);
    let winners: Vec<String> = load_key(store, WINNERS_KEY).await?.unwrap_or_default();
    let draw_state: DrawState = load_key(store, DRAW_STATE_KEY)
        .await?
        .map(sanitize)
        .unwrap_or_default();

    Ok(Session::restore(
        pool.into_iter().map(Item::from).collect(),
        DepletionPolicy::from_flags(no_repeat, finite_pool),
        draw_state,
        winners,
    ))
}

/// Writes every part of the session to the store in one batch.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if encoding or the store fails.
pub async fn save_session(
    session: &Session,
    store: &dyn KeyValueStore,
) -> Result<(), DomainError> {
    let policy = session.policy();
    let entries = [
        (POOL_KEY, encode(POOL_KEY, session.pool())?),
        (NO_REPEAT_KEY, encode(NO_REPEAT_KEY, &policy.no_repeat_enabled())?),
        (FINITE_POOL_KEY, encode(FINITE_POOL_KEY, &policy.finite_pool_enabled())?),
        (WINNERS_KEY, encode(WINNERS_KEY, session.winners())?),
        (DRAW_STATE_KEY, encode(DRAW_STATE_KEY, &session.draw_state())?),
    ];
    store.save_all(&entries).await
}
