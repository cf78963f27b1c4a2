//! JSON persistence of calculator state on top of a [`KeyValueStore`].
//!
//! Storage problems never reach the user: unreadable data is treated as "no
//! saved data" and failed writes are logged and skipped.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::repository::KeyValueStore;
use crate::models::{CalculatorKind, CalculatorState};

/// Loads and decodes the blob under `key`.
///
/// Returns `None` when the key is absent, the store fails, or the blob does
/// not decode as `T`.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            warn!(key, %error, "failed to read saved data");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "ignoring malformed saved data");
            None
        }
    }
}

/// Encodes `value` and stores it under `key`.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) {
    match serde_json::to_string(value) {
        Ok(blob) => save_raw(store, key, &blob).await,
        Err(error) => warn!(key, %error, "failed to encode data for saving"),
    }
}

/// Stores an already encoded blob under `key`.
pub async fn save_raw(
    store: &dyn KeyValueStore,
    key: &str,
    blob: &str,
) {
    match store.put(key, blob).await {
        Ok(()) => debug!(key, bytes = blob.len(), "saved"),
        Err(error) => warn!(key, %error, "failed to save data"),
    }
}

pub async fn load_calculator_data(
    store: &dyn KeyValueStore,
    kind: CalculatorKind,
) -> Option<CalculatorState> {
    load_json(store, kind.storage_key()).await
}

pub async fn save_calculator_data(
    store: &dyn KeyValueStore,
    kind: CalculatorKind,
    state: &CalculatorState,
) {
    save_json(store, kind.storage_key(), state).await;
}

/// Removes the saved data of one calculator.
pub async fn clear_calculator_data(
    store: &dyn KeyValueStore,
    kind: CalculatorKind,
) {
    if let Err(error) = store.remove(kind.storage_key()).await {
        warn!(key = kind.storage_key(), %error, "failed to clear saved data");
    }
}

/// Removes the saved data of every calculator, continuing past failures.
pub async fn clear_all_calculator_data(store: &dyn KeyValueStore) {
    for kind in CalculatorKind::ALL {
        clear_calculator_data(store, kind).await;
    }
}
