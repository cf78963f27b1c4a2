//! Debounced saving.
//!
//! Every edit schedules a write of the latest state after a short delay. A
//! newer schedule cancels the older pending write, so a burst of keystrokes
//! produces one write carrying the last state.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use super::persistence::save_raw;
use super::repository::KeyValueStore;
use crate::models::CalculatorKind;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

struct PendingWrite {
    blob: String,
    task: JoinHandle<()>,
}

/// Owns at most one pending write for a single storage key.
///
/// Scheduling spawns onto the current tokio runtime and panics outside one.
/// Dropping the autosaver cancels a write that has not started yet; call
/// [`Autosaver::flush`] first to keep it.
pub struct Autosaver {
    store: Arc<dyn KeyValueStore>,
    key: String,
    delay: Duration,
    pending: Option<PendingWrite>,
}

impl Autosaver {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            delay,
            pending: None,
        }
    }

    pub fn for_calculator(
        store: Arc<dyn KeyValueStore>,
        kind: CalculatorKind,
        delay: Duration,
    ) -> Self {
        Self::new(store, kind.storage_key(), delay)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Snapshots `value` and writes it once the delay elapses without
    /// another call.
    pub fn schedule<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) {
        let blob = match serde_json::to_string(value) {
            Ok(blob) => blob,
            Err(error) => {
                warn!(key = %self.key, %error, "failed to encode data for saving");
                return;
            }
        };

        if let Some(previous) = self.pending.take() {
            previous.task.abort();
            trace!(key = %self.key, "superseded pending save");
        }

        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let delay = self.delay;
        let task_blob = blob.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            save_raw(store.as_ref(), &key, &task_blob).await;
        });

        self.pending = Some(PendingWrite { blob, task });
    }

    /// Whether a scheduled write has not completed yet.
    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.task.is_finished())
    }

    /// Writes the pending state now instead of waiting for the delay.
    pub async fn flush(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.task.is_finished() {
            return;
        }
        pending.task.abort();
        save_raw(self.store.as_ref(), &self.key, &pending.blob).await;
    }

    /// Drops the pending write without saving it.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.cancel();
    }
}
