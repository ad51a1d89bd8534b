//! Order completion marker: when the last order was handed off, so a
//! returning visitor sees the thank-you notice within the window.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::storage::slot::{self, Decoded};
use crate::storage::SharedStorage;

pub const DEFAULT_ACK_WINDOW_MINS: i64 = 30;

#[derive(Clone)]
pub struct CompletionMarkerStore { storage: SharedStorage, key: String, window: Duration }

impl CompletionMarkerStore {
    pub fn new(storage: SharedStorage, key: impl Into<String>) -> Self {
        Self { storage, key: key.into(), window: Duration::minutes(DEFAULT_ACK_WINDOW_MINS) }
    }

    pub fn with_window(mut self, window: Duration) -> Self { self.window = window; self }

    pub fn record(&self, at: DateTime<Utc>) {
        let result = slot::encode(&at)
            .map_err(|source| crate::storage::StorageError::Encode { key: self.key.clone(), source })
            .and_then(|raw| self.storage.write(&self.key, &raw));
        if let Err(e) = result { warn!(error = %e, "failed to record order completion"); }
    }

    pub fn get(&self) -> Option<DateTime<Utc>> {
        let raw = match self.storage.read(&self.key) {
            Ok(raw) => raw?,
            Err(e) => { warn!(error = %e, "completion marker unreadable"); return None; }
        };
        match slot::decode::<DateTime<Utc>>(&raw) {
            Ok(Decoded::Current(at)) => Some(at),
            Ok(Decoded::Legacy(value)) => legacy_millis(&value),
            Err(e) => { debug!(reason = %e, "ignoring corrupt completion marker"); None }
        }
    }

    /// The marker when it is younger than the window. Expired or corrupt
    /// markers are cleared on the way.
    pub fn pending_acknowledgment(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.get() {
            Some(at) if now.signed_duration_since(at) < self.window => Some(at),
            _ => { self.acknowledge(); None }
        }
    }

    pub fn acknowledge(&self) {
        if let Err(e) = self.storage.remove(&self.key) { warn!(error = %e, "failed to clear completion marker"); }
    }
}

/// Before envelopes the slot held epoch milliseconds, as a number or a string.
fn legacy_millis(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    DateTime::<Utc>::from_timestamp_millis(millis)
}
