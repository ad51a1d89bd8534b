//! Customer profile store. Only prefills later checkouts; never submits.

use tracing::{debug, warn};

use crate::domain::aggregates::{CustomerProfile, CustomerRecord, ProfileField};
use crate::storage::slot::{self, Decoded};
use crate::storage::SharedStorage;

#[derive(Clone)]
pub struct CustomerProfileStore { storage: SharedStorage, key: String }

impl CustomerProfileStore {
    pub fn new(storage: SharedStorage, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    /// Saved contact fields, or an empty profile when none or corrupt.
    pub fn load(&self) -> CustomerProfile {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CustomerProfile::default(),
            Err(e) => { warn!(error = %e, "profile slot unreadable"); return CustomerProfile::default(); }
        };
        let profile = match slot::decode::<CustomerProfile>(&raw) {
            Ok(Decoded::Current(profile)) => Ok(profile),
            Ok(Decoded::Legacy(value)) => serde_json::from_value(value).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        profile.unwrap_or_else(|reason| {
            warn!(key = %self.key, %reason, "discarding corrupt profile slot");
            CustomerProfile::default()
        })
    }

    /// Overwrites every saved field.
    pub fn save(&self, profile: &CustomerProfile) {
        let result = slot::encode(profile)
            .map_err(|source| crate::storage::StorageError::Encode { key: self.key.clone(), source })
            .and_then(|raw| self.storage.write(&self.key, &raw));
        match result {
            Ok(()) => debug!(key = %self.key, "profile saved"),
            Err(e) => warn!(error = %e, "failed to persist profile"),
        }
    }

    pub fn save_record(&self, record: &CustomerRecord) { self.save(&CustomerProfile::from(record)); }

    /// Keeps one field as the customer edits it, leaving the others alone.
    pub fn remember(&self, field: ProfileField, value: &str) {
        let mut profile = self.load();
        profile.set(field, value);
        self.save(&profile);
    }
}
