//! Versioned slot envelopes.
//!
//! Current payloads are stored as `{"version": 1, "data": ...}`. Anything
//! without a `version` field predates the envelope and is handed back raw so
//! the owning store can migrate it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct EnvelopeRef<'a, T> { version: u32, data: &'a T }

#[derive(Debug, Deserialize)]
struct Envelope { version: u32, data: Value }

#[derive(Debug)]
pub enum Decoded<T> {
    Current(T),
    /// Unversioned payload written before envelopes existed.
    Legacy(Value),
}

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("malformed slot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported slot version {0}")]
    UnsupportedVersion(u32),
}

pub fn encode<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef { version: SCHEMA_VERSION, data })
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<Decoded<T>, SlotError> {
    let value: Value = serde_json::from_str(raw)?;
    let versioned = value.as_object().is_some_and(|o| o.contains_key("version"));
    if !versioned { return Ok(Decoded::Legacy(value)); }
    let envelope: Envelope = serde_json::from_value(value)?;
    match envelope.version {
        SCHEMA_VERSION => Ok(Decoded::Current(serde_json::from_value(envelope.data)?)),
        other => Err(SlotError::UnsupportedVersion(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_envelope() {
        let raw = encode(&vec![1, 2, 3]).unwrap();
        assert_eq!(raw, r#"{"version":1,"data":[1,2,3]}"#);
        assert!(matches!(decode::<Vec<u32>>(&raw).unwrap(), Decoded::Current(v) if v == vec![1, 2, 3]));
    }

    #[test]
    fn test_legacy_and_broken_payloads() {
        assert!(matches!(decode::<Vec<u32>>("[1,2]").unwrap(), Decoded::Legacy(Value::Array(_))));
        assert!(matches!(decode::<Vec<u32>>("1700000000000").unwrap(), Decoded::Legacy(Value::Number(_))));
        assert!(matches!(decode::<Vec<u32>>("not json {"), Err(SlotError::Malformed(_))));
        assert!(matches!(decode::<Vec<u32>>(r#"{"version":9,"data":[]}"#), Err(SlotError::UnsupportedVersion(9))));
        assert!(matches!(decode::<Vec<u32>>(r#"{"version":1,"data":"nope"}"#), Err(SlotError::Malformed(_))));
    }
}
