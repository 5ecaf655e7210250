//! Serialization Codec
//!
//! JSON encoding for cached values and the on-disk record layout.
//!
//! A disk record embeds the write time next to the payload:
//!
//! ```text
//! {"stored_at":"2026-01-01T00:00:00Z","payload":<payload JSON, verbatim>}
//! ```

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{CacheError, Result};

/// Serializes a value to its cached byte form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserializes cached bytes back into a value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[derive(Serialize)]
struct RecordOut<'a> {
    stored_at: DateTime<Utc>,
    payload: &'a RawValue,
}

#[derive(Deserialize)]
struct RecordIn<'a> {
    stored_at: DateTime<Utc>,
    #[serde(borrow)]
    payload: &'a RawValue,
}

/// Validates an encoded JSON payload and returns it in the exact form a disk
/// record stores, so both tiers hold the same bytes.
///
/// Surrounding whitespace is dropped; everything inside is kept verbatim.
/// Fails with `Codec` when the payload is not UTF-8 JSON.
pub fn normalize(payload: &[u8]) -> Result<Vec<u8>> {
    let raw: &RawValue = serde_json::from_slice(payload)?;
    Ok(raw.get().as_bytes().to_vec())
}

/// Wraps a JSON payload and its write time into a disk record.
///
/// Fails with `Codec` when the payload is not UTF-8 JSON.
pub fn encode_record(payload: &[u8], stored_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let raw: &RawValue = serde_json::from_slice(payload)?;
    Ok(serde_json::to_vec(&RecordOut {
        stored_at,
        payload: raw,
    })?)
}

/// Splits a disk record into its payload bytes and write time.
///
/// Any malformed record is reported as `Decode`.
pub fn decode_record(bytes: &[u8]) -> Result<(Vec<u8>, DateTime<Utc>)> {
    let record: RecordIn<'_> =
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;
    Ok((record.payload.get().as_bytes().to_vec(), record.stored_at))
}
