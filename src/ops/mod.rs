//! Operation layer: one function per catalog operation.
//!
//! Both front doors call only this layer. Each operation takes a flat
//! request struct (every field optional at the serde level, so malformed
//! calls fail here with an envelope instead of a transport fault), applies
//! defaults, validates, talks to the store and returns its success payload.
//! The transports wrap payloads with [`success_envelope`] / map [`OpError`]
//! through [`error_envelope`].

pub mod emails;
pub mod follow_ups;
pub mod leads;
pub mod meetings;
pub mod reports;
pub mod templates;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Domain failure taxonomy. Every variant except `Storage` is an expected
/// condition and travels as `{success:false, error}` data; `Storage` is the
/// only variant transports may escalate (HTTP 500 / protocol error).
#[derive(Debug, Error)]
pub enum OpError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub fn success_envelope(payload: Value) -> Value {
    let mut envelope = serde_json::Map::new();
    envelope.insert("success".to_string(), Value::Bool(true));
    if let Value::Object(fields) = payload {
        envelope.extend(fields);
    }
    Value::Object(envelope)
}

pub fn error_envelope(err: &OpError) -> Value {
    serde_json::json!({
        "success": false,
        "error": err.to_string(),
    })
}

/// Required string argument. Absent, empty and whitespace-only all count
/// as missing.
pub(crate) fn require(value: Option<String>, field: &'static str) -> Result<String, OpError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(OpError::MissingField(field)),
    }
}

pub(crate) fn parse_date(value: &str, field: &'static str) -> Result<DateTime<Utc>, OpError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| OpError::InvalidArgument(format!("Invalid date for {field}: {value}")))
}

pub(crate) fn require_date(
    value: Option<String>,
    field: &'static str,
) -> Result<DateTime<Utc>, OpError> {
    let s = require(value, field)?;
    parse_date(&s, field)
}

pub(crate) fn optional_date(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, OpError> {
    value.map(|s| parse_date(s, field)).transpose()
}

/// Id of a direct operation target. A malformed id cannot name anything,
/// so it reports the same way as an unknown one.
pub(crate) fn require_id(
    value: Option<String>,
    field: &'static str,
    entity: &'static str,
) -> Result<Uuid, OpError> {
    let s = require(value, field)?;
    Uuid::parse_str(&s).map_err(|_| OpError::NotFound(entity))
}

/// Id inside a list filter. Malformed ids degrade to the nil UUID, which
/// matches nothing, rather than failing the whole list call.
pub(crate) fn filter_id(value: Option<&str>) -> Option<Uuid> {
    value.map(|s| Uuid::parse_str(s).unwrap_or_else(|_| Uuid::nil()))
}

/// 1-indexed pagination with defaults limit=50, page=1. Returns the page
/// plus the total match count before paging.
pub(crate) fn paginate<T>(items: Vec<T>, limit: Option<u64>, page: Option<u64>) -> (Vec<T>, usize) {
    let total = items.len();
    let limit = limit.unwrap_or(50) as usize;
    let page = page.unwrap_or(1).max(1) as usize;
    let page_items = items.into_iter().skip((page - 1) * limit).take(limit).collect();
    (page_items, total)
}

/// Deserializer for patch fields where "present but null" (clear) must be
/// distinguished from "absent" (keep). Pair with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
