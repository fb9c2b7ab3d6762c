//! Continuation cursor encoding
//!
//! A cursor is the store's last-evaluated key, flattened to plain JSON with
//! serde_dynamo and wrapped in URL-safe base64 so it can travel in a query
//! string. String and number key attributes survive the round trip; binary
//! keys do not.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_dynamo::{from_item, to_item};

use crate::errors::{Error, Result};
use crate::models::Item;

/// Encode a last-evaluated key as an opaque token
pub fn encode(key: &Item) -> Result<String> {
    let json: serde_json::Value =
        from_item(key.clone()).map_err(|e| Error::DynamoSerialization(e.to_string()))?;
    let raw = serde_json::to_vec(&json)?;
    Ok(URL_SAFE_NO_PAD.encode(raw))
}

/// Decode a token produced by [`encode`]
pub fn decode(token: &str) -> Result<Item> {
    let raw = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| Error::InvalidCursor("Invalid base64".to_string()))?;
    let json: serde_json::Value =
        serde_json::from_slice(&raw).map_err(|_| Error::InvalidCursor("Invalid JSON".to_string()))?;
    if !json.is_object() {
        return Err(Error::InvalidCursor("Expected a key object".to_string()));
    }
    let key: Item = to_item(json).map_err(|e| Error::InvalidCursor(e.to_string()))?;
    if key.is_empty() {
        return Err(Error::InvalidCursor("Empty key".to_string()));
    }
    Ok(key)
}
