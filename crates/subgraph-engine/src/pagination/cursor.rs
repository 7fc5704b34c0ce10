//! Connection cursors: the base64 encoded, 1-based position of an item in the full list.

use base64::{Engine as _, engine::general_purpose::STANDARD};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid cursor")]
pub struct InvalidCursor(pub String);

pub fn encode(position: u64) -> String {
    STANDARD.encode(position.to_string())
}

pub fn decode(cursor: &str) -> Result<u64, InvalidCursor> {
    let invalid = || InvalidCursor(cursor.to_string());

    let bytes = STANDARD.decode(cursor).map_err(|_| invalid())?;
    let decoded = std::str::from_utf8(&bytes).map_err(|_| invalid())?;
    decoded.parse::<u64>().map_err(|_| invalid())
}
