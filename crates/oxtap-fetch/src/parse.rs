//! Flattening of historical snapshots into rate rows.

use oxtap_types::{RateRows, Result, Snapshot};
use serde_json::Value;

/// Expands one day's response body into one [`oxtap_types::RateRow`] per rate.
///
/// The body is validated in full before the iterator is returned, so a broken
/// page produces an error and no rows. The function is pure: calling it again
/// on the same body yields the same rows.
///
/// # Errors
///
/// Returns [`oxtap_types::TapError::MalformedResponse`] if `base`,
/// `timestamp` or `rates` is absent or mistyped.
pub fn flatten(body: &Value) -> Result<RateRows> {
    Snapshot::from_value(body).map(Snapshot::into_rows)
}

/// Parses a raw response body and flattens it.
///
/// # Errors
///
/// Returns an error if the body is not JSON or is malformed.
pub fn flatten_bytes(body: &[u8]) -> Result<RateRows> {
    let value: Value = serde_json::from_slice(body)?;
    flatten(&value)
}
