// Normalization of contract failures into user-facing reasons

use alloy::contract::Error;

/// Extracts a human-readable reason from a contract failure. The
/// structured JSON-RPC error payload is preferred; everything else falls
/// back to a string-level cleanup of the library's error formatting.
pub fn extract_reason(err: &Error) -> String {
    if let Error::TransportError(transport) = err
        && let Some(payload) = transport.as_error_resp()
    {
        return payload.message.to_string();
    }
    trim_at_parenthesis(&err.to_string())
}

/// Takes the text before the first parenthesis of the raw message.
/// Known-fragile: this scrapes an external library's error formatting and
/// must not be extended without confirming the error shape upstream.
pub fn trim_at_parenthesis(raw: &str) -> String {
    match raw.split_once('(') {
        Some((head, _)) => head.trim().to_string(),
        None => raw.trim().to_string(),
    }
}
