//! Strict decoding of completion output.

use serde::de::DeserializeOwned;

use crate::error::{MentorError, Result};

/// Returns the JSON payload of a completion reply.
///
/// The whole reply must be the JSON document, optionally wrapped in one
/// fenced code block. Prose before or after the document is rejected rather
/// than scanned for something that looks like JSON.
pub fn json_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim().contains(char::is_whitespace) => body.trim(),
        _ => trimmed,
    }
}

/// Decodes completion output into `T`, mapping any failure to `MalformedGeneration`.
pub fn decode<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T> {
    serde_json::from_str(json_payload(raw))
        .map_err(|e| MentorError::MalformedGeneration(format!("{what}: {e}")))
}
