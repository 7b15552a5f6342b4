//! Canonical JSON emission and content hashing.
//!
//! Status output is emitted in JCS (RFC 8785) form so that diffs are stable
//! across platforms. Artifacts recorded in the workflow state carry a BLAKE3
//! hash of their content after line ending normalization.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::atomic_write::normalize_line_endings;

/// Emit a serializable value as JCS canonical JSON.
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).with_context(|| "Failed to serialize value to JSON")?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .with_context(|| "Failed to canonicalize JSON using JCS")?;
    String::from_utf8(json_bytes).with_context(|| "JCS output contained invalid UTF-8")
}

/// BLAKE3 hex digest of document content.
///
/// CRLF and LF variants of the same document hash identically.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let normalized = normalize_line_endings(content);
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_emit_jcs_sorts_keys() {
        let mut map = BTreeMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        let json = emit_jcs(&map).unwrap();
        assert_eq!(json, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn test_content_hash_ignores_line_endings() {
        assert_eq!(content_hash("a\r\nb\r\n"), content_hash("a\nb\n"));
        assert_ne!(content_hash("a\nb\n"), content_hash("a\nc\n"));
        assert_eq!(content_hash("").len(), 64);
    }
}
