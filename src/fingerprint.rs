//! Content Fingerprint - SHA-256 over Canonical JSON
//!
//! Equal content must yield equal fingerprints across builds; the
//! fingerprint is the witness that validation has no hidden state.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write;

use crate::content::{Project, SiteContent};

/// SHA-256 of bytes as a lowercase hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{:02x}", byte);
        out
    })
}

/// Canonical JSON: object keys sorted at every level, no whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_string(&sort_keys(value))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Fingerprint of a validated collection: site copy plus records, in
/// authored order.
pub fn content_fingerprint(
    site: &SiteContent,
    projects: &[Project],
) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(&serde_json::json!({
        "site": site,
        "projects": projects,
    }))?;
    Ok(sha256_hex(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_canonical_json_sorts_nested_objects() {
        let obj1 = json!({"z": 1, "a": 2, "m": {"b": 1, "a": 2}});
        let obj2 = json!({"a": 2, "m": {"a": 2, "b": 1}, "z": 1});
        assert_eq!(
            canonical_json(&obj1).unwrap(),
            canonical_json(&obj2).unwrap()
        );
    }

    #[test]
    fn test_hash_deterministic() {
        let data = b"portfolio content";
        assert_eq!(sha256_hex(data), sha256_hex(data));
    }

    #[test]
    fn test_hash_tracks_input() {
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }
}
