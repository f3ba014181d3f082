//! Canonical JSON serialization for deterministic transactional payloads.
//!
//! Partition-update records are serialized once by the procedure layer and
//! decoded again at commit time; intermediate storage may hash or compare the
//! bytes. Canonical form keeps those bytes stable across processes:
//!
//! - Object keys sorted lexicographically (UTF-8 byte order)
//! - No whitespace
//! - UTF-8 output
//! - Integers only (floats rejected)
//!
//! Floats are rejected outright because their stringification is not
//! deterministic across serializers. Counters and sizes are integers
//! everywhere in this codebase.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during canonical JSON serialization.
#[derive(Debug, Error)]
pub enum CanonicalJsonError {
    /// Serde JSON conversion failed.
    #[error("serde_json error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Float values are not allowed in canonical JSON.
    #[error("float values are not allowed in canonical JSON (use integers)")]
    FloatNotAllowed,

    /// UTF-8 encoding error (should never happen with valid JSON).
    #[error("UTF-8 encoding error")]
    Utf8Error,
}

/// Serializes `value` into canonical JSON bytes.
///
/// # Errors
///
/// Returns `CanonicalJsonError::Serde` if serialization fails, or
/// `CanonicalJsonError::FloatNotAllowed` if the value contains floats.
#[must_use = "canonical bytes should be used for the transactional payload"]
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalJsonError> {
    let v = serde_json::to_value(value)?;
    let mut out = Vec::<u8>::new();
    write_value(&v, &mut out)?;
    Ok(out)
}

/// Same as [`to_canonical_bytes`], but returns a UTF-8 String.
///
/// # Errors
///
/// Returns `CanonicalJsonError::Serde` if serialization fails,
/// `CanonicalJsonError::FloatNotAllowed` if the value contains floats, or
/// `CanonicalJsonError::Utf8Error` if UTF-8 conversion fails.
#[must_use = "canonical string should be used for the transactional payload"]
pub fn to_canonical_string<T: Serialize>(value: &T) -> Result<String, CanonicalJsonError> {
    let bytes = to_canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(|_| CanonicalJsonError::Utf8Error)
}

fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalJsonError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => {
            if n.is_f64() {
                return Err(CanonicalJsonError::FloatNotAllowed);
            }
            out.extend_from_slice(n.to_string().as_bytes());
        }
        Value::String(s) => {
            // serde_json's string escaping is already deterministic.
            out.extend_from_slice(serde_json::to_string(s)?.as_bytes());
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            // Sort explicitly so the output does not depend on serde_json's
            // map backing (preserve_order may be enabled transitively).
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by_key(|(key, _)| *key);

            out.push(b'{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(serde_json::to_string(key)?.as_bytes());
                out.push(b':');
                write_value(value, out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Unordered {
        zebra: u64,
        apple: &'static str,
        nested: Nested,
    }

    #[derive(Serialize)]
    struct Nested {
        z: bool,
        a: Option<u32>,
    }

    #[test]
    fn test_keys_are_sorted() {
        let value = Unordered {
            zebra: 1,
            apple: "a",
            nested: Nested { z: true, a: None },
        };

        let s = to_canonical_string(&value).unwrap();
        assert_eq!(s, r#"{"apple":"a","nested":{"a":null,"z":true},"zebra":1}"#);
    }

    #[test]
    fn test_no_whitespace() {
        let value = serde_json::json!({"b": [1, 2], "a": "x"});
        let s = to_canonical_string(&value).unwrap();
        assert!(!s.contains(' '));
        assert_eq!(s, r#"{"a":"x","b":[1,2]}"#);
    }

    #[test]
    fn test_floats_are_rejected() {
        let value = serde_json::json!({"ratio": 0.5});
        let result = to_canonical_bytes(&value);
        assert!(matches!(result, Err(CanonicalJsonError::FloatNotAllowed)));
    }

    #[test]
    fn test_deterministic_across_calls() {
        let value = serde_json::json!({"m": 3, "z": 1, "a": 2});
        let a = to_canonical_bytes(&value).unwrap();
        let b = to_canonical_bytes(&value).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_string_escaping() {
        let value = serde_json::json!({"path": "a\"b\\c"});
        let s = to_canonical_string(&value).unwrap();
        assert_eq!(s, r#"{"path":"a\"b\\c"}"#);
    }
}
