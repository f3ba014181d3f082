//! Canonical partition names with Hive-compatible path encoding.
//!
//! A partition name is the string the metastore indexes a partition under and
//! the relative path the partition's files live at. The two uses share one
//! encoding, so the name computed here is byte-identical to the directory
//! name the metastore derives on its side.
//!
//! # Canonical Encoding Specification
//!
//! ```text
//! GRAMMAR:
//!   PARTITION_NAME ::= segment ("/" segment)*
//!   segment        ::= escaped_column "=" escaped_value
//!
//!   escaped_column, escaped_value:
//!     Reserved characters and ASCII control characters are percent-escaped
//!     as "%" followed by two uppercase hex digits; everything else passes
//!     through verbatim.
//!
//!   Reserved set: " # % ' * / : = ? \ { [ ] ^  plus 0x00-0x1F and 0x7F
//!
//!   An empty value encodes as the sentinel "__HIVE_DEFAULT_PARTITION__".
//! ```
//!
//! # Examples
//!
//! ```rust
//! use strata_core::partition::make_partition_name;
//!
//! let name = make_partition_name(&["year", "region"], &["2024", "west"])?;
//! assert_eq!(name.as_str(), "year=2024/region=west");
//! # Ok::<(), strata_core::partition::PartitionNameError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel value a null or empty partition value encodes as.
pub const DEFAULT_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

/// Returns true if the character must be percent-escaped in a path segment.
fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
    ) || c < ' '
        || c == '\u{7F}'
}

/// Percent-escapes reserved characters for use in a partition path segment.
///
/// Escapes are `%` followed by two uppercase hex digits. All other characters
/// pass through verbatim, including non-ASCII.
#[must_use]
pub fn escape_path_name(segment: &str) -> String {
    if segment.is_empty() {
        return DEFAULT_PARTITION_VALUE.to_string();
    }

    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if needs_escape(c) {
            // Reserved characters are all single-byte ASCII.
            out.push_str(&format!("%{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

/// Inverts [`escape_path_name`].
///
/// A `%` not followed by two hex digits passes through verbatim rather than
/// failing, matching the metastore's own tolerance for legacy names.
#[must_use]
pub fn unescape_path_name(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let hex = tail
            .get(1..3)
            .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()));
        if let Some(code) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
            out.push(code as char);
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// A canonical partition name: `col=value` segments joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionName(String);

impl PartitionName {
    /// Returns the canonical name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the name back into ordered `(column, value)` pairs.
    ///
    /// Values equal to the default-partition sentinel decode to empty strings.
    ///
    /// # Errors
    ///
    /// Returns an error if any segment lacks an `=` separator.
    pub fn parse(&self) -> Result<Vec<(String, String)>, PartitionNameError> {
        self.0
            .split('/')
            .map(|segment| {
                let (column, value) =
                    segment
                        .split_once('=')
                        .ok_or_else(|| PartitionNameError::MissingEquals {
                            segment: segment.to_string(),
                        })?;
                let value = if value == DEFAULT_PARTITION_VALUE {
                    String::new()
                } else {
                    unescape_path_name(value)
                };
                Ok((unescape_path_name(column), value))
            })
            .collect()
    }

    /// Parses the name and returns just the values, in column order.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed.
    pub fn values(&self) -> Result<Vec<String>, PartitionNameError> {
        Ok(self.parse()?.into_iter().map(|(_, v)| v).collect())
    }
}

impl fmt::Display for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PartitionName> for String {
    fn from(name: PartitionName) -> Self {
        name.0
    }
}

/// Derives the canonical partition name for the given columns and values.
///
/// The derivation is deterministic: the same columns and values always
/// produce the same name, and the name matches the directory encoding the
/// metastore indexes partitions under.
///
/// # Errors
///
/// Returns an error if the column and value counts differ, or if no columns
/// are given.
pub fn make_partition_name<C, V>(
    columns: &[C],
    values: &[V],
) -> Result<PartitionName, PartitionNameError>
where
    C: AsRef<str>,
    V: AsRef<str>,
{
    if columns.is_empty() {
        return Err(PartitionNameError::NoColumns);
    }
    if columns.len() != values.len() {
        return Err(PartitionNameError::LengthMismatch {
            columns: columns.len(),
            values: values.len(),
        });
    }

    let name = columns
        .iter()
        .zip(values.iter())
        .map(|(c, v)| {
            format!(
                "{}={}",
                escape_path_name(c.as_ref()),
                escape_path_name(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("/");

    Ok(PartitionName(name))
}

/// Errors that can occur when deriving or parsing a partition name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionNameError {
    /// No partition columns were given.
    #[error("partition name requires at least one column")]
    NoColumns,

    /// Column and value counts differ.
    #[error("partition column count {columns} does not match value count {values}")]
    LengthMismatch {
        /// Number of columns supplied.
        columns: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// A name segment lacked the `=` separator.
    #[error("missing '=' in partition name segment: {segment}")]
    MissingEquals {
        /// The offending segment.
        segment: String,
    },
}

impl From<PartitionNameError> for crate::error::Error {
    fn from(err: PartitionNameError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_values_pass_through() {
        let name = make_partition_name(&["year", "region"], &["2024", "west"]).unwrap();
        assert_eq!(name.as_str(), "year=2024/region=west");
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        assert_eq!(escape_path_name("us/west"), "us%2Fwest");
        assert_eq!(escape_path_name("a:b"), "a%3Ab");
        assert_eq!(escape_path_name("100%"), "100%25");
        assert_eq!(escape_path_name("k=v"), "k%3Dv");
    }

    #[test]
    fn test_control_characters_are_escaped() {
        assert_eq!(escape_path_name("a\tb"), "a%09b");
        assert_eq!(escape_path_name("a\u{7F}b"), "a%7Fb");
    }

    #[test]
    fn test_non_ascii_passes_through() {
        assert_eq!(escape_path_name("münchen"), "münchen");
    }

    #[test]
    fn test_empty_value_uses_default_sentinel() {
        let name = make_partition_name(&["region"], &[""]).unwrap();
        assert_eq!(name.as_str(), "region=__HIVE_DEFAULT_PARTITION__");
        assert_eq!(name.values().unwrap(), vec![String::new()]);
    }

    #[test]
    fn test_unescape_inverts_escape() {
        for raw in ["us/west", "100%", "a=b:c", "tab\there", "plain"] {
            assert_eq!(unescape_path_name(&escape_path_name(raw)), raw);
        }
    }

    #[test]
    fn test_unescape_tolerates_lone_percent() {
        assert_eq!(unescape_path_name("100%"), "100%");
        assert_eq!(unescape_path_name("%Zx"), "%Zx");
    }

    #[test]
    fn test_parse_returns_ordered_pairs() {
        let name = make_partition_name(&["year", "region"], &["2024", "us/west"]).unwrap();
        let pairs = name.parse().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("year".to_string(), "2024".to_string()),
                ("region".to_string(), "us/west".to_string()),
            ]
        );
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let result = make_partition_name(&["year", "region"], &["2024"]);
        assert_eq!(
            result.unwrap_err(),
            PartitionNameError::LengthMismatch {
                columns: 2,
                values: 1
            }
        );
    }

    #[test]
    fn test_no_columns_is_rejected() {
        let result = make_partition_name::<&str, &str>(&[], &[]);
        assert_eq!(result.unwrap_err(), PartitionNameError::NoColumns);
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        let name = PartitionName("yearonly".to_string());
        assert!(matches!(
            name.parse(),
            Err(PartitionNameError::MissingEquals { .. })
        ));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = make_partition_name(&["year", "region"], &["2024", "west"]).unwrap();
        let b = make_partition_name(&["year", "region"], &["2024", "west"]).unwrap();
        assert_eq!(a, b);
    }
}
