//! Table identity for the strata catalog.
//!
//! Tables are addressed by a schema-qualified name. A resolved table carries
//! its storage location and its declared partition columns in order; the
//! declared order is what callers of partition-level operations must match.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// Schema-qualified table name.
///
/// Forms a dotted identifier: `{schema}.{name}` (e.g., `sales_db.sales`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTableName {
    /// Schema (database) the table lives in.
    pub schema: String,
    /// Table name within the schema.
    pub name: String,
}

impl SchemaTableName {
    /// Creates a new schema-qualified table name.
    ///
    /// # Errors
    ///
    /// Returns an error if schema or name is empty or contains invalid characters.
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, SchemaTableNameError> {
        let schema = schema.into();
        let name = name.into();

        Self::validate_segment(&schema, "schema")?;
        Self::validate_segment(&name, "table")?;

        Ok(Self { schema, name })
    }

    /// Validates a name segment (schema or table).
    fn validate_segment(segment: &str, field: &str) -> Result<(), SchemaTableNameError> {
        if segment.is_empty() {
            return Err(SchemaTableNameError::Empty {
                field: field.into(),
            });
        }

        if segment.len() > 128 {
            return Err(SchemaTableNameError::TooLong {
                field: field.into(),
                len: segment.len(),
            });
        }

        // Must start with lowercase letter
        if !segment
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
        {
            return Err(SchemaTableNameError::InvalidStart {
                field: field.into(),
            });
        }

        // Can contain lowercase letters, digits, underscores
        if !segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(SchemaTableNameError::InvalidCharacters {
                field: field.into(),
            });
        }

        Ok(())
    }

    /// Parses a name from its dotted form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not in `{schema}.{name}` form.
    pub fn parse(dotted: &str) -> Result<Self, SchemaTableNameError> {
        let mut parts = dotted.splitn(2, '.');
        let schema = parts.next().ok_or_else(|| SchemaTableNameError::InvalidForm {
            input: dotted.to_string(),
        })?;
        let name = parts.next().ok_or_else(|| SchemaTableNameError::InvalidForm {
            input: dotted.to_string(),
        })?;
        if name.contains('.') {
            return Err(SchemaTableNameError::InvalidForm {
                input: dotted.to_string(),
            });
        }
        Self::new(schema, name)
    }
}

impl fmt::Display for SchemaTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Errors that can occur when constructing a [`SchemaTableName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaTableNameError {
    /// A segment was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Which segment was empty.
        field: String,
    },

    /// A segment exceeded the maximum length.
    #[error("{field} exceeds 128 characters (got {len})")]
    TooLong {
        /// Which segment was too long.
        field: String,
        /// Its length.
        len: usize,
    },

    /// A segment did not start with a lowercase letter.
    #[error("{field} must start with a lowercase letter")]
    InvalidStart {
        /// Which segment was invalid.
        field: String,
    },

    /// A segment contained characters outside `[a-z0-9_]`.
    #[error("{field} may only contain lowercase letters, digits, and underscores")]
    InvalidCharacters {
        /// Which segment was invalid.
        field: String,
    },

    /// The dotted form could not be split into schema and name.
    #[error("expected '{{schema}}.{{name}}', got: {input}")]
    InvalidForm {
        /// The offending input.
        input: String,
    },
}

impl From<SchemaTableNameError> for Error {
    fn from(err: SchemaTableNameError) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

/// A partition column declaration: name plus its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionColumn {
    /// Column name.
    pub name: String,
    /// Declared column type name (e.g., `string`, `bigint`, `date`).
    pub column_type: String,
}

impl PartitionColumn {
    /// Creates a new partition column declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// A resolved table within a schema.
///
/// Carries the table's storage location and its ordered partition column
/// declarations. Immutable once resolved; scoped to a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableHandle {
    /// The schema-qualified table name.
    pub schema_table: SchemaTableName,
    /// The table's root storage location.
    pub location: String,
    /// Partition column declarations in declared order.
    pub partition_columns: Vec<PartitionColumn>,
}

impl TableHandle {
    /// Creates a new resolved table handle.
    #[must_use]
    pub fn new(
        schema_table: SchemaTableName,
        location: impl Into<String>,
        partition_columns: Vec<PartitionColumn>,
    ) -> Self {
        Self {
            schema_table,
            location: location.into(),
            partition_columns,
        }
    }

    /// Returns the declared partition column names in order.
    #[must_use]
    pub fn partition_column_names(&self) -> Vec<&str> {
        self.partition_columns
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Returns true if the table has no partition columns.
    #[must_use]
    pub fn is_unpartitioned(&self) -> bool {
        self.partition_columns.is_empty()
    }
}
