//! # strata-core
//!
//! Core abstractions for the strata partitioned-table catalog.
//!
//! This crate provides the foundational types used across all strata components:
//!
//! - **Table Identity**: Validated schema/table names and resolved table handles
//! - **Partition Naming**: Hive-compatible canonical partition name encoding
//! - **Error Types**: Shared error definitions and result types
//! - **Canonical JSON**: Deterministic serialization for transactional payloads
//! - **Observability**: Structured logging initialization and span helpers
//!
//! ## Crate Boundary
//!
//! `strata-core` is the **only** crate allowed to define shared primitives.
//! Collaborator interfaces (metastore, location service, transactions) build
//! on these types in `strata-metastore`; the procedure surface lives in
//! `strata-procedures`.
//!
//! ## Example
//!
//! ```rust
//! use strata_core::prelude::*;
//!
//! let table = SchemaTableName::new("sales_db", "sales")?;
//! let name = make_partition_name(&["year", "region"], &["2024", "west"])?;
//! assert_eq!(name.as_str(), "year=2024/region=west");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod canonical_json;
pub mod error;
pub mod observability;
pub mod partition;
pub mod table;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use strata_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canonical_json::{to_canonical_bytes, to_canonical_string};
    pub use crate::error::{Error, Result};
    pub use crate::partition::{
        escape_path_name, make_partition_name, unescape_path_name, PartitionName,
        PartitionNameError, DEFAULT_PARTITION_VALUE,
    };
    pub use crate::table::{PartitionColumn, SchemaTableName, SchemaTableNameError, TableHandle};
}

// Re-export key types at crate root for ergonomics
pub use canonical_json::{to_canonical_bytes, to_canonical_string, CanonicalJsonError};
pub use error::{Error, Result};
pub use observability::{init_logging, procedure_span, LogFormat};
pub use partition::{
    escape_path_name, make_partition_name, unescape_path_name, PartitionName, PartitionNameError,
    DEFAULT_PARTITION_VALUE,
};
pub use table::{PartitionColumn, SchemaTableName, SchemaTableNameError, TableHandle};
