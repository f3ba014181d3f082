//! # strata-procedures
//!
//! Catalog-level procedures for the strata partitioned-table catalog.
//!
//! A procedure is a named, schema-qualified operation the host engine
//! dispatches by name with positional arguments. This crate provides:
//!
//! - **Registry**: "name → (argument schema, handler)" registration and
//!   dispatch, with argument validation and an access-control gate
//! - **`create_empty_partition`**: registers a new, file-less partition on an
//!   existing partitioned table
//!
//! ## Workflow
//!
//! `create_empty_partition` coordinates the collaborators from
//! `strata-metastore` in a fixed order: validate the caller-supplied
//! partition columns against the table's declared partitioning, detect an
//! existing partition, begin an insert transaction, allocate the partition's
//! storage locations, build an empty partition-update record, then finish
//! and commit. Any failure after begin surfaces as a transaction abort; the
//! metastore's all-or-nothing commit leaves no partial partition visible.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod create_empty_partition;
pub mod procedure;

pub use create_empty_partition::CreateEmptyPartitionProcedure;
pub use procedure::{
    ArgValue, Argument, ArgumentKind, Procedure, ProcedureArgs, ProcedureHandler,
    ProcedureRegistry,
};
