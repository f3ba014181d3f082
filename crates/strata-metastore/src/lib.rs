//! # strata-metastore
//!
//! Collaborator layer for the strata partitioned-table catalog.
//!
//! This crate defines the interfaces the procedure layer orchestrates, plus
//! reference implementations used in development and tests:
//!
//! - **Metastore**: the catalog service recording tables and partitions
//! - **Table Resolver**: turns a schema-qualified name into a resolved handle
//! - **Location Service**: allocates write/target storage paths
//! - **Insert Transactions**: begin → finish → commit metadata mutations
//! - **Partition Updates**: the records a finished insert hands to commit
//! - **Config & Access Control**: deployment configuration and the
//!   authorization plugin selected from it
//!
//! ## Transactional Model
//!
//! `finish_insert` only *stages* partition updates against the transaction
//! context; nothing becomes visible in the catalog until `commit`. Commit is
//! all-or-nothing: either every staged partition registers or none does.
//! Cross-invocation exclusivity is enforced here (partition names are unique
//! within a table), not by the callers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod location;
pub mod metastore;
pub mod partition_update;
pub mod resolver;
pub mod security;
pub mod transaction;

// Re-export main types at crate root
pub use config::MetastoreConfig;
pub use location::{LocationHandle, LocationService, StagingLocationService, WriteInfo};
pub use metastore::{MemoryMetastore, Metastore, Partition, Table};
pub use partition_update::{PartitionUpdate, UpdateMode};
pub use resolver::{MetastoreTableResolver, TableResolver};
pub use security::{
    access_control_from_config, AccessControl, AccessRule, AllowAllAccessControl,
    RuleBasedAccessControl,
};
pub use transaction::{
    InsertHandle, InsertTransaction, MetadataFactory, MetastoreMetadataFactory,
    MetastoreTransactionalMetadata, QueryId, TransactionContext, TransactionalMetadata,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::MetastoreConfig;
    pub use crate::location::{LocationHandle, LocationService, StagingLocationService, WriteInfo};
    pub use crate::metastore::{MemoryMetastore, Metastore, Partition, Table};
    pub use crate::partition_update::{PartitionUpdate, UpdateMode};
    pub use crate::resolver::{MetastoreTableResolver, TableResolver};
    pub use crate::security::{access_control_from_config, AccessControl};
    pub use crate::transaction::{
        InsertHandle, InsertTransaction, MetadataFactory, MetastoreMetadataFactory,
        MetastoreTransactionalMetadata, TransactionContext, TransactionalMetadata,
    };
}
