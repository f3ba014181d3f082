//! Insert transactions against the catalog.
//!
//! A metadata mutation runs begin → finish → commit:
//!
//! - `begin_insert` opens a transaction for one table and allocates the
//!   insert's staging location
//! - `finish_insert` stages the serialized partition updates; the catalog
//!   learns about the new partitions here, but nothing is visible yet
//! - `commit` publishes the staged partitions all-or-nothing
//!
//! The critical invariants are:
//! - A [`TransactionContext`] is scoped to one invocation and never reused
//! - Steps are strictly ordered; no step may be skipped or repeated
//! - A failure after `begin` leaves no visible partial state; there is no
//!   compensating rollback call
//! - Uniqueness of partition names is enforced by the metastore at commit,
//!   not by callers

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use ulid::Ulid;

use strata_core::error::{Error, Result};
use strata_core::table::{SchemaTableName, TableHandle};

use crate::config::MetastoreConfig;
use crate::location::LocationHandle;
use crate::metastore::{Metastore, Partition};
use crate::partition_update::PartitionUpdate;

/// A unique identifier for one insert operation.
///
/// Query IDs name the insert's staging directory, so they are
/// lexicographically sortable and globally unique without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(Ulid);

impl QueryId {
    /// Generates a new unique query ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque handle identifying one in-flight metadata transaction.
///
/// Returned by `begin_insert` and threaded through `finish_insert` and
/// `commit`. Owned exclusively by one procedure invocation; never shared
/// across invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionContext(Ulid);

impl TransactionContext {
    /// Generates a new unique transaction context.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle for one in-flight insert into one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertHandle {
    /// The table being inserted into.
    pub table: SchemaTableName,
    /// Location roots for this insert's writes.
    pub location: LocationHandle,
    /// The insert's query ID.
    pub query_id: QueryId,
}

/// The metadata-mutation collaborator.
///
/// Implementations guarantee all-or-nothing visibility: if `commit` is never
/// reached, no partition from the transaction becomes visible.
#[async_trait]
pub trait TransactionalMetadata: Send + Sync + 'static {
    /// Begins an insert transaction against a resolved table.
    async fn begin_insert(&self, table: &TableHandle)
        -> Result<(InsertHandle, TransactionContext)>;

    /// Finishes the insert, staging the serialized partition updates.
    ///
    /// `auxiliary` is reserved for statistics and side artifacts; workflows
    /// that produce none pass an empty list.
    async fn finish_insert(
        &self,
        context: &TransactionContext,
        handle: &InsertHandle,
        updates: Vec<Bytes>,
        auxiliary: Vec<Bytes>,
    ) -> Result<()>;

    /// Commits the transaction, publishing the staged partitions.
    async fn commit(&self, context: &TransactionContext) -> Result<()>;
}

/// Produces a fresh [`TransactionalMetadata`] per procedure invocation.
pub trait MetadataFactory: Send + Sync + 'static {
    /// Creates the transactional metadata for one invocation.
    fn create(&self) -> Arc<dyn TransactionalMetadata>;
}

/// Transactional metadata over a [`Metastore`].
///
/// Staged updates live in memory, keyed by transaction context; `commit`
/// decodes them into partition records and registers them through
/// [`Metastore::add_partitions`], which is atomic. A context that never
/// commits leaves nothing behind but its staged entry, which is dropped
/// with this value.
pub struct MetastoreTransactionalMetadata {
    metastore: Arc<dyn Metastore>,
    config: MetastoreConfig,
    in_flight: Mutex<HashMap<TransactionContext, InFlightInsert>>,
}

#[derive(Debug)]
struct InFlightInsert {
    table: SchemaTableName,
    staged: Vec<PartitionUpdate>,
    finished: bool,
}

impl MetastoreTransactionalMetadata {
    /// Creates transactional metadata over the given metastore.
    #[must_use]
    pub fn new(metastore: Arc<dyn Metastore>, config: MetastoreConfig) -> Self {
        Self {
            metastore,
            config,
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TransactionalMetadata for MetastoreTransactionalMetadata {
    async fn begin_insert(
        &self,
        table: &TableHandle,
    ) -> Result<(InsertHandle, TransactionContext)> {
        let query_id = QueryId::generate();
        let context = TransactionContext::generate();

        let handle = InsertHandle {
            table: table.schema_table.clone(),
            location: LocationHandle {
                target_root: table.location.clone(),
                staging_root: self.config.insert_staging_root(&query_id.to_string()),
            },
            query_id,
        };

        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| Error::internal("lock poisoned"))?;
        in_flight.insert(
            context,
            InFlightInsert {
                table: table.schema_table.clone(),
                staged: Vec::new(),
                finished: false,
            },
        );

        tracing::debug!(table = %table.schema_table, context = %context, "began insert");
        Ok((handle, context))
    }

    async fn finish_insert(
        &self,
        context: &TransactionContext,
        handle: &InsertHandle,
        updates: Vec<Bytes>,
        _auxiliary: Vec<Bytes>,
    ) -> Result<()> {
        let decoded = updates
            .iter()
            .map(|bytes| PartitionUpdate::decode(bytes))
            .collect::<Result<Vec<_>>>()?;

        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| Error::internal("lock poisoned"))?;
        let insert = in_flight
            .get_mut(context)
            .ok_or_else(|| Error::internal(format!("unknown transaction context {context}")))?;

        if insert.finished {
            return Err(Error::internal(format!(
                "insert already finished for context {context}"
            )));
        }
        if insert.table != handle.table {
            return Err(Error::internal(format!(
                "insert handle table {} does not match transaction table {}",
                handle.table, insert.table
            )));
        }

        insert.staged = decoded;
        insert.finished = true;

        tracing::debug!(
            table = %handle.table,
            context = %context,
            updates = insert.staged.len(),
            "finished insert"
        );
        Ok(())
    }

    async fn commit(&self, context: &TransactionContext) -> Result<()> {
        let insert = {
            let mut in_flight = self
                .in_flight
                .lock()
                .map_err(|_| Error::internal("lock poisoned"))?;
            in_flight
                .remove(context)
                .ok_or_else(|| Error::internal(format!("unknown transaction context {context}")))?
        };

        if !insert.finished {
            return Err(Error::internal(format!(
                "commit before finish for context {context}"
            )));
        }

        let now = Utc::now();
        let partitions = insert
            .staged
            .iter()
            .map(|update| {
                Ok(Partition {
                    name: update.name.clone(),
                    values: update.name.values().map_err(Error::serialization)?,
                    location: update.target_path.clone(),
                    created_at: now,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.metastore
            .add_partitions(&insert.table, partitions)
            .await?;

        tracing::debug!(table = %insert.table, context = %context, "committed insert");
        Ok(())
    }
}

/// Factory producing [`MetastoreTransactionalMetadata`] per invocation.
#[derive(Clone)]
pub struct MetastoreMetadataFactory {
    metastore: Arc<dyn Metastore>,
    config: MetastoreConfig,
}

impl MetastoreMetadataFactory {
    /// Creates a factory over the given metastore and configuration.
    #[must_use]
    pub fn new(metastore: Arc<dyn Metastore>, config: MetastoreConfig) -> Self {
        Self { metastore, config }
    }
}

impl MetadataFactory for MetastoreMetadataFactory {
    fn create(&self) -> Arc<dyn TransactionalMetadata> {
        Arc::new(MetastoreTransactionalMetadata::new(
            self.metastore.clone(),
            self.config.clone(),
        ))
    }
}

/// Coordinator state for one insert transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertState {
    Began,
    Finished,
    Committed,
}

/// Drives one insert transaction through begin → finish → commit.
///
/// The coordinator enforces step ordering and wraps any post-begin failure
/// as `Error::TransactionAborted`. It issues no compensating actions: the
/// metadata collaborator's all-or-nothing semantics are relied on to leave
/// no visible partial state when `commit` is never reached.
pub struct InsertTransaction {
    metadata: Arc<dyn TransactionalMetadata>,
    context: TransactionContext,
    handle: InsertHandle,
    state: InsertState,
}

impl InsertTransaction {
    /// Begins an insert transaction against the resolved table.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error unwrapped; nothing has begun when
    /// `begin_insert` itself fails.
    pub async fn begin(
        metadata: Arc<dyn TransactionalMetadata>,
        table: &TableHandle,
    ) -> Result<Self> {
        let (handle, context) = metadata.begin_insert(table).await?;
        Ok(Self {
            metadata,
            context,
            handle,
            state: InsertState::Began,
        })
    }

    /// Returns the insert handle for location allocation.
    #[must_use]
    pub fn insert_handle(&self) -> &InsertHandle {
        &self.handle
    }

    /// Finishes the insert with the given serialized updates.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransactionAborted` if the collaborator fails, or
    /// `Error::Internal` if called out of order.
    pub async fn finish(&mut self, updates: Vec<Bytes>, auxiliary: Vec<Bytes>) -> Result<()> {
        if self.state != InsertState::Began {
            return Err(Error::internal(format!(
                "finish called in state {:?}",
                self.state
            )));
        }

        self.metadata
            .finish_insert(&self.context, &self.handle, updates, auxiliary)
            .await
            .map_err(|e| Error::transaction_aborted("finishing insert", e))?;
        self.state = InsertState::Finished;
        Ok(())
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransactionAborted` if the collaborator fails, or
    /// `Error::Internal` if called out of order.
    pub async fn commit(&mut self) -> Result<()> {
        if self.state != InsertState::Finished {
            return Err(Error::internal(format!(
                "commit called in state {:?}",
                self.state
            )));
        }

        self.metadata
            .commit(&self.context)
            .await
            .map_err(|e| Error::transaction_aborted("committing insert", e))?;
        self.state = InsertState::Committed;
        Ok(())
    }
}
