//! Metastore abstraction and in-memory reference implementation.
//!
//! The metastore is the catalog service of record: it knows which tables
//! exist, where they live, and which partitions each table has. Partition
//! lookups and registrations are keyed by the canonical partition name, so
//! the encoding in [`strata_core::partition`] is the single source of truth
//! for partition identity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use strata_core::error::{Error, Result};
use strata_core::partition::{make_partition_name, PartitionName};
use strata_core::table::{PartitionColumn, SchemaTableName, TableHandle};

/// A table record in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// The schema-qualified table name.
    pub schema_table: SchemaTableName,
    /// Root storage location for the table's data.
    pub location: String,
    /// Partition column declarations in declared order.
    pub partition_columns: Vec<PartitionColumn>,
}

impl Table {
    /// Creates a new table record.
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

    /// Returns a resolved handle for this table.
    #[must_use]
    pub fn handle(&self) -> TableHandle {
        TableHandle::new(
            self.schema_table.clone(),
            self.location.clone(),
            self.partition_columns.clone(),
        )
    }
}

/// A partition record in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    /// Canonical partition name (also the partition's relative path).
    pub name: PartitionName,
    /// Partition values in declared column order.
    pub values: Vec<String>,
    /// The partition's final storage location.
    pub location: String,
    /// When the partition was registered.
    pub created_at: DateTime<Utc>,
}

/// The catalog service recording tables and partitions.
///
/// Implementations own the uniqueness guarantee for partition names within a
/// table: `add_partitions` must refuse a name that is already registered.
#[async_trait]
pub trait Metastore: Send + Sync + 'static {
    /// Creates a table in the catalog.
    ///
    /// Returns `Error::AlreadyExists` if the table is already registered.
    async fn create_table(&self, table: Table) -> Result<()>;

    /// Loads a table record.
    ///
    /// Returns `Error::ResourceNotFound` if the table does not exist.
    async fn get_table(&self, name: &SchemaTableName) -> Result<Table>;

    /// Looks up a partition by its values, in declared column order.
    ///
    /// Returns `Ok(None)` if no partition with the derived name exists.
    async fn get_partition(
        &self,
        table: &SchemaTableName,
        values: &[String],
    ) -> Result<Option<Partition>>;

    /// Registers partitions atomically: either all are added or none.
    ///
    /// Returns `Error::AlreadyExists` if any partition name is already
    /// registered (or duplicated within the batch); in that case no
    /// partition from the batch is registered.
    async fn add_partitions(&self, table: &SchemaTableName, partitions: Vec<Partition>)
        -> Result<()>;

    /// Lists all partitions of a table, ordered by name.
    async fn list_partitions(&self, table: &SchemaTableName) -> Result<Vec<Partition>>;
}

/// In-memory metastore for development and tests.
///
/// Thread-safe via `RwLock`. Not suitable for production: state is lost on
/// drop and nothing is shared across processes.
#[derive(Debug, Default)]
pub struct MemoryMetastore {
    inner: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Table>,
    /// table name -> partition name -> partition
    partitions: HashMap<String, BTreeMap<String, Partition>>,
}

impl MemoryMetastore {
    /// Creates a new empty metastore.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn derive_name(table: &Table, values: &[String]) -> Result<PartitionName> {
        let columns = table
            .partition_columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        Ok(make_partition_name(&columns, values)?)
    }

    fn locked_read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>> {
        self.inner.read().map_err(|_| Error::internal("lock poisoned"))
    }

    fn locked_write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| Error::internal("lock poisoned"))
    }
}

#[async_trait]
impl Metastore for MemoryMetastore {
    async fn create_table(&self, table: Table) -> Result<()> {
        let mut state = self.locked_write()?;
        let key = table.schema_table.to_string();
        if state.tables.contains_key(&key) {
            return Err(Error::already_exists("table", &table.schema_table));
        }
        state.partitions.entry(key.clone()).or_default();
        state.tables.insert(key, table);
        Ok(())
    }

    async fn get_table(&self, name: &SchemaTableName) -> Result<Table> {
        let state = self.locked_read()?;
        state
            .tables
            .get(&name.to_string())
            .cloned()
            .ok_or_else(|| Error::resource_not_found("table", name))
    }

    async fn get_partition(
        &self,
        table: &SchemaTableName,
        values: &[String],
    ) -> Result<Option<Partition>> {
        let state = self.locked_read()?;
        let record = state
            .tables
            .get(&table.to_string())
            .ok_or_else(|| Error::resource_not_found("table", table))?;
        let name = Self::derive_name(record, values)?;

        Ok(state
            .partitions
            .get(&table.to_string())
            .and_then(|parts| parts.get(name.as_str()))
            .cloned())
    }

    async fn add_partitions(
        &self,
        table: &SchemaTableName,
        partitions: Vec<Partition>,
    ) -> Result<()> {
        let mut state = self.locked_write()?;
        let key = table.to_string();
        if !state.tables.contains_key(&key) {
            return Err(Error::resource_not_found("table", table));
        }

        let existing = state.partitions.entry(key).or_default();

        // Validate the whole batch before touching anything.
        let mut seen = Vec::with_capacity(partitions.len());
        for partition in &partitions {
            let name = partition.name.as_str();
            if existing.contains_key(name) || seen.contains(&name) {
                return Err(Error::already_exists("partition", &partition.name));
            }
            seen.push(name);
        }

        for partition in partitions {
            existing.insert(partition.name.as_str().to_string(), partition);
        }
        Ok(())
    }

    async fn list_partitions(&self, table: &SchemaTableName) -> Result<Vec<Partition>> {
        let state = self.locked_read()?;
        Ok(state
            .partitions
            .get(&table.to_string())
            .map(|parts| parts.values().cloned().collect())
            .unwrap_or_default())
    }
}
