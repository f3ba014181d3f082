//! The `system.create_empty_partition` procedure.
//!
//! Registers a new, file-less partition on an existing partitioned table.
//! The partition's storage locations are allocated but never populated; the
//! catalog mutation is the only side effect.
//!
//! Ordering is load-bearing: the duplicate lookup strictly precedes the
//! transaction, and the mutation runs begin → finish → commit with no step
//! skipped. Two concurrent invocations for the same key can both pass the
//! duplicate check; the metastore's commit-time uniqueness check decides the
//! race. This procedure takes no lock of its own.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use strata_core::error::{Error, Result};
use strata_core::observability::procedure_span;
use strata_core::partition::{make_partition_name, PartitionName};
use strata_core::table::{SchemaTableName, TableHandle};

use strata_metastore::{
    InsertTransaction, LocationService, MetadataFactory, Metastore, PartitionUpdate, TableResolver,
};

use crate::procedure::{ArgValue, Argument, ArgumentKind, Procedure, ProcedureArgs, ProcedureHandler};

/// Procedure name as registered with the host engine.
pub const PROCEDURE_NAME: &str = "create_empty_partition";

/// Schema the procedure is registered under.
pub const PROCEDURE_SCHEMA: &str = "system";

/// The `create_empty_partition` procedure.
pub struct CreateEmptyPartitionProcedure {
    metadata_factory: Arc<dyn MetadataFactory>,
    resolver: Arc<dyn TableResolver>,
    metastore: Arc<dyn Metastore>,
    location_service: Arc<dyn LocationService>,
}

impl CreateEmptyPartitionProcedure {
    /// Creates the procedure over its collaborators.
    #[must_use]
    pub fn new(
        metadata_factory: Arc<dyn MetadataFactory>,
        resolver: Arc<dyn TableResolver>,
        metastore: Arc<dyn Metastore>,
        location_service: Arc<dyn LocationService>,
    ) -> Self {
        Self {
            metadata_factory,
            resolver,
            metastore,
            location_service,
        }
    }

    /// Returns the registrable procedure: name, argument schema, handler.
    #[must_use]
    pub fn into_procedure(self) -> Procedure {
        Procedure::new(
            PROCEDURE_SCHEMA,
            PROCEDURE_NAME,
            vec![
                Argument::new("schema_name", ArgumentKind::Varchar),
                Argument::new("table_name", ArgumentKind::Varchar),
                Argument::new("partition_columns", ArgumentKind::VarcharArray),
                Argument::new("partition_values", ArgumentKind::VarcharArray),
            ],
            Arc::new(self),
        )
    }

    /// Registers a new empty partition for the named table.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` if the supplied partition columns do not
    ///   match the table's declared partition columns (names, order, count)
    /// - `Error::AlreadyExists` if the partition is already registered; no
    ///   transaction is begun in that case
    /// - `Error::TransactionAborted` for failures after the transaction
    ///   began; the metastore guarantees no partial partition is visible
    /// - collaborator errors, unmodified, for resolution and lookup failures
    pub async fn create_empty_partition(
        &self,
        schema_name: &str,
        table_name: &str,
        partition_columns: &[String],
        partition_values: &[String],
    ) -> Result<()> {
        let span = procedure_span(PROCEDURE_NAME, schema_name, table_name);
        self.execute(schema_name, table_name, partition_columns, partition_values)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        schema_name: &str,
        table_name: &str,
        partition_columns: &[String],
        partition_values: &[String],
    ) -> Result<()> {
        let schema_table = SchemaTableName::new(schema_name, table_name)?;
        let metadata = self.metadata_factory.create();
        let table = self.resolver.resolve(&schema_table).await?;

        let partition_name =
            validate_partition_key(&table, partition_columns, partition_values)?;

        if self
            .metastore
            .get_partition(&schema_table, partition_values)
            .await?
            .is_some()
        {
            return Err(Error::already_exists("partition", &partition_name));
        }

        let mut transaction = InsertTransaction::begin(metadata, &table).await?;

        let write_info = self
            .location_service
            .partition_write_info(&transaction.insert_handle().location, &partition_name)
            .await
            .map_err(|e| Error::transaction_aborted("allocating partition write location", e))?;

        let update = PartitionUpdate::empty(partition_name.clone(), &write_info);
        let payload = update
            .encode()
            .map_err(|e| Error::transaction_aborted("encoding partition update", e))?;

        transaction.finish(vec![payload], Vec::new()).await?;
        transaction.commit().await?;

        tracing::info!(
            partition = %partition_name,
            target = %write_info.target_path,
            "registered empty partition"
        );
        Ok(())
    }
}

/// Checks the caller-supplied partition key against the table's declared
/// partitioning and derives the canonical partition name.
///
/// Column names must equal the declared partition columns exactly, including
/// order. A reordered or mis-specified key would otherwise yield a
/// syntactically valid but semantically wrong partition name.
fn validate_partition_key(
    table: &TableHandle,
    partition_columns: &[String],
    partition_values: &[String],
) -> Result<PartitionName> {
    let actual = table.partition_column_names();
    let supplied: Vec<&str> = partition_columns.iter().map(String::as_str).collect();

    if supplied != actual {
        return Err(Error::invalid_argument(format!(
            "provided partition column names do not match actual partition column names: [{}]",
            actual.join(", ")
        )));
    }

    if partition_values.len() != partition_columns.len() {
        return Err(Error::invalid_argument(format!(
            "provided {} partition values for {} partition columns",
            partition_values.len(),
            partition_columns.len()
        )));
    }

    Ok(make_partition_name(&supplied, partition_values)?)
}

#[async_trait]
impl ProcedureHandler for CreateEmptyPartitionProcedure {
    async fn call(&self, args: &ProcedureArgs) -> Result<()> {
        let schema_name = args.varchar("schema_name")?;
        let table_name = args.varchar("table_name")?;
        let partition_columns = args.varchar_array("partition_columns")?;
        let partition_values = args.varchar_array("partition_values")?;

        self.create_empty_partition(schema_name, table_name, partition_columns, partition_values)
            .await
    }
}

/// Convenience constructor for the registrable argument values.
#[must_use]
pub fn arg_values(
    schema_name: &str,
    table_name: &str,
    partition_columns: &[&str],
    partition_values: &[&str],
) -> Vec<ArgValue> {
    vec![
        ArgValue::Varchar(schema_name.to_string()),
        ArgValue::Varchar(table_name.to_string()),
        ArgValue::VarcharArray(partition_columns.iter().map(ToString::to_string).collect()),
        ArgValue::VarcharArray(partition_values.iter().map(ToString::to_string).collect()),
    ]
}
