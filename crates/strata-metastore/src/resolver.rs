//! Table resolution.
//!
//! Resolution turns a schema-qualified name into a [`TableHandle`] carrying
//! the table's storage location and declared partition columns. The handle is
//! immutable and scoped to one request.

use async_trait::async_trait;
use std::sync::Arc;

use strata_core::error::Result;
use strata_core::table::{SchemaTableName, TableHandle};

use crate::metastore::Metastore;

/// Resolves schema-qualified names into table handles.
#[async_trait]
pub trait TableResolver: Send + Sync + 'static {
    /// Resolves a table.
    ///
    /// Returns `Error::ResourceNotFound` if the table does not exist.
    async fn resolve(&self, name: &SchemaTableName) -> Result<TableHandle>;
}

/// Resolver backed by a metastore.
#[derive(Clone)]
pub struct MetastoreTableResolver {
    metastore: Arc<dyn Metastore>,
}

impl MetastoreTableResolver {
    /// Creates a resolver over the given metastore.
    #[must_use]
    pub fn new(metastore: Arc<dyn Metastore>) -> Self {
        Self { metastore }
    }
}

#[async_trait]
impl TableResolver for MetastoreTableResolver {
    async fn resolve(&self, name: &SchemaTableName) -> Result<TableHandle> {
        let table = self.metastore.get_table(name).await?;
        Ok(table.handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::error::Error;
    use strata_core::table::PartitionColumn;

    use crate::metastore::{MemoryMetastore, Table};

    #[tokio::test]
    async fn test_resolve_returns_handle_with_partition_columns() {
        let metastore = Arc::new(MemoryMetastore::new());
        let name = SchemaTableName::new("sales_db", "sales").unwrap();
        metastore
            .create_table(Table::new(
                name.clone(),
                "/warehouse/sales_db.db/sales",
                vec![
                    PartitionColumn::new("year", "string"),
                    PartitionColumn::new("region", "string"),
                ],
            ))
            .await
            .unwrap();

        let resolver = MetastoreTableResolver::new(metastore);
        let handle = resolver.resolve(&name).await.unwrap();

        assert_eq!(handle.location, "/warehouse/sales_db.db/sales");
        assert_eq!(handle.partition_column_names(), vec!["year", "region"]);
    }

    #[tokio::test]
    async fn test_resolve_unknown_table_fails() {
        let resolver = MetastoreTableResolver::new(Arc::new(MemoryMetastore::new()));
        let name = SchemaTableName::new("sales_db", "missing").unwrap();

        let result = resolver.resolve(&name).await;
        assert!(matches!(result, Err(Error::ResourceNotFound { .. })));
    }
}
