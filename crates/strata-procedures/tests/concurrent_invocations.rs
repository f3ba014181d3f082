//! Tests for concurrent invocations of `create_empty_partition`.
//!
//! The procedure takes no lock across the duplicate check and the commit, so
//! two same-key invocations can both pass the check before either commits.
//! The metastore's commit-time uniqueness check must then decide the race:
//! exactly one partition may exist afterwards.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use strata_core::table::{PartitionColumn, SchemaTableName};

use strata_metastore::{
    MemoryMetastore, Metastore, MetastoreConfig, MetastoreMetadataFactory,
    MetastoreTableResolver, StagingLocationService, Table,
};

use strata_procedures::CreateEmptyPartitionProcedure;

fn sales_name() -> SchemaTableName {
    SchemaTableName::new("sales_db", "sales").unwrap()
}

async fn shared_metastore() -> Arc<MemoryMetastore> {
    let metastore = Arc::new(MemoryMetastore::new());
    let config = MetastoreConfig::default();
    metastore
        .create_table(Table::new(
            sales_name(),
            config.table_location(&sales_name()),
            vec![
                PartitionColumn::new("year", "string"),
                PartitionColumn::new("region", "string"),
            ],
        ))
        .await
        .unwrap();
    metastore
}

fn procedure_over(metastore: &Arc<MemoryMetastore>) -> CreateEmptyPartitionProcedure {
    let config = MetastoreConfig::default();
    CreateEmptyPartitionProcedure::new(
        Arc::new(MetastoreMetadataFactory::new(metastore.clone(), config)),
        Arc::new(MetastoreTableResolver::new(metastore.clone())),
        metastore.clone(),
        Arc::new(StagingLocationService::new()),
    )
}

/// Two callers race for the same key - at most one may win.
#[tokio::test]
async fn test_same_key_race_leaves_one_partition() {
    let metastore = shared_metastore().await;
    let success_count = Arc::new(AtomicU32::new(0));
    let failure_count = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let metastore = metastore.clone();
            let success = success_count.clone();
            let failure = failure_count.clone();

            tokio::spawn(async move {
                let procedure = procedure_over(&metastore);
                let columns = vec!["year".to_string(), "region".to_string()];
                let values = vec!["2024".to_string(), "west".to_string()];

                match procedure
                    .create_empty_partition("sales_db", "sales", &columns, &values)
                    .await
                {
                    Ok(()) => {
                        success.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(_) => {
                        failure.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let successes = success_count.load(Ordering::SeqCst);
    let failures = failure_count.load(Ordering::SeqCst);

    assert!(successes >= 1, "at least one caller should succeed");
    assert_eq!(successes + failures, 2, "all callers should complete");

    let partitions = metastore.list_partitions(&sales_name()).await.unwrap();
    assert_eq!(partitions.len(), 1, "the race must not duplicate partitions");
    assert_eq!(partitions[0].name.as_str(), "year=2024/region=west");
}

/// Distinct keys never contend - all callers succeed.
#[tokio::test]
async fn test_distinct_keys_all_succeed() {
    let metastore = shared_metastore().await;
    let regions = ["north", "south", "east", "west"];

    let handles: Vec<_> = regions
        .iter()
        .map(|region| {
            let metastore = metastore.clone();
            let region = (*region).to_string();

            tokio::spawn(async move {
                let procedure = procedure_over(&metastore);
                let columns = vec!["year".to_string(), "region".to_string()];
                let values = vec!["2024".to_string(), region];

                procedure
                    .create_empty_partition("sales_db", "sales", &columns, &values)
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let partitions = metastore.list_partitions(&sales_name()).await.unwrap();
    assert_eq!(partitions.len(), regions.len());
}
