//! Storage location allocation for insert operations.
//!
//! New partition files are staged under a per-insert scratch directory and
//! moved to the partition's final, catalog-visible location at commit. An
//! empty-partition registration allocates both paths but never populates
//! the write path with files.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use strata_core::error::Result;
use strata_core::partition::PartitionName;

/// A pair of storage locations allocated for one partition of one insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteInfo {
    /// Where new files are staged while the insert is in flight.
    pub write_path: String,
    /// The partition's final, catalog-visible location.
    pub target_path: String,
}

/// Location roots carried by an in-flight insert.
///
/// Built once at `begin_insert` and threaded to the location service for
/// each partition the insert touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationHandle {
    /// The table's root storage location.
    pub target_root: String,
    /// The insert's scratch directory root.
    pub staging_root: String,
}

/// Allocates write/target storage paths for partitions.
///
/// Allocation may be slow or remote; callers hold their thread for the
/// duration of the call and must not impose their own timeout.
#[async_trait]
pub trait LocationService: Send + Sync + 'static {
    /// Obtains the write and target paths for one partition of an insert.
    async fn partition_write_info(
        &self,
        location: &LocationHandle,
        partition_name: &PartitionName,
    ) -> Result<WriteInfo>;
}

/// Location service for the staged-then-moved write layout.
///
/// Write paths live under the insert's staging root; target paths live under
/// the table location. Both end with the canonical partition name, so the
/// final directory layout is readable back into partition values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagingLocationService;

impl StagingLocationService {
    /// Creates a new staging location service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LocationService for StagingLocationService {
    async fn partition_write_info(
        &self,
        location: &LocationHandle,
        partition_name: &PartitionName,
    ) -> Result<WriteInfo> {
        Ok(WriteInfo {
            write_path: join_path(&location.staging_root, partition_name.as_str()),
            target_path: join_path(&location.target_root, partition_name.as_str()),
        })
    }
}

/// Joins a root and a relative path with exactly one separator.
fn join_path(root: &str, rest: &str) -> String {
    let root = root.trim_end_matches('/');
    format!("{root}/{rest}")
}
