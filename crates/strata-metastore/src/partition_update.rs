//! Partition update records and their wire encoding.
//!
//! A `PartitionUpdate` is the record a finished insert hands to the commit
//! step: which partition changed, how, and which files carry the new data.
//! The record crosses a serialization boundary between the procedure layer
//! and the transactional metadata, so it is encoded canonically — the same
//! logical update always produces the same bytes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use strata_core::canonical_json::to_canonical_bytes;
use strata_core::error::{Error, Result};
use strata_core::partition::PartitionName;

use crate::location::WriteInfo;

/// How an update applies to its partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateMode {
    /// The partition is created by this update.
    New,
    /// Files are appended to an existing partition.
    Append,
    /// The partition's contents are replaced.
    Overwrite,
}

/// Metadata describing files and statistics added to (or defining) a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionUpdate {
    /// Canonical partition name.
    pub name: PartitionName,
    /// How this update applies to the partition.
    pub update_mode: UpdateMode,
    /// Staging location of the update's files.
    pub write_path: String,
    /// Final location of the update's files.
    pub target_path: String,
    /// File names added by the update, relative to the write path.
    pub file_names: Vec<String>,
    /// Number of files added.
    pub file_count: u64,
    /// Number of rows added.
    pub row_count: u64,
    /// In-memory size of the added data in bytes.
    pub in_memory_data_size_bytes: u64,
}

impl PartitionUpdate {
    /// Builds the update record for a fresh, file-less partition.
    ///
    /// The file list is empty and every counter is zero by construction.
    #[must_use]
    pub fn empty(name: PartitionName, write_info: &WriteInfo) -> Self {
        Self {
            name,
            update_mode: UpdateMode::New,
            write_path: write_info.write_path.clone(),
            target_path: write_info.target_path.clone(),
            file_names: Vec::new(),
            file_count: 0,
            row_count: 0,
            in_memory_data_size_bytes: 0,
        }
    }

    /// Returns true if the update carries no files and no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
            && self.file_count == 0
            && self.row_count == 0
            && self.in_memory_data_size_bytes == 0
    }

    /// Encodes the update to its canonical byte form.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if encoding fails.
    pub fn encode(&self) -> Result<Bytes> {
        to_canonical_bytes(self)
            .map(Bytes::from)
            .map_err(Error::serialization)
    }

    /// Decodes an update from its byte form.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if the bytes are not a valid update.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::serialization)
    }
}
