//! Deployment configuration for the metastore collaborators.
//!
//! Configuration is a plain deserializable struct so host engines can embed
//! it in whatever config surface they expose. All paths are object-store
//! style strings; nothing here touches the local filesystem except the
//! optional authorization rules file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use strata_core::table::SchemaTableName;

/// Configuration for the metastore, location, and security collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetastoreConfig {
    /// Root location new tables are created under.
    pub warehouse_root: String,
    /// Root location insert staging directories are created under.
    pub staging_root: String,
    /// Optional path to an authorization rules file.
    ///
    /// Present: procedure calls are checked against the rules. Absent: all
    /// calls are allowed.
    pub authorization_rules_path: Option<PathBuf>,
}

impl Default for MetastoreConfig {
    fn default() -> Self {
        Self {
            warehouse_root: "/warehouse".to_string(),
            staging_root: "/warehouse/.staging".to_string(),
            authorization_rules_path: None,
        }
    }
}

impl MetastoreConfig {
    /// Returns the default storage location for a table.
    #[must_use]
    pub fn table_location(&self, name: &SchemaTableName) -> String {
        format!(
            "{}/{}.db/{}",
            self.warehouse_root.trim_end_matches('/'),
            name.schema,
            name.name
        )
    }

    /// Returns the staging root for one insert, keyed by its query ID.
    #[must_use]
    pub fn insert_staging_root(&self, query_id: &str) -> String {
        format!("{}/{query_id}", self.staging_root.trim_end_matches('/'))
    }
}
