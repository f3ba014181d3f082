//! Access control for procedure invocations.
//!
//! Two implementations exist: allow-all, and rule-based with rules loaded
//! from a JSON file. Which one a deployment gets is decided by a single
//! branch at construction time, keyed on whether the configuration names a
//! rules file — see [`access_control_from_config`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use strata_core::error::{Error, Result};

use crate::config::MetastoreConfig;

/// Authorizes procedure invocations.
pub trait AccessControl: Send + Sync + 'static {
    /// Checks whether `user` may execute `procedure`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` when the invocation is denied.
    fn check_can_execute_procedure(&self, user: &str, procedure: &str) -> Result<()>;
}

/// Access control that permits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAccessControl;

impl AccessControl for AllowAllAccessControl {
    fn check_can_execute_procedure(&self, _user: &str, _procedure: &str) -> Result<()> {
        Ok(())
    }
}

/// One authorization rule.
///
/// `user` and `procedure` are exact matches; `None` matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRule {
    /// User the rule applies to; `None` matches all users.
    #[serde(default)]
    pub user: Option<String>,
    /// Procedure the rule applies to; `None` matches all procedures.
    #[serde(default)]
    pub procedure: Option<String>,
    /// Whether a match permits the invocation.
    pub allow: bool,
}

impl AccessRule {
    fn matches(&self, user: &str, procedure: &str) -> bool {
        self.user.as_deref().map_or(true, |u| u == user)
            && self.procedure.as_deref().map_or(true, |p| p == procedure)
    }
}

/// Access control driven by an ordered rule list.
///
/// The first matching rule decides; no match means allow.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedAccessControl {
    rules: Vec<AccessRule>,
}

impl RuleBasedAccessControl {
    /// Creates access control from an in-memory rule list.
    #[must_use]
    pub fn from_rules(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// Loads rules from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(|e| {
            Error::metastore_with_source(
                format!("reading authorization rules from {}", path.display()),
                e,
            )
        })?;
        let rules: Vec<AccessRule> = serde_json::from_slice(&raw).map_err(Error::serialization)?;
        Ok(Self::from_rules(rules))
    }
}

impl AccessControl for RuleBasedAccessControl {
    fn check_can_execute_procedure(&self, user: &str, procedure: &str) -> Result<()> {
        let allowed = self
            .rules
            .iter()
            .find(|rule| rule.matches(user, procedure))
            .map_or(true, |rule| rule.allow);

        if allowed {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "user {user} is not allowed to execute procedure {procedure}"
            )))
        }
    }
}

/// Selects the access-control implementation from configuration.
///
/// A rules path present in the configuration picks the rule-based
/// implementation; absent picks allow-all.
///
/// # Errors
///
/// Returns an error if a configured rules file cannot be loaded.
pub fn access_control_from_config(config: &MetastoreConfig) -> Result<Arc<dyn AccessControl>> {
    match &config.authorization_rules_path {
        Some(path) => Ok(Arc::new(RuleBasedAccessControl::load(path)?)),
        None => Ok(Arc::new(AllowAllAccessControl)),
    }
}
