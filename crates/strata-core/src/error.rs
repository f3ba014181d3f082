//! Error types and result aliases for strata.
//!
//! This module defines the shared error types used across all strata components.
//! Every failure is surfaced to the caller as a typed error; nothing is
//! logged-and-suppressed inside the workflow itself.

use std::fmt;

/// The result type used throughout strata.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in strata operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied argument was invalid.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of what made the argument invalid.
        message: String,
    },

    /// The resource being created is already registered in the catalog.
    #[error("already exists: {resource_type} {name}")]
    AlreadyExists {
        /// The type of resource that already exists.
        resource_type: &'static str,
        /// The name the conflict was detected under.
        name: String,
    },

    /// The requested resource was not found.
    #[error("not found: {resource_type} with id {id}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A metastore or location-service collaborator call failed.
    #[error("metastore error: {message}")]
    Metastore {
        /// Description of the collaborator failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A failure occurred after a transaction began but before it committed.
    ///
    /// No compensating cleanup is attempted; the metastore collaborator's
    /// all-or-nothing commit semantics guarantee no partial partition is
    /// visible.
    #[error("transaction aborted: {message}")]
    TransactionAborted {
        /// Description of the step that failed.
        message: String,
        /// The originating error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new invalid-argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a new already-exists error.
    #[must_use]
    pub fn already_exists(resource_type: &'static str, name: impl fmt::Display) -> Self {
        Self::AlreadyExists {
            resource_type,
            name: name.to_string(),
        }
    }

    /// Creates a new resource not found error.
    #[must_use]
    pub fn resource_not_found(resource_type: &'static str, id: impl fmt::Display) -> Self {
        Self::ResourceNotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a new metastore error with the given message.
    #[must_use]
    pub fn metastore(message: impl Into<String>) -> Self {
        Self::Metastore {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new metastore error with a source cause.
    #[must_use]
    pub fn metastore_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Metastore {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps a post-begin failure as a transaction abort.
    #[must_use]
    pub fn transaction_aborted(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TransactionAborted {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization(message: impl fmt::Display) -> Self {
        Self::Serialization {
            message: message.to_string(),
        }
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_display() {
        let err = Error::already_exists("partition", "year=2024/region=west");
        assert_eq!(
            err.to_string(),
            "already exists: partition year=2024/region=west"
        );
    }

    #[test]
    fn test_transaction_aborted_preserves_source() {
        let cause = Error::metastore("connection reset");
        let err = Error::transaction_aborted("finishing insert", cause);

        assert!(err.to_string().contains("finishing insert"));
        let source = std::error::Error::source(&err).expect("source should be set");
        assert!(source.to_string().contains("connection reset"));
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = Error::invalid_argument("bad column order");
        assert_eq!(err.to_string(), "invalid argument: bad column order");
    }
}
