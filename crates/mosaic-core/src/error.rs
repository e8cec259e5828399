//! Error types and result aliases for Mosaic.
//!
//! This module defines the federation failure taxonomy shared by the engine and
//! every metadata collection connector. Errors are structured for programmatic
//! handling: the engine routes each variant through a per-request accumulator
//! and surfaces exactly one of them per failed request.

use std::fmt;

/// The result type used throughout Mosaic.
pub type Result<T> = std::result::Result<T, FederationError>;

/// Errors that can occur in federated catalog operations.
///
/// Each variant corresponds to one captured-failure kind in the engine's
/// exception accumulator. Connectors should return the most specific variant
/// they can; anything else is wrapped as [`FederationError::Generic`] with the
/// originating collection id so no failure is silently dropped.
#[derive(Debug, thiserror::Error)]
pub enum FederationError {
    /// A request parameter was missing or invalid.
    #[error("invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what made the parameter invalid.
        message: String,
    },

    /// The requested entity is not known to any consulted collection.
    #[error("entity {entity_id} is not known")]
    EntityNotKnown {
        /// The identifier that was looked up.
        entity_id: String,
    },

    /// The collection only holds a proxy (reference stub) for the entity.
    #[error("entity {entity_id} is only a proxy in this collection")]
    EntityProxyOnly {
        /// The identifier that was looked up.
        entity_id: String,
    },

    /// Communication with a repository failed or timed out.
    #[error("repository communication error: {message}")]
    RepositoryCommunication {
        /// Description of the communication failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The user is not permitted to perform this operation.
    #[error("user {user_id} is not authorized: {message}")]
    NotAuthorized {
        /// The user that issued the request.
        user_id: String,
        /// Description of the denied operation.
        message: String,
    },

    /// The collection does not support the requested function.
    #[error("function not supported: {message}")]
    FunctionNotSupported {
        /// Description of the unsupported function.
        message: String,
    },

    /// An unclassified failure from a collection connector.
    #[error("unexpected error from collection {collection_id}: {message}")]
    Generic {
        /// The collection that produced the failure.
        collection_id: String,
        /// The original error message.
        message: String,
    },
}

impl FederationError {
    /// Creates an invalid-parameter error with the given message.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates an entity-not-known error for the given entity.
    #[must_use]
    pub fn entity_not_known(entity_id: impl fmt::Display) -> Self {
        Self::EntityNotKnown {
            entity_id: entity_id.to_string(),
        }
    }

    /// Creates a proxy-only error for the given entity.
    #[must_use]
    pub fn entity_proxy_only(entity_id: impl fmt::Display) -> Self {
        Self::EntityProxyOnly {
            entity_id: entity_id.to_string(),
        }
    }

    /// Creates a repository-communication error with the given message.
    #[must_use]
    pub fn repository_communication(message: impl Into<String>) -> Self {
        Self::RepositoryCommunication {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a repository-communication error with a source cause.
    #[must_use]
    pub fn repository_communication_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::RepositoryCommunication {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a not-authorized error for the given user.
    #[must_use]
    pub fn not_authorized(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotAuthorized {
            user_id: user_id.into(),
            message: message.into(),
        }
    }

    /// Creates a function-not-supported error with the given message.
    #[must_use]
    pub fn function_not_supported(message: impl Into<String>) -> Self {
        Self::FunctionNotSupported {
            message: message.into(),
        }
    }

    /// Creates a generic error wrapping an unclassified connector failure.
    #[must_use]
    pub fn generic(collection_id: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::Generic {
            collection_id: collection_id.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = FederationError::not_authorized("alice", "read denied");
        assert!(err.to_string().contains("alice"));

        let err = FederationError::generic("coll-1", "boom");
        assert!(err.to_string().contains("coll-1"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn communication_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timeout");
        let err = FederationError::repository_communication_with_source("call failed", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
