//! Strongly-typed identifiers for Mosaic entities and collections.
//!
//! All identifiers are:
//! - **Strongly typed**: Prevents mixing up different ID types at compile time
//! - **Globally unique**: Entity IDs are UUIDs, request IDs are ULIDs
//!
//! # Example
//!
//! ```rust
//! use mosaic_core::id::{CollectionId, EntityId};
//!
//! let entity = EntityId::generate();
//! let collection = CollectionId::new("archive-east").unwrap();
//!
//! // IDs are different types - this won't compile:
//! // let wrong: EntityId = collection;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;
use uuid::Uuid;

use crate::error::{FederationError, Result};

/// A unique identifier for a metadata entity.
///
/// Entities are the unit of federation: one logical entity may be stored
/// redundantly across many metadata collections under the same ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generates a new unique entity ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entity ID from a raw UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = FederationError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| FederationError::InvalidParameter {
                message: format!("invalid entity ID '{s}': {e}"),
            })
    }
}

/// A unique identifier for one metadata collection.
///
/// Collection IDs must be:
/// - Non-empty
/// - Lowercase alphanumeric with hyphens
/// - Between 3 and 63 characters
///
/// The collection ID doubles as the home marker: a snapshot whose home
/// collection ID equals the serving collection's ID is the home copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    /// Creates a new collection ID after validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection ID is invalid.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Creates a collection ID without validation.
    ///
    /// Intended for IDs that have already been validated (e.g. read back from
    /// a registry).
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the collection ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(FederationError::InvalidParameter {
                message: "collection ID cannot be empty".to_string(),
            });
        }

        if id.len() < 3 {
            return Err(FederationError::InvalidParameter {
                message: format!("collection ID '{id}' is too short (minimum 3 characters)"),
            });
        }

        if id.len() > 63 {
            return Err(FederationError::InvalidParameter {
                message: format!("collection ID '{id}' is too long (maximum 63 characters)"),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(FederationError::InvalidParameter {
                message: format!(
                    "collection ID '{id}' contains invalid characters \
                     (lowercase alphanumeric and hyphens only)"
                ),
            });
        }

        Ok(())
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionId {
    type Err = FederationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// A unique identifier for one federated request, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Ulid);

impl RequestId {
    /// Generates a new unique request ID.
    ///
    /// ULIDs sort lexicographically by creation time, which keeps correlated
    /// log lines in request order.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_roundtrip() {
        let id = EntityId::generate();
        let s = id.to_string();
        let parsed: EntityId = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn entity_ids_are_unique() {
        assert_ne!(EntityId::generate(), EntityId::generate());
    }

    #[test]
    fn invalid_entity_id_returns_error() {
        let result: Result<EntityId> = "not-a-uuid".parse();
        assert!(result.is_err());
    }

    #[test]
    fn collection_id_accepts_valid_names() {
        assert!(CollectionId::new("archive-east").is_ok());
        assert!(CollectionId::new("repo-01").is_ok());
    }

    #[test]
    fn collection_id_rejects_invalid_names() {
        assert!(CollectionId::new("").is_err());
        assert!(CollectionId::new("ab").is_err());
        assert!(CollectionId::new("Has-Uppercase").is_err());
        assert!(CollectionId::new("a".repeat(64)).is_err());
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
