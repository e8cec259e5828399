//! The metadata collection capability contract.
//!
//! A [`MetadataCollection`] is one repository behind the federation engine,
//! local or remote, the engine does not care. The engine treats each collection
//! as an opaque capability-bearing store: point queries by entity ID, optional
//! historical queries, and optional retrieval of classifications the collection
//! homes on entities stored elsewhere.
//!
//! # Capability Reporting
//!
//! Collections signal a missing capability by returning
//! [`FederationError::FunctionNotSupported`]. Whether that is a user-visible
//! failure or a silent skip is the engine's decision, not the connector's:
//! a missing historical query is user-visible, a missing home-classification
//! sweep is not.
//!
//! [`FederationError::FunctionNotSupported`]: crate::error::FederationError::FunctionNotSupported

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::id::{CollectionId, EntityId};
use crate::instance::{Classification, EntitySnapshot};

/// One metadata collection behind the federation engine.
///
/// # Contract
///
/// - `Ok(None)` from a point query means "entity not stored here" and is never
///   an error at the connector boundary; the engine decides whether absence is
///   reportable for the request at hand.
/// - Connectors return typed [`FederationError`](crate::error::FederationError)
///   variants for everything else; the engine captures them instead of letting
///   them abort the overall request.
/// - Every snapshot a collection returns carries the entity's home collection
///   ID, which the engine compares against [`collection_id`](Self::collection_id)
///   to detect the home copy.
#[async_trait]
pub trait MetadataCollection: Send + Sync + 'static {
    /// Returns this collection's unique identifier.
    fn collection_id(&self) -> &CollectionId;

    /// Retrieves the collection's current view of an entity.
    ///
    /// Returns `Ok(None)` if the entity is not stored in this collection.
    async fn get_entity(&self, user_id: &str, entity_id: EntityId)
        -> Result<Option<EntitySnapshot>>;

    /// Retrieves the collection's view of an entity at a historical time.
    ///
    /// Returns `Ok(None)` if the entity was not stored in this collection at
    /// that time. Collections without history support return
    /// `Err(FunctionNotSupported)`.
    async fn get_entity_as_of(
        &self,
        user_id: &str,
        entity_id: EntityId,
        as_of: DateTime<Utc>,
    ) -> Result<Option<EntitySnapshot>>;

    /// Retrieves classifications this collection homes on an entity stored
    /// elsewhere.
    ///
    /// Returns an empty vector if the collection homes no classifications for
    /// the entity. Collections without this capability return
    /// `Err(FunctionNotSupported)`.
    async fn get_home_classifications(
        &self,
        user_id: &str,
        entity_id: EntityId,
    ) -> Result<Vec<Classification>>;
}
