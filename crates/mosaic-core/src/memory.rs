//! In-memory metadata collection for testing and embedding.
//!
//! Thread-safe via `RwLock`. Not suitable for production. Capability toggles
//! let tests model the full spread of real connectors: repositories without
//! history support and repositories that cannot home classifications on
//! entities stored elsewhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::collection::MetadataCollection;
use crate::error::{FederationError, Result};
use crate::id::{CollectionId, EntityId};
use crate::instance::{Classification, EntitySnapshot};

/// An in-memory [`MetadataCollection`].
///
/// Stores current snapshots, an append-only version history per entity, and a
/// set of home classifications for entities stored elsewhere.
#[derive(Debug)]
pub struct MemoryCollection {
    collection_id: CollectionId,
    entities: RwLock<HashMap<EntityId, Vec<EntitySnapshot>>>,
    home_classifications: RwLock<HashMap<EntityId, Vec<Classification>>>,
    supports_history: bool,
    supports_home_classifications: bool,
}

impl MemoryCollection {
    /// Creates an empty collection with all capabilities enabled.
    #[must_use]
    pub fn new(collection_id: CollectionId) -> Self {
        Self {
            collection_id,
            entities: RwLock::new(HashMap::new()),
            home_classifications: RwLock::new(HashMap::new()),
            supports_history: true,
            supports_home_classifications: true,
        }
    }

    /// Disables the historical (as-of) query capability.
    #[must_use]
    pub fn without_history(mut self) -> Self {
        self.supports_history = false;
        self
    }

    /// Disables the home-classification retrieval capability.
    #[must_use]
    pub fn without_home_classifications(mut self) -> Self {
        self.supports_home_classifications = false;
        self
    }

    /// Stores a snapshot, appending to the entity's version history.
    ///
    /// The most recently stored snapshot is the collection's current view.
    pub fn store(&self, snapshot: EntitySnapshot) {
        self.entities
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(snapshot.entity_id)
            .or_default()
            .push(snapshot);
    }

    /// Records a classification this collection homes for an entity stored
    /// elsewhere.
    pub fn store_home_classification(&self, entity_id: EntityId, classification: Classification) {
        self.home_classifications
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(entity_id)
            .or_default()
            .push(classification);
    }
}

#[async_trait]
impl MetadataCollection for MemoryCollection {
    fn collection_id(&self) -> &CollectionId {
        &self.collection_id
    }

    async fn get_entity(
        &self,
        _user_id: &str,
        entity_id: EntityId,
    ) -> Result<Option<EntitySnapshot>> {
        let entities = self
            .entities
            .read()
            .map_err(|_| FederationError::repository_communication("entity lock poisoned"))?;
        Ok(entities
            .get(&entity_id)
            .and_then(|history| history.last())
            .cloned())
    }

    async fn get_entity_as_of(
        &self,
        _user_id: &str,
        entity_id: EntityId,
        as_of: DateTime<Utc>,
    ) -> Result<Option<EntitySnapshot>> {
        if !self.supports_history {
            return Err(FederationError::function_not_supported(format!(
                "collection {} does not support historical queries",
                self.collection_id
            )));
        }

        let entities = self
            .entities
            .read()
            .map_err(|_| FederationError::repository_communication("entity lock poisoned"))?;

        // Highest stored version whose as-of marker does not post-date the
        // request. Snapshots without a marker are treated as always-present.
        let found = entities.get(&entity_id).and_then(|history| {
            history
                .iter()
                .filter(|s| s.as_of.is_none_or(|t| t <= as_of))
                .max_by_key(|s| s.version)
                .cloned()
        });

        Ok(found.map(|mut snapshot| {
            snapshot.as_of = Some(as_of);
            snapshot
        }))
    }

    async fn get_home_classifications(
        &self,
        _user_id: &str,
        entity_id: EntityId,
    ) -> Result<Vec<Classification>> {
        if !self.supports_home_classifications {
            return Err(FederationError::function_not_supported(format!(
                "collection {} does not home classifications",
                self.collection_id
            )));
        }

        let map = self.home_classifications.read().map_err(|_| {
            FederationError::repository_communication("classification lock poisoned")
        })?;
        Ok(map.get(&entity_id).cloned().unwrap_or_default())
    }
}
