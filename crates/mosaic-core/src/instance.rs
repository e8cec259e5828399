//! Instance data model for federated entities.
//!
//! A single logical entity may be stored redundantly across many metadata
//! collections. Each collection hands the engine an [`EntitySnapshot`]: its
//! own, possibly stale, view of the entity. The engine merges snapshots into
//! one [`ReconciledEntity`] under the home/version precedence rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::id::{CollectionId, EntityId};

/// A named tag attached to an entity by some collection.
///
/// Classifications may be homed on a different collection than the entity
/// itself: a governance repository can classify an asset it does not store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Classification name, unique within one entity's classification set.
    pub name: String,

    /// The collection that homes this classification.
    pub origin: CollectionId,

    /// Classification properties as free-form JSON values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl Classification {
    /// Creates a classification with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>, origin: CollectionId) -> Self {
        Self {
            name: name.into(),
            origin,
            properties: BTreeMap::new(),
        }
    }

    /// Sets a property on the classification.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// One collection's view of an entity at call time.
///
/// Transient: owned by the engine only for the duration of one merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// The entity's unique identifier.
    pub entity_id: EntityId,

    /// The entity's type name (e.g. `Asset`, `GlossaryTerm`).
    pub type_name: String,

    /// Monotonically increasing version number maintained by the home
    /// collection and copied along with replicas.
    pub version: u64,

    /// The collection that owns this entity's identity.
    pub home_collection_id: CollectionId,

    /// Classifications attached to the entity in this collection's view.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<Classification>,

    /// Set when this snapshot answers a historical (as-of) query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,

    /// Entity properties as free-form JSON values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl EntitySnapshot {
    /// Creates a snapshot with no classifications or properties.
    #[must_use]
    pub fn new(
        entity_id: EntityId,
        type_name: impl Into<String>,
        version: u64,
        home_collection_id: CollectionId,
    ) -> Self {
        Self {
            entity_id,
            type_name: type_name.into(),
            version,
            home_collection_id,
            classifications: Vec::new(),
            as_of: None,
            properties: BTreeMap::new(),
        }
    }

    /// Adds a classification to the snapshot.
    #[must_use]
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classifications.push(classification);
        self
    }

    /// Sets an entity property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Returns true if this snapshot was served by its home collection.
    #[must_use]
    pub fn is_home(&self, serving_collection: &CollectionId) -> bool {
        &self.home_collection_id == serving_collection
    }
}

/// The single answer produced by merging snapshots from many collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledEntity {
    /// The entity's unique identifier.
    pub entity_id: EntityId,

    /// The entity's type name.
    pub type_name: String,

    /// The winning version after home/version precedence.
    pub version: u64,

    /// The collection that owns this entity's identity.
    pub home_collection_id: CollectionId,

    /// The merged classification set, union by name across all collections.
    ///
    /// `None` when the merged set is empty, so an entity with no
    /// classifications anywhere looks the same as one that was never tagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifications: Option<Vec<Classification>>,

    /// Entity properties from the winning snapshot.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl ReconciledEntity {
    /// Builds the reconciled entity from the winning snapshot and the final
    /// merged classification set.
    ///
    /// An empty classification set collapses to `None`.
    #[must_use]
    pub fn from_snapshot(snapshot: EntitySnapshot, classifications: Vec<Classification>) -> Self {
        Self {
            entity_id: snapshot.entity_id,
            type_name: snapshot.type_name,
            version: snapshot.version,
            home_collection_id: snapshot.home_collection_id,
            classifications: if classifications.is_empty() {
                None
            } else {
                Some(classifications)
            },
            properties: snapshot.properties,
        }
    }
}
