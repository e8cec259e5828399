//! Merge state and pure merge rules for snapshot reconciliation.
//!
//! The home/version precedence rules live here, separated from the executor so
//! they can be exercised without any backend in the loop:
//!
//! - A snapshot served by its home collection is authoritative for
//!   version/content regardless of arrival order. At most one snapshot per
//!   request can be home; a duplicate home claim keeps the first.
//! - Among non-home snapshots the strictly highest version wins; ties keep the
//!   earliest-merged snapshot.
//! - Classifications merge by name across all snapshots; a later merge of the
//!   same name overwrites the earlier copy (last-seen wins), which lets the
//!   phase-two home-classification sweep refresh phase-one copies.
//!
//! Merge order is the backend registration order, fixed by the coordinator's
//! fold, so every rule here is deterministic per collection set.

use std::collections::BTreeMap;

use mosaic_core::id::CollectionId;
use mosaic_core::instance::{Classification, EntitySnapshot, ReconciledEntity};

/// Running merge state for one federated read.
#[derive(Debug, Default)]
pub struct MergeState {
    best: Option<EntitySnapshot>,
    home_found: bool,
    classifications: BTreeMap<String, Classification>,
}

impl MergeState {
    /// Creates an empty merge state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one collection's snapshot into the state.
    ///
    /// `serving_collection` is the collection that returned the snapshot; it
    /// is compared against the snapshot's home collection ID to detect the
    /// home copy. The read-compare-write on the best snapshot happens in one
    /// call, so the precedence rule cannot lose updates.
    pub fn merge_snapshot(&mut self, serving_collection: &CollectionId, snapshot: EntitySnapshot) {
        self.merge_classifications(snapshot.classifications.iter().cloned());

        if snapshot.is_home(serving_collection) {
            if !self.home_found {
                self.home_found = true;
                self.best = Some(snapshot);
            }
            return;
        }

        if self.home_found {
            return;
        }

        match &self.best {
            None => self.best = Some(snapshot),
            Some(best) if snapshot.version > best.version => self.best = Some(snapshot),
            Some(_) => {}
        }
    }

    /// Folds classifications into the running set, keyed by name.
    ///
    /// Last-seen wins per name.
    pub fn merge_classifications(&mut self, classifications: impl IntoIterator<Item = Classification>) {
        for classification in classifications {
            self.classifications
                .insert(classification.name.clone(), classification);
        }
    }

    /// Returns true once the home copy has been merged.
    #[must_use]
    pub fn home_found(&self) -> bool {
        self.home_found
    }

    /// Returns true if any snapshot has been merged.
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.best.is_some()
    }

    /// Consumes the state into the reconciled entity, if any snapshot was
    /// merged.
    ///
    /// The final classification set is attached sorted by name; an empty set
    /// collapses to `None`.
    #[must_use]
    pub fn into_reconciled(self) -> Option<ReconciledEntity> {
        let classifications: Vec<Classification> = self.classifications.into_values().collect();
        self.best
            .map(|snapshot| ReconciledEntity::from_snapshot(snapshot, classifications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::id::EntityId;

    fn coll(id: &str) -> CollectionId {
        CollectionId::new_unchecked(id)
    }

    fn snapshot(entity: EntityId, version: u64, home: &str) -> EntitySnapshot {
        EntitySnapshot::new(entity, "Asset", version, coll(home))
    }

    #[test]
    fn home_copy_wins_over_higher_non_home_version() {
        let entity = EntityId::generate();
        let mut state = MergeState::new();

        state.merge_snapshot(&coll("repo-a"), snapshot(entity, 9, "repo-b"));
        state.merge_snapshot(&coll("repo-b"), snapshot(entity, 5, "repo-b"));

        let reconciled = state.into_reconciled().unwrap();
        assert_eq!(reconciled.version, 5);
    }

    #[test]
    fn home_copy_is_kept_after_later_snapshots() {
        let entity = EntityId::generate();
        let mut state = MergeState::new();

        state.merge_snapshot(&coll("repo-b"), snapshot(entity, 5, "repo-b"));
        state.merge_snapshot(&coll("repo-a"), snapshot(entity, 9, "repo-b"));

        let reconciled = state.into_reconciled().unwrap();
        assert_eq!(reconciled.version, 5);
    }

    #[test]
    fn highest_version_wins_without_home() {
        let entity = EntityId::generate();
        let mut state = MergeState::new();

        state.merge_snapshot(&coll("repo-a"), snapshot(entity, 2, "repo-x"));
        state.merge_snapshot(&coll("repo-b"), snapshot(entity, 7, "repo-x"));
        state.merge_snapshot(&coll("repo-c"), snapshot(entity, 4, "repo-x"));

        let reconciled = state.into_reconciled().unwrap();
        assert_eq!(reconciled.version, 7);
    }

    #[test]
    fn version_tie_keeps_earliest_snapshot() {
        let entity = EntityId::generate();
        let mut state = MergeState::new();

        let first = snapshot(entity, 3, "repo-x").with_property("from", "a".into());
        let second = snapshot(entity, 3, "repo-x").with_property("from", "b".into());
        state.merge_snapshot(&coll("repo-a"), first);
        state.merge_snapshot(&coll("repo-b"), second);

        let reconciled = state.into_reconciled().unwrap();
        assert_eq!(reconciled.properties["from"], "a");
    }

    #[test]
    fn classification_union_spans_all_snapshots() {
        let entity = EntityId::generate();
        let mut state = MergeState::new();

        state.merge_snapshot(
            &coll("repo-a"),
            snapshot(entity, 2, "repo-b")
                .with_classification(Classification::new("Confidential", coll("gov-repo"))),
        );
        state.merge_snapshot(
            &coll("repo-b"),
            snapshot(entity, 5, "repo-b")
                .with_classification(Classification::new("PII", coll("gov-repo"))),
        );

        let reconciled = state.into_reconciled().unwrap();
        let names: Vec<&str> = reconciled
            .classifications
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Confidential", "PII"]);
    }

    #[test]
    fn classification_merge_is_idempotent() {
        let entity = EntityId::generate();
        let mut state = MergeState::new();

        let snap = snapshot(entity, 5, "repo-b")
            .with_classification(Classification::new("PII", coll("gov-repo")));
        state.merge_snapshot(&coll("repo-b"), snap.clone());
        state.merge_snapshot(&coll("repo-b"), snap);

        let reconciled = state.into_reconciled().unwrap();
        assert_eq!(reconciled.classifications.unwrap().len(), 1);
    }

    #[test]
    fn later_classification_refreshes_same_name() {
        let mut state = MergeState::new();

        state.merge_classifications([
            Classification::new("PII", coll("repo-a")).with_property("level", "low".into())
        ]);
        state.merge_classifications([
            Classification::new("PII", coll("gov-repo")).with_property("level", "high".into())
        ]);

        let tags = &state.classifications;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["PII"].origin, coll("gov-repo"));
        assert_eq!(tags["PII"].properties["level"], "high");
    }

    #[test]
    fn empty_state_yields_no_entity() {
        assert!(MergeState::new().into_reconciled().is_none());
    }
}
