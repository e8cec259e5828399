//! The federation coordinator: a payload-opaque driver for query executors.
//!
//! The coordinator owns the ordered, deduplicated set of registered metadata
//! collections. Per phase it fans the executor's backend call out with
//! bounded, order-preserving concurrency, joins the whole phase, then folds
//! the outcomes into the executor **in registration order**. Folding in a
//! fixed order makes every precedence rule deterministic regardless of which
//! backend answered first; the phase join is the barrier the two-phase state
//! machine requires.
//!
//! Sequential designs can skip the remaining phase-one backends once the home
//! copy arrives. Under concurrent dispatch that optimization is dropped: every
//! phase-one call runs, and late snapshots simply lose to the home copy in the
//! fold. The final answer is identical; only the number of backend calls
//! differs.
//!
//! Each backend call is individually bounded by the configured timeout; a call
//! that neither returns nor fails in time becomes a repository-communication
//! outcome for that collection and cannot stall the request. Cancellation is
//! cooperative: dropping the returned future drops every in-flight call.

use std::sync::Arc;

use futures::StreamExt;

use mosaic_core::collection::MetadataCollection;
use mosaic_core::error::{FederationError, Result};
use mosaic_core::id::CollectionId;

use crate::executor::{BackendOutcome, QueryExecutor};
use crate::options::FederationOptions;

/// Drives one query executor across the registered collection set.
pub struct FederationCoordinator {
    collections: Vec<Arc<dyn MetadataCollection>>,
    options: FederationOptions,
}

impl std::fmt::Debug for FederationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FederationCoordinator")
            .field("collections", &self.collections.len())
            .field("options", &self.options)
            .finish()
    }
}

impl FederationCoordinator {
    /// Creates a coordinator with no registered collections.
    #[must_use]
    pub fn new(options: FederationOptions) -> Self {
        Self {
            collections: Vec::new(),
            options,
        }
    }

    /// Registers a collection at the end of the visitation order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a collection with the same ID is already
    /// registered.
    pub fn register(&mut self, collection: Arc<dyn MetadataCollection>) -> Result<()> {
        let id = collection.collection_id();
        if self.collections.iter().any(|c| c.collection_id() == id) {
            return Err(FederationError::invalid_parameter(format!(
                "collection '{id}' is already registered"
            )));
        }
        self.collections.push(collection);
        Ok(())
    }

    /// Returns the number of registered collections.
    #[must_use]
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Drives the executor to completion and returns it for terminal access.
    ///
    /// Every registered collection is visited once per phase unless the
    /// executor reports early satisfaction during a fold. Phases repeat over
    /// the full collection set from the start, because a later phase targets a
    /// capability earlier backends were not asked for yet.
    pub async fn execute<E: QueryExecutor>(&self, mut executor: E) -> E {
        loop {
            // Build every call for this phase up front; the executor is only
            // borrowed while constructing, so the fold below can mutate it.
            let calls: Vec<(CollectionId, _)> = self
                .collections
                .iter()
                .map(|collection| {
                    (
                        collection.collection_id().clone(),
                        executor.issue(Arc::clone(collection)),
                    )
                })
                .collect();

            let timeout = self.options.backend_timeout;
            let outcomes: Vec<(CollectionId, BackendOutcome)> = futures::stream::iter(calls)
                .map(|(collection_id, call)| async move {
                    let outcome = match tokio::time::timeout(timeout, call).await {
                        Ok(outcome) => outcome,
                        Err(_) => BackendOutcome::Failure(
                            FederationError::repository_communication(format!(
                                "collection '{collection_id}' did not respond within {timeout:?}"
                            )),
                        ),
                    };
                    (collection_id, outcome)
                })
                .buffered(self.options.max_in_flight.max(1))
                .collect()
                .await;

            let mut satisfied = false;
            for (collection_id, outcome) in outcomes {
                if executor.absorb(&collection_id, outcome) {
                    satisfied = true;
                    break;
                }
            }

            if satisfied || !executor.advance() {
                return executor;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::id::EntityId;
    use mosaic_core::instance::EntitySnapshot;
    use mosaic_core::memory::MemoryCollection;

    use crate::get_entity::GetEntityExecutor;

    fn coll(id: &str) -> CollectionId {
        CollectionId::new_unchecked(id)
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut coordinator = FederationCoordinator::new(FederationOptions::default());
        coordinator
            .register(Arc::new(MemoryCollection::new(coll("repo-a"))))
            .unwrap();

        let err = coordinator
            .register(Arc::new(MemoryCollection::new(coll("repo-a"))))
            .unwrap_err();
        assert!(matches!(err, FederationError::InvalidParameter { .. }));
        assert_eq!(coordinator.collection_count(), 1);
    }

    #[tokio::test]
    async fn empty_collection_set_yields_not_known() {
        let coordinator = FederationCoordinator::new(FederationOptions::default());
        let executor = GetEntityExecutor::detail("alice", EntityId::generate());

        let err = coordinator
            .execute(executor)
            .await
            .into_entity_detail()
            .unwrap_err();
        assert!(matches!(err, FederationError::EntityNotKnown { .. }));
    }

    #[tokio::test]
    async fn visits_every_collection_in_registration_order() {
        let entity = EntityId::generate();

        // Two replicas with a version tie; the winner must be the earlier
        // registration regardless of completion order.
        let repo_a = MemoryCollection::new(coll("repo-a"));
        repo_a.store(
            EntitySnapshot::new(entity, "Asset", 3, coll("repo-x"))
                .with_property("from", "a".into()),
        );
        let repo_b = MemoryCollection::new(coll("repo-b"));
        repo_b.store(
            EntitySnapshot::new(entity, "Asset", 3, coll("repo-x"))
                .with_property("from", "b".into()),
        );

        let mut coordinator = FederationCoordinator::new(FederationOptions::default());
        coordinator.register(Arc::new(repo_a)).unwrap();
        coordinator.register(Arc::new(repo_b)).unwrap();

        let executor = GetEntityExecutor::detail("alice", entity);
        let reconciled = coordinator
            .execute(executor)
            .await
            .into_entity_detail()
            .unwrap();
        assert_eq!(reconciled.properties["from"], "a");
    }
}
