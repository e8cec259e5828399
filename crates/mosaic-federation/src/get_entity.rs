//! The entity-retrieval executor.
//!
//! One executor type covers the three read operations, selected by
//! [`RetrievalMode`] at construction rather than by subclassing:
//!
//! - `CheckExistence`: tolerant. A collection not storing the entity is
//!   silent, and the terminal accessor returns `None` when nothing was found.
//! - `Detail`: strict. Per-collection not-found is captured as
//!   `EntityNotKnown` and surfaced if no collection produces the entity.
//! - `DetailAsOf`: strict, routed through the historical query. A collection
//!   without history support is captured as `FunctionNotSupported`: absence of
//!   historical support is user-visible and must not be conflated with
//!   "entity not found".
//!
//! Phase one merges snapshots under the home/version precedence rules. When
//! the fold ends with the home copy known, the executor advances to phase two
//! and sweeps every collection for classifications homed on entities stored
//! elsewhere; collections without that capability are skipped silently.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use mosaic_core::collection::MetadataCollection;
use mosaic_core::error::{FederationError, Result};
use mosaic_core::id::{CollectionId, EntityId};
use mosaic_core::instance::ReconciledEntity;

use crate::accumulator::{ErrorAccumulator, FailureKind};
use crate::executor::{BackendOutcome, ExecutionPhase, QueryExecutor};
use crate::merge::MergeState;

/// Which read operation this executor performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Existence check: not-found is a normal `None` outcome.
    CheckExistence,
    /// Detail fetch: not-found is a reportable failure.
    Detail,
    /// Historical detail fetch at the given timestamp.
    DetailAsOf(DateTime<Utc>),
}

/// Executor for the entity read operations.
#[derive(Debug)]
pub struct GetEntityExecutor {
    user_id: String,
    entity_id: EntityId,
    mode: RetrievalMode,
    phase: ExecutionPhase,
    state: MergeState,
    accumulator: ErrorAccumulator,
}

impl GetEntityExecutor {
    /// Creates an executor for the given mode.
    #[must_use]
    pub fn new(user_id: impl Into<String>, entity_id: EntityId, mode: RetrievalMode) -> Self {
        Self {
            user_id: user_id.into(),
            entity_id,
            mode,
            phase: ExecutionPhase::RetrievingPrimary,
            state: MergeState::new(),
            accumulator: ErrorAccumulator::new(),
        }
    }

    /// Creates a tolerant existence-check executor.
    #[must_use]
    pub fn check_existence(user_id: impl Into<String>, entity_id: EntityId) -> Self {
        Self::new(user_id, entity_id, RetrievalMode::CheckExistence)
    }

    /// Creates a strict detail-fetch executor.
    #[must_use]
    pub fn detail(user_id: impl Into<String>, entity_id: EntityId) -> Self {
        Self::new(user_id, entity_id, RetrievalMode::Detail)
    }

    /// Creates a historical detail-fetch executor.
    #[must_use]
    pub fn detail_as_of(
        user_id: impl Into<String>,
        entity_id: EntityId,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self::new(user_id, entity_id, RetrievalMode::DetailAsOf(as_of))
    }

    /// Returns the executor's current phase.
    #[must_use]
    pub fn phase(&self) -> ExecutionPhase {
        self.phase
    }

    fn take_reconciled(&mut self) -> Option<ReconciledEntity> {
        std::mem::take(&mut self.state).into_reconciled()
    }

    /// Terminal accessor for the existence check.
    ///
    /// Returns the reconciled entity if any collection produced one, `None` if
    /// the entity is simply not known anywhere.
    ///
    /// # Errors
    ///
    /// Raises a captured communication, authorization, or invalid-parameter
    /// failure, in that precedence order.
    pub fn into_known_entity(mut self) -> Result<Option<ReconciledEntity>> {
        if let Some(entity) = self.take_reconciled() {
            return Ok(Some(entity));
        }

        self.accumulator.raise_first(&[
            FailureKind::RepositoryCommunication,
            FailureKind::NotAuthorized,
            FailureKind::InvalidParameter,
        ])?;

        Ok(None)
    }

    /// Terminal accessor for the detail fetch.
    ///
    /// # Errors
    ///
    /// Raises the captured failure of highest precedence: communication,
    /// authorization, and invalid-parameter failures first (they are more
    /// actionable and more likely the root cause than "no collection had it"),
    /// then proxy-only, not-known, and unclassified failures. Raises a
    /// synthesized `EntityNotKnown` when nothing at all was captured.
    pub fn into_entity_detail(mut self) -> Result<ReconciledEntity> {
        if let Some(entity) = self.take_reconciled() {
            return Ok(entity);
        }

        let entity_id = self.entity_id;
        self.accumulator.raise_first(&[
            FailureKind::RepositoryCommunication,
            FailureKind::NotAuthorized,
            FailureKind::InvalidParameter,
            FailureKind::EntityProxyOnly,
            FailureKind::EntityNotKnown,
            FailureKind::Generic,
        ])?;

        Err(FederationError::entity_not_known(entity_id))
    }

    /// Terminal accessor for the historical detail fetch.
    ///
    /// # Errors
    ///
    /// As [`into_entity_detail`](Self::into_entity_detail), with
    /// `FunctionNotSupported` raised after not-known: when every collection
    /// lacks historical queries, that is the surfaced failure even though no
    /// collection reported the entity as missing.
    pub fn into_entity_detail_history(mut self) -> Result<ReconciledEntity> {
        if let Some(entity) = self.take_reconciled() {
            return Ok(entity);
        }

        let entity_id = self.entity_id;
        self.accumulator.raise_first(&[
            FailureKind::RepositoryCommunication,
            FailureKind::NotAuthorized,
            FailureKind::InvalidParameter,
            FailureKind::EntityProxyOnly,
            FailureKind::EntityNotKnown,
            FailureKind::FunctionNotSupported,
            FailureKind::Generic,
        ])?;

        Err(FederationError::entity_not_known(entity_id))
    }
}

impl QueryExecutor for GetEntityExecutor {
    fn issue(&self, collection: Arc<dyn MetadataCollection>) -> BoxFuture<'static, BackendOutcome> {
        let user_id = self.user_id.clone();
        let entity_id = self.entity_id;

        match (self.phase, self.mode) {
            (ExecutionPhase::RetrievingPrimary, RetrievalMode::DetailAsOf(as_of)) => {
                Box::pin(async move {
                    match collection.get_entity_as_of(&user_id, entity_id, as_of).await {
                        Ok(Some(snapshot)) => BackendOutcome::Snapshot(snapshot),
                        Ok(None) => BackendOutcome::NotFound,
                        Err(error) => BackendOutcome::Failure(error),
                    }
                })
            }
            (ExecutionPhase::RetrievingPrimary, _) => Box::pin(async move {
                match collection.get_entity(&user_id, entity_id).await {
                    Ok(Some(snapshot)) => BackendOutcome::Snapshot(snapshot),
                    Ok(None) => BackendOutcome::NotFound,
                    Err(error) => BackendOutcome::Failure(error),
                }
            }),
            (ExecutionPhase::RetrievingSupplementalClassifications, _) => Box::pin(async move {
                match collection.get_home_classifications(&user_id, entity_id).await {
                    Ok(classifications) => BackendOutcome::Classifications(classifications),
                    Err(error) => BackendOutcome::Failure(error),
                }
            }),
        }
    }

    fn absorb(&mut self, collection_id: &CollectionId, outcome: BackendOutcome) -> bool {
        match self.phase {
            ExecutionPhase::RetrievingPrimary => match outcome {
                BackendOutcome::Snapshot(snapshot) => {
                    self.state.merge_snapshot(collection_id, snapshot);
                }
                BackendOutcome::NotFound => {
                    // Tolerant mode treats absence as a normal outcome; strict
                    // modes keep it reportable in case nobody has the entity.
                    if self.mode != RetrievalMode::CheckExistence {
                        self.accumulator.capture(
                            collection_id,
                            FederationError::entity_not_known(self.entity_id),
                        );
                    }
                }
                BackendOutcome::Failure(error) => {
                    self.accumulator.capture(collection_id, error);
                }
                BackendOutcome::Classifications(_) => {
                    tracing::debug!(
                        collection = %collection_id,
                        "ignoring classification outcome in primary phase"
                    );
                }
            },
            ExecutionPhase::RetrievingSupplementalClassifications => match outcome {
                BackendOutcome::Classifications(classifications) => {
                    self.state.merge_classifications(classifications);
                }
                BackendOutcome::Failure(FederationError::FunctionNotSupported { .. }) => {
                    // Expected: only some repositories can home classifications
                    // on entities stored elsewhere.
                    tracing::debug!(
                        collection = %collection_id,
                        "collection does not support home classifications"
                    );
                }
                BackendOutcome::Failure(error) => {
                    self.accumulator.capture(collection_id, error);
                }
                BackendOutcome::Snapshot(_) | BackendOutcome::NotFound => {
                    tracing::debug!(
                        collection = %collection_id,
                        "ignoring entity outcome in supplemental phase"
                    );
                }
            },
        }

        false
    }

    fn advance(&mut self) -> bool {
        if self.phase == ExecutionPhase::RetrievingPrimary && self.state.home_found() {
            self.phase = ExecutionPhase::RetrievingSupplementalClassifications;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::instance::{Classification, EntitySnapshot};

    fn coll(id: &str) -> CollectionId {
        CollectionId::new_unchecked(id)
    }

    fn snapshot(entity: EntityId, version: u64, home: &str) -> EntitySnapshot {
        EntitySnapshot::new(entity, "Asset", version, coll(home))
    }

    #[test]
    fn advances_to_phase_two_only_when_home_found() {
        let entity = EntityId::generate();

        let mut executor = GetEntityExecutor::detail("alice", entity);
        executor.absorb(
            &coll("repo-a"),
            BackendOutcome::Snapshot(snapshot(entity, 4, "repo-x")),
        );
        assert!(!executor.advance());

        let mut executor = GetEntityExecutor::detail("alice", entity);
        executor.absorb(
            &coll("repo-a"),
            BackendOutcome::Snapshot(snapshot(entity, 4, "repo-a")),
        );
        assert!(executor.advance());
        assert_eq!(
            executor.phase(),
            ExecutionPhase::RetrievingSupplementalClassifications
        );
        // Phase two is the last pass.
        assert!(!executor.advance());
    }

    #[test]
    fn check_existence_swallows_not_found() {
        let entity = EntityId::generate();
        let mut executor = GetEntityExecutor::check_existence("alice", entity);
        executor.absorb(&coll("repo-a"), BackendOutcome::NotFound);
        executor.absorb(&coll("repo-b"), BackendOutcome::NotFound);

        assert!(executor.into_known_entity().unwrap().is_none());
    }

    #[test]
    fn detail_raises_not_known_when_nothing_found() {
        let entity = EntityId::generate();
        let mut executor = GetEntityExecutor::detail("alice", entity);
        executor.absorb(&coll("repo-a"), BackendOutcome::NotFound);

        let err = executor.into_entity_detail().unwrap_err();
        assert!(matches!(err, FederationError::EntityNotKnown { .. }));
    }

    #[test]
    fn detail_synthesizes_not_known_with_empty_accumulator() {
        let entity = EntityId::generate();
        let executor = GetEntityExecutor::detail("alice", entity);

        let err = executor.into_entity_detail().unwrap_err();
        assert!(matches!(err, FederationError::EntityNotKnown { .. }));
    }

    #[test]
    fn communication_failure_outranks_not_found() {
        let entity = EntityId::generate();
        let mut executor = GetEntityExecutor::detail("alice", entity);
        executor.absorb(&coll("repo-a"), BackendOutcome::NotFound);
        executor.absorb(
            &coll("repo-b"),
            BackendOutcome::Failure(FederationError::repository_communication("socket closed")),
        );

        let err = executor.into_entity_detail().unwrap_err();
        assert!(matches!(
            err,
            FederationError::RepositoryCommunication { .. }
        ));
    }

    #[test]
    fn positive_result_outranks_captured_failures() {
        let entity = EntityId::generate();
        let mut executor = GetEntityExecutor::detail("alice", entity);
        executor.absorb(
            &coll("repo-a"),
            BackendOutcome::Failure(FederationError::repository_communication("socket closed")),
        );
        executor.absorb(
            &coll("repo-b"),
            BackendOutcome::Snapshot(snapshot(entity, 2, "repo-x")),
        );

        let reconciled = executor.into_entity_detail().unwrap();
        assert_eq!(reconciled.version, 2);
    }

    #[test]
    fn history_surfaces_not_supported_when_no_backend_has_history() {
        let entity = EntityId::generate();
        let mut executor = GetEntityExecutor::detail_as_of("alice", entity, Utc::now());
        executor.absorb(
            &coll("repo-a"),
            BackendOutcome::Failure(FederationError::function_not_supported("no history")),
        );
        executor.absorb(
            &coll("repo-b"),
            BackendOutcome::Failure(FederationError::function_not_supported("no history")),
        );

        let err = executor.into_entity_detail_history().unwrap_err();
        assert!(matches!(err, FederationError::FunctionNotSupported { .. }));
    }

    #[test]
    fn phase_two_skips_unsupporting_collections() {
        let entity = EntityId::generate();
        let mut executor = GetEntityExecutor::detail("alice", entity);
        executor.absorb(
            &coll("repo-a"),
            BackendOutcome::Snapshot(snapshot(entity, 1, "repo-a")),
        );
        assert!(executor.advance());

        executor.absorb(
            &coll("repo-b"),
            BackendOutcome::Failure(FederationError::function_not_supported("cannot home")),
        );
        executor.absorb(
            &coll("gov-repo"),
            BackendOutcome::Classifications(vec![Classification::new("PII", coll("gov-repo"))]),
        );

        let reconciled = executor.into_entity_detail().unwrap();
        let tags = reconciled.classifications.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "PII");
    }
}
