//! The caller-facing federated catalog surface.
//!
//! [`FederatedCatalog`] wires the coordinator and the entity-retrieval
//! executor into the three read operations. Each operation validates its
//! parameters up front, runs inside a federation span carrying a fresh request
//! ID, and records request metrics.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::Instrument;

use mosaic_core::collection::MetadataCollection;
use mosaic_core::error::{FederationError, Result};
use mosaic_core::id::{EntityId, RequestId};
use mosaic_core::instance::ReconciledEntity;
use mosaic_core::observability::federation_span;

use crate::coordinator::FederationCoordinator;
use crate::get_entity::GetEntityExecutor;
use crate::metrics::record_request;
use crate::options::FederationOptions;

/// A federated view over a set of registered metadata collections.
#[derive(Debug)]
pub struct FederatedCatalog {
    coordinator: FederationCoordinator,
}

impl FederatedCatalog {
    /// Creates a catalog with no registered collections.
    #[must_use]
    pub fn new(options: FederationOptions) -> Self {
        Self {
            coordinator: FederationCoordinator::new(options),
        }
    }

    /// Registers a metadata collection.
    ///
    /// Collections are visited in registration order; order matters for
    /// version ties and for which collection a surfaced failure names.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a collection with the same ID is already
    /// registered.
    pub fn register_collection(&mut self, collection: Arc<dyn MetadataCollection>) -> Result<()> {
        self.coordinator.register(collection)
    }

    /// Returns the number of registered collections.
    #[must_use]
    pub fn collection_count(&self) -> usize {
        self.coordinator.collection_count()
    }

    /// Checks whether an entity is known to any collection.
    ///
    /// Returns `Ok(None)` when no collection stores the entity; absence is not
    /// an error for this operation.
    ///
    /// # Errors
    ///
    /// Returns captured communication, authorization, or invalid-parameter
    /// failures when no collection produced a positive result.
    pub async fn check_known(
        &self,
        user_id: &str,
        entity_id: EntityId,
    ) -> Result<Option<ReconciledEntity>> {
        validate_user_id(user_id)?;

        let executor = GetEntityExecutor::check_existence(user_id, entity_id);
        self.run("check_known", user_id, entity_id, executor)
            .await
            .into_known_entity()
    }

    /// Returns the reconciled detail of an entity.
    ///
    /// # Errors
    ///
    /// Returns the highest-precedence captured failure: communication,
    /// authorization, invalid-parameter, proxy-only, then not-known. Returns
    /// `EntityNotKnown` when no collection stores the entity.
    pub async fn get_detail(&self, user_id: &str, entity_id: EntityId) -> Result<ReconciledEntity> {
        validate_user_id(user_id)?;

        let executor = GetEntityExecutor::detail(user_id, entity_id);
        self.run("get_detail", user_id, entity_id, executor)
            .await
            .into_entity_detail()
    }

    /// Returns the reconciled detail of an entity as of a historical time.
    ///
    /// # Errors
    ///
    /// As [`get_detail`](Self::get_detail), and additionally:
    /// - `InvalidParameter` for a timestamp in the future, rejected before any
    ///   collection is called.
    /// - `FunctionNotSupported` when no collection honors historical queries.
    pub async fn get_detail_as_of(
        &self,
        user_id: &str,
        entity_id: EntityId,
        as_of: DateTime<Utc>,
    ) -> Result<ReconciledEntity> {
        validate_user_id(user_id)?;
        if as_of > Utc::now() {
            return Err(FederationError::invalid_parameter(format!(
                "as-of time {as_of} is in the future"
            )));
        }

        let executor = GetEntityExecutor::detail_as_of(user_id, entity_id, as_of);
        self.run("get_detail_as_of", user_id, entity_id, executor)
            .await
            .into_entity_detail_history()
    }

    async fn run(
        &self,
        operation: &str,
        user_id: &str,
        entity_id: EntityId,
        executor: GetEntityExecutor,
    ) -> GetEntityExecutor {
        let request_id = RequestId::generate();
        let span = federation_span(
            operation,
            &request_id.to_string(),
            user_id,
            &entity_id.to_string(),
        );

        let started = Instant::now();
        let executor = self.coordinator.execute(executor).instrument(span).await;
        record_request(operation, started.elapsed().as_secs_f64());

        executor
    }
}

fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(FederationError::invalid_parameter(
            "user ID cannot be empty",
        ));
    }
    Ok(())
}
