//! The query executor contract driven by the federation coordinator.
//!
//! An executor is a per-request strategy object: it knows which backend call
//! the current phase needs, how to fold one backend's outcome into its merge
//! state, and when another pass over the backend set is required. The
//! coordinator stays payload-opaque; everything entity-shaped happens here.

use std::sync::Arc;

use futures::future::BoxFuture;

use mosaic_core::collection::MetadataCollection;
use mosaic_core::error::FederationError;
use mosaic_core::id::CollectionId;
use mosaic_core::instance::{Classification, EntitySnapshot};

/// Where a multi-pass request currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    /// First pass: primary content retrieval from every collection.
    RetrievingPrimary,
    /// Second pass: sweep for classifications homed on other collections.
    RetrievingSupplementalClassifications,
}

/// Result of calling one backend for one request.
///
/// Produced by the dispatch task and consumed immediately by the executor's
/// fold. A missing capability arrives as
/// `Failure(FederationError::FunctionNotSupported)`; whether that is captured
/// or skipped is the executor's phase- and mode-dependent decision.
#[derive(Debug)]
pub enum BackendOutcome {
    /// The collection returned its view of the entity.
    Snapshot(EntitySnapshot),
    /// The collection does not store the entity.
    NotFound,
    /// The collection returned classifications it homes for the entity.
    Classifications(Vec<Classification>),
    /// The collection call failed.
    Failure(FederationError),
}

/// A per-request, stateful query strategy.
///
/// # Contract
///
/// - [`issue`](Self::issue) builds the backend call for the current phase. The
///   returned future must materialize every failure into a
///   [`BackendOutcome`]; it must not panic.
/// - [`absorb`](Self::absorb) folds one outcome into the merge state and
///   returns `true` only when the current phase is satisfied and iteration
///   should stop early. That is first-match-wins territory (e.g. creates);
///   read reconciliation always returns `false` and relies on visiting every
///   collection for the best merge.
/// - [`advance`](Self::advance) is the phase barrier: called once per pass
///   after all outcomes are folded, returning `true` when a further full pass
///   over the backend set is required.
pub trait QueryExecutor: Send {
    /// Builds the current phase's call against one collection.
    fn issue(&self, collection: Arc<dyn MetadataCollection>) -> BoxFuture<'static, BackendOutcome>;

    /// Folds one collection's outcome into the merge state.
    ///
    /// Returns `true` to stop iterating the current phase.
    fn absorb(&mut self, collection_id: &CollectionId, outcome: BackendOutcome) -> bool;

    /// Advances to the next phase if one is needed.
    ///
    /// Returns `false` when the request is complete.
    fn advance(&mut self) -> bool;
}
