//! Per-request exception accumulation.
//!
//! No backend failure ever aborts a federated request: the executor hands every
//! failure to an [`ErrorAccumulator`], and only after all applicable backends
//! have been consulted does the terminal accessor pick, via a caller-supplied
//! precedence order, the single failure (if any) to surface. Callers therefore
//! see exactly one failure kind per failed request; the full per-collection
//! picture goes to the log stream at capture time.

use std::collections::HashMap;

use mosaic_core::error::{FederationError, Result};
use mosaic_core::id::CollectionId;

use crate::metrics::record_backend_failure;

/// The recognized failure kinds, one accumulator slot each.
///
/// Precedence between kinds is request-mode policy: terminal accessors pass an
/// ordered list of kinds to [`ErrorAccumulator::raise_first`] rather than the
/// accumulator hard-coding an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A request parameter was missing or invalid.
    InvalidParameter,
    /// The entity is not known to the collection.
    EntityNotKnown,
    /// The collection holds only a proxy for the entity.
    EntityProxyOnly,
    /// Communication with the collection failed or timed out.
    RepositoryCommunication,
    /// The user is not permitted to perform the operation.
    NotAuthorized,
    /// The collection does not support the requested function.
    FunctionNotSupported,
    /// An unclassified failure.
    Generic,
}

impl FailureKind {
    /// Returns the kind slot for a federation error.
    #[must_use]
    pub fn of(error: &FederationError) -> Self {
        match error {
            FederationError::InvalidParameter { .. } => Self::InvalidParameter,
            FederationError::EntityNotKnown { .. } => Self::EntityNotKnown,
            FederationError::EntityProxyOnly { .. } => Self::EntityProxyOnly,
            FederationError::RepositoryCommunication { .. } => Self::RepositoryCommunication,
            FederationError::NotAuthorized { .. } => Self::NotAuthorized,
            FederationError::FunctionNotSupported { .. } => Self::FunctionNotSupported,
            FederationError::Generic { .. } => Self::Generic,
        }
    }

    /// Returns a stable label for logging and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::EntityNotKnown => "entity_not_known",
            Self::EntityProxyOnly => "entity_proxy_only",
            Self::RepositoryCommunication => "repository_communication",
            Self::NotAuthorized => "not_authorized",
            Self::FunctionNotSupported => "function_not_supported",
            Self::Generic => "generic",
        }
    }
}

/// One typed error withheld from immediate propagation.
#[derive(Debug)]
pub struct CapturedFailure {
    /// The collection whose call produced the failure.
    pub collection_id: CollectionId,
    /// The original error.
    pub error: FederationError,
}

/// Collects at most one failure per kind for one federated request.
///
/// First-seen wins per kind: a later failure of an already-captured kind is
/// logged but not stored, so the surfaced failure always names the first
/// collection that produced it in fold order.
#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    captured: HashMap<FailureKind, CapturedFailure>,
}

impl ErrorAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures one backend failure.
    ///
    /// Every capture is logged with the originating collection, even when the
    /// kind slot is already occupied.
    pub fn capture(&mut self, collection_id: &CollectionId, error: FederationError) {
        let kind = FailureKind::of(&error);

        tracing::warn!(
            collection = %collection_id,
            kind = kind.as_str(),
            error = %error,
            "captured backend failure"
        );
        record_backend_failure(kind.as_str());

        self.captured.entry(kind).or_insert(CapturedFailure {
            collection_id: collection_id.clone(),
            error,
        });
    }

    /// Returns true if a failure of the given kind was captured.
    #[must_use]
    pub fn has(&self, kind: FailureKind) -> bool {
        self.captured.contains_key(&kind)
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    /// Raises the first captured failure in the given precedence order.
    ///
    /// Kinds never captured are skipped. Returns `Ok(())` when no kind in the
    /// list was captured.
    ///
    /// # Errors
    ///
    /// Returns the stored error for the first kind in `order` that holds a
    /// capture.
    pub fn raise_first(&mut self, order: &[FailureKind]) -> Result<()> {
        for kind in order {
            if let Some(captured) = self.captured.remove(kind) {
                return Err(captured.error);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coll(id: &str) -> CollectionId {
        CollectionId::new_unchecked(id)
    }

    #[test]
    fn first_seen_wins_per_kind() {
        let mut acc = ErrorAccumulator::new();
        acc.capture(
            &coll("repo-a"),
            FederationError::repository_communication("first"),
        );
        acc.capture(
            &coll("repo-b"),
            FederationError::repository_communication("second"),
        );

        let err = acc
            .raise_first(&[FailureKind::RepositoryCommunication])
            .unwrap_err();
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn different_kinds_occupy_separate_slots() {
        let mut acc = ErrorAccumulator::new();
        acc.capture(&coll("repo-a"), FederationError::entity_not_known("guid"));
        acc.capture(
            &coll("repo-b"),
            FederationError::not_authorized("alice", "denied"),
        );

        assert!(acc.has(FailureKind::EntityNotKnown));
        assert!(acc.has(FailureKind::NotAuthorized));
        assert!(!acc.has(FailureKind::RepositoryCommunication));
    }

    #[test]
    fn raise_first_honors_precedence_order() {
        let mut acc = ErrorAccumulator::new();
        acc.capture(&coll("repo-a"), FederationError::entity_not_known("guid"));
        acc.capture(
            &coll("repo-b"),
            FederationError::repository_communication("socket closed"),
        );

        // Communication failures are more actionable than not-found.
        let err = acc
            .raise_first(&[
                FailureKind::RepositoryCommunication,
                FailureKind::EntityNotKnown,
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            FederationError::RepositoryCommunication { .. }
        ));
    }

    #[test]
    fn raise_first_is_noop_for_uncaptured_kinds() {
        let mut acc = ErrorAccumulator::new();
        acc.capture(&coll("repo-a"), FederationError::entity_not_known("guid"));

        assert!(acc
            .raise_first(&[
                FailureKind::RepositoryCommunication,
                FailureKind::NotAuthorized,
            ])
            .is_ok());
    }

    #[test]
    fn empty_accumulator_raises_nothing() {
        let mut acc = ErrorAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc
            .raise_first(&[FailureKind::RepositoryCommunication])
            .is_ok());
    }
}
