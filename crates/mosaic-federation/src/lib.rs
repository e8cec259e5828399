//! # mosaic-federation
//!
//! Federated query reconciliation engine for the Mosaic metadata catalog.
//!
//! One logical entity may be stored redundantly across many independently
//! operated metadata collections, each capable of failing, timing out, or
//! lacking a capability. This crate dispatches a logical read to every
//! registered collection, merges partial results into one coherent answer
//! under explicit precedence rules, and decides which of many possible error
//! outcomes to surface when no collection produces a positive result.
//!
//! ## Architecture
//!
//! - [`FederatedCatalog`]: the caller surface (`check_known`, `get_detail`,
//!   `get_detail_as_of`)
//! - [`FederationCoordinator`]: fan-out / join / ordered-fold driver, opaque
//!   to payloads
//! - [`GetEntityExecutor`]: the two-phase reconciliation state machine
//! - [`MergeState`]: home/version precedence and classification union
//! - [`ErrorAccumulator`]: per-kind capture with caller-policy precedence
//!
//! ## Reconciliation Rules
//!
//! - A snapshot served by its home collection wins regardless of version or
//!   arrival order.
//! - Otherwise the strictly highest version wins; ties keep the earliest
//!   registered collection's snapshot.
//! - Classifications merge by name across every collection consulted; a home
//!   copy does not suppress classifications seen elsewhere.
//! - A positive result from any collection always outranks any captured
//!   failure. Failed requests surface exactly one failure, chosen by a
//!   deterministic, per-operation precedence order.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mosaic_core::prelude::*;
//! use mosaic_federation::{FederatedCatalog, FederationOptions};
//!
//! let mut catalog = FederatedCatalog::new(FederationOptions::default());
//! catalog.register_collection(Arc::new(connector))?;
//!
//! let entity = catalog.get_detail("alice", entity_id).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod accumulator;
pub mod catalog;
pub mod coordinator;
pub mod executor;
pub mod get_entity;
pub mod merge;
pub mod metrics;
pub mod options;

// Re-export main types at crate root
pub use accumulator::{CapturedFailure, ErrorAccumulator, FailureKind};
pub use catalog::FederatedCatalog;
pub use coordinator::FederationCoordinator;
pub use executor::{BackendOutcome, ExecutionPhase, QueryExecutor};
pub use get_entity::{GetEntityExecutor, RetrievalMode};
pub use merge::MergeState;
pub use options::FederationOptions;
