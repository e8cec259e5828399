//! # mosaic-core
//!
//! Core abstractions for the Mosaic federated metadata catalog.
//!
//! This crate provides the foundational types and traits used across all
//! Mosaic components:
//!
//! - **Identifiers**: Strongly-typed IDs for entities, collections, and requests
//! - **Instance Model**: Snapshots, classifications, and reconciled entities
//! - **Collection Contract**: The capability trait every repository connector
//!   implements
//! - **Error Types**: The federation failure taxonomy and result alias
//! - **Observability**: Logging initialization and span constructors
//!
//! ## Crate Boundary
//!
//! `mosaic-core` is the **only** crate allowed to define shared primitives.
//! The federation engine and any connector crates interact solely through the
//! contracts defined here.
//!
//! ## Example
//!
//! ```rust
//! use mosaic_core::prelude::*;
//!
//! let collection = CollectionId::new("archive-east").unwrap();
//! let entity = EntityId::generate();
//! let snapshot = EntitySnapshot::new(entity, "Asset", 1, collection);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod collection;
pub mod error;
pub mod id;
pub mod instance;
pub mod memory;
pub mod observability;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use mosaic_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::collection::MetadataCollection;
    pub use crate::error::{FederationError, Result};
    pub use crate::id::{CollectionId, EntityId, RequestId};
    pub use crate::instance::{Classification, EntitySnapshot, ReconciledEntity};
    pub use crate::memory::MemoryCollection;
}

// Re-export key types at crate root for ergonomics
pub use collection::MetadataCollection;
pub use error::{FederationError, Result};
pub use id::{CollectionId, EntityId, RequestId};
pub use instance::{Classification, EntitySnapshot, ReconciledEntity};
pub use memory::MemoryCollection;
pub use observability::{LogFormat, federation_span, init_logging};
