//! # Recollect Core Library
//!
//! Episodic interaction memory. Every interaction an agent takes part in is
//! stored as an [`EpisodicRecord`], scored once for significance, and later
//! linked to thematically related records by a background consolidation pass.
//!
//! - **Significance** is computed at write time ([`significance`]).
//! - **Relevance** is computed per search result ([`retrieval`]).
//! - **Consolidation** links related records after a write ([`consolidation`],
//!   driven by the [`worker`] queue).
//!
//! Persistence sits behind the [`RecordStore`] trait, with a SQLite backend
//! and an in-process backend in [`store`]. [`MemoryManager`] wires it all
//! together for callers.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod consolidation;
pub mod error;
pub mod manager;
pub mod record;
pub mod retrieval;
pub mod significance;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod worker;

pub use config::RecollectConfig;
pub use error::RecollectError;
pub use manager::MemoryManager;
pub use record::EpisodicRecord;
pub use retrieval::{MemoryQuery, SearchResult};
pub use store::{RecordStore, StoreFilter, StoreStats};
pub use types::*;
