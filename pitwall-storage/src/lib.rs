//! # Pitwall Storage
//!
//! In-memory, per-vehicle telemetry repository bounded by a sliding time
//! window and a hard sample cap, with cursor-paginated range queries.

pub mod cursor;
pub mod query;
pub mod repository;

pub use query::{QueryPage, QueryParams, RawQuery};
pub use repository::{Repository, RepositoryOptions};
