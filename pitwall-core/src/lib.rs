//! # pitwall-core
//!
//! Foundation layer shared by every Pitwall crate: the telemetry data model,
//! the deterministic random source, clocks, the sample bus and the error
//! taxonomy.
//!
//! ### Key Submodules:
//! - `rng`: seeded mulberry32 generator, the sole determinism root
//! - `sample`: immutable `Sample` readings and their invariants
//! - `events`: ordered observer list for emitted samples
//! - `time`: virtual and wall clocks in milliseconds
//! - `error`: configuration, validation and query errors

pub mod error;
pub mod events;
pub mod rng;
pub mod sample;
pub mod time;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::rng::DeterministicRng;
    pub use crate::sample::*;
    pub use crate::time::*;
}

pub use error::{ConfigurationError, QueryError, ValidationError};
pub use rng::DeterministicRng;
pub use sample::{Sample, TireTemps};
