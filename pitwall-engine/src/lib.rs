// pitwall-engine/src/lib.rs

/*!
# Pitwall Engine

Wires one simulated vehicle end to end: generator, repository, alert
evaluation, logging and metrics. Frontends (CLI, a future HTTP layer) share
these entry points instead of assembling the pieces themselves.
*/

pub mod error;
pub mod runtime;
pub mod session;

pub use error::SessionError;
pub use runtime::{run_live_mode, run_simulation_mode, LiveReport, SimulationReport};
pub use session::{IngestOutcome, VehicleSession};
