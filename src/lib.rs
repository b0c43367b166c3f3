//! Spin MC - Metropolis Monte Carlo for classical spin models in Rust
//!
//! This crate builds periodic 2D lattices and bilinear exchange Hamiltonians
//! on them, and anneals classical spin configurations with single-spin
//! Metropolis sweeps.

pub mod error;
pub mod lattice;
pub mod model;
pub mod spins;
pub mod systems;
pub mod sampling;
pub mod io;
pub mod runner;

// Re-export commonly used types at crate root
pub use error::{Result, SpinError};
pub use lattice::{Coord, Image, Lattice, UnitCell};
pub use model::{CouplingModel, CouplingTensor, CouplingTerm, McCouplings, McList, McNeighbor};
pub use spins::SpinConfiguration;
pub use systems::HoneycombJ1J2J3;
pub use sampling::{AnnealingSchedule, Phase, MetropolisEngine, MetropolisParams, Proposal, BetaRecord, Measurement, MeasurementSink, Snapshot, SnapshotSink, RunParams, RunSummary, run_annealing};
pub use io::{read_run_config, read_snapshot, read_summary, RunConfig, RunReport, EnergyLog, SnapshotWriter};

#[cfg(test)]
mod tests;
