//! Sampling module - Metropolis updates, annealing control and the run loop.

mod anneal;
mod driver;
mod metropolis;
mod traits;

pub use anneal::{AnnealingSchedule, Phase, MIN_ALPHA};
pub use driver::{run_annealing, RunParams, RunSummary};
pub use metropolis::{
    BetaRecord, MetropolisEngine, MetropolisParams, Proposal, BETA_LOG_FILE, MAX_LOCAL_STREAMS,
};
pub use traits::{Measurement, MeasurementSink, Snapshot, SnapshotSink};
