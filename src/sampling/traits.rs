//! Collaborator interfaces invoked between sweeps.

use crate::error::Result;
use crate::lattice::Lattice;
use crate::spins::SpinConfiguration;

/// One row of the energy log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub n_sweeps: u64,
    pub energy: f64,
    pub mz: f64,
}

/// Append-only destination for periodic measurements.
pub trait MeasurementSink {
    fn record(&mut self, measurement: Measurement) -> Result<()>;
}

impl MeasurementSink for Vec<Measurement> {
    fn record(&mut self, measurement: Measurement) -> Result<()> {
        self.push(measurement);
        Ok(())
    }
}

/// Destination for restartable configuration images.
pub trait SnapshotSink {
    fn snapshot(&mut self, lattice: &Lattice, spins: &SpinConfiguration, n_sweeps: u64) -> Result<()>;
}

/// In-memory copy of a configuration taken by a [`SnapshotSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub n_sweeps: u64,
    pub spins: SpinConfiguration,
}

impl SnapshotSink for Vec<Snapshot> {
    fn snapshot(&mut self, _lattice: &Lattice, spins: &SpinConfiguration, n_sweeps: u64) -> Result<()> {
        self.push(Snapshot { n_sweeps, spins: spins.clone() });
        Ok(())
    }
}
