//! Single-spin Metropolis Monte Carlo for classical spin models.
//!
//! One sweep visits every site in index order, proposes a new spin, and
//! accepts it with probability `min(1, exp(-beta * dE))`. The running energy
//! is updated by the accepted deltas only; [`MetropolisEngine::update_energy`]
//! recomputes it from scratch.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::traits::SnapshotSink;
use crate::error::{Result, SpinError};
use crate::lattice::Lattice;
use crate::model::{CouplingModel, McCouplings, McList};
use crate::spins::{random_on_sphere, SpinConfiguration};

/// File in the dump directory receiving logged temperature changes.
pub const BETA_LOG_FILE: &str = "beta.dat";

/// Upper bound (exclusive) on `seed_local`; each local stream is one
/// `jump()` (2^128 draws) further along the `seed_global` sequence.
pub const MAX_LOCAL_STREAMS: u64 = 1 << 16;

/// Trial move drawn for each visited site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proposal {
    /// Fresh direction uniform on the sphere of radius `S`.
    #[default]
    Sphere,
    /// Ising-style reversal `s -> -s`.
    Flip,
}

/// Parameters for constructing a [`MetropolisEngine`].
#[derive(Copy, Clone, Debug)]
pub struct MetropolisParams {
    pub seed_global: u64,
    pub seed_local: u64,
    /// Initial temperature `kT`.
    pub kt: f64,
    pub energy_initial: f64,
    pub proposal: Proposal,
}

impl Default for MetropolisParams {
    fn default() -> Self {
        Self {
            seed_global: 0,
            seed_local: 0,
            kt: 1.0,
            energy_initial: 0.0,
            proposal: Proposal::Sphere,
        }
    }
}

/// Audit entry written by [`MetropolisEngine::change_beta`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaRecord {
    pub n_sweeps: u64,
    pub beta: f64,
}

fn local_stream(seed_global: u64, seed_local: u64) -> Xoshiro256StarStar {
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed_global);
    for _ in 0..seed_local {
        rng.jump();
    }
    rng
}

pub struct MetropolisEngine {
    seed_global: u64,
    seed_local: u64,
    rng: Xoshiro256StarStar,
    beta: f64,
    energy: f64,
    n_sweeps: u64,
    acceptance_ratio: f64,
    proposal: Proposal,
    dump_dir: Option<PathBuf>,
    beta_log: Vec<BetaRecord>,
}

impl MetropolisEngine {
    pub fn new(params: MetropolisParams) -> Result<Self> {
        if !(params.kt.is_finite() && params.kt > 0.0) {
            return Err(SpinError::InvalidConfig(format!(
                "temperature must be positive, got {}",
                params.kt
            )));
        }
        if params.seed_local >= MAX_LOCAL_STREAMS {
            return Err(SpinError::InvalidConfig(format!(
                "seed_local must be below {MAX_LOCAL_STREAMS}, got {}",
                params.seed_local
            )));
        }
        Ok(Self {
            seed_global: params.seed_global,
            seed_local: params.seed_local,
            rng: local_stream(params.seed_global, params.seed_local),
            beta: 1.0 / params.kt,
            energy: params.energy_initial,
            n_sweeps: 0,
            acceptance_ratio: 0.0,
            proposal: params.proposal,
            dump_dir: None,
            beta_log: Vec::new(),
        })
    }

    /// Also append logged temperature changes to `dir/beta.dat`.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    pub fn seeds(&self) -> (u64, u64) {
        (self.seed_global, self.seed_local)
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn kt(&self) -> f64 {
        1.0 / self.beta
    }

    /// Running energy.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn n_sweeps(&self) -> u64 {
        self.n_sweeps
    }

    /// Accepted moves per site in the last sweep.
    pub fn acceptance_ratio(&self) -> f64 {
        self.acceptance_ratio
    }

    pub fn proposal(&self) -> Proposal {
        self.proposal
    }

    pub fn dump_dir(&self) -> Option<&Path> {
        self.dump_dir.as_deref()
    }

    pub fn beta_log(&self) -> &[BetaRecord] {
        &self.beta_log
    }

    /// Randomize `spins` from the engine's own stream.
    pub fn randomize_spins(&mut self, spins: &mut SpinConfiguration) {
        spins.randomize(&mut self.rng);
    }

    /// Recompute the energy of `spins` from every bond and adopt it.
    pub fn update_energy(&mut self, model: &CouplingModel, spins: &SpinConfiguration) -> Result<f64> {
        self.energy = model.energy(spins)?;
        Ok(self.energy)
    }

    /// Set the inverse temperature; with `log`, record `(n_sweeps, beta)`.
    pub fn change_beta(&mut self, beta: f64, log: bool) -> Result<()> {
        if !(beta.is_finite() && beta >= 0.0) {
            return Err(SpinError::InvalidConfig(format!(
                "inverse temperature must be finite and non-negative, got {beta}"
            )));
        }
        self.beta = beta;
        if log {
            let record = BetaRecord { n_sweeps: self.n_sweeps, beta };
            self.beta_log.push(record);
            if let Some(dir) = &self.dump_dir {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(dir.join(BETA_LOG_FILE))?;
                writeln!(file, "{:20}{:20.10e}", record.n_sweeps, record.beta)?;
            }
        }
        Ok(())
    }

    /// Hand the current configuration to `sink`.
    pub fn dump<S: SnapshotSink + ?Sized>(
        &self,
        sink: &mut S,
        lattice: &Lattice,
        spins: &SpinConfiguration,
    ) -> Result<()> {
        sink.snapshot(lattice, spins, self.n_sweeps)
    }

    /// One Metropolis sweep over every site in index order.
    pub fn update_metropolis(&mut self, model: &CouplingModel, spins: &mut SpinConfiguration) -> Result<()> {
        let list = Self::compiled(model, spins)?;
        let accepted = match list.couplings() {
            McCouplings::Diagonal(js) => {
                self.sweep_with(list, spins, |k, s| js[k].component_mul(s))
            }
            McCouplings::General(js) => self.sweep_with(list, spins, |k, s| js[k] * s),
        };

        self.acceptance_ratio = if spins.is_empty() {
            0.0
        } else {
            accepted as f64 / spins.len() as f64
        };
        self.n_sweeps += 1;
        trace!(
            n_sweeps = self.n_sweeps,
            energy = self.energy,
            acceptance = self.acceptance_ratio,
            "sweep done"
        );
        Ok(())
    }

    /// A single Metropolis trial at `site`; returns whether it was accepted.
    /// Does not advance the sweep counter.
    pub fn attempt_site(
        &mut self,
        model: &CouplingModel,
        spins: &mut SpinConfiguration,
        site: usize,
    ) -> Result<bool> {
        let list = Self::compiled(model, spins)?;
        if site >= spins.len() {
            return Err(SpinError::InvalidSite(format!(
                "site {site} outside {} spins",
                spins.len()
            )));
        }
        let h = list.local_field(site, spins.as_slice());
        Ok(self.trial(spins, site, h))
    }

    fn compiled<'m>(model: &'m CouplingModel, spins: &SpinConfiguration) -> Result<&'m McList> {
        let list = model.mc_list().ok_or(SpinError::ModelNotCompiled)?;
        model.check_spins(spins)?;
        if (spins.magnitude() - model.spin()).abs() > f64::EPSILON * model.spin() {
            return Err(SpinError::InvalidConfig(format!(
                "spin length {} does not match model spin {}",
                spins.magnitude(),
                model.spin()
            )));
        }
        Ok(list)
    }

    fn sweep_with<F>(&mut self, list: &McList, spins: &mut SpinConfiguration, contract: F) -> usize
    where
        F: Fn(usize, &Vector3<f64>) -> Vector3<f64>,
    {
        let mut accepted = 0;
        for site in 0..spins.len() {
            let h = list.field_with(site, spins.as_slice(), &contract);
            if self.trial(spins, site, h) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Propose, then draw exactly one uniform for the acceptance test.
    #[inline]
    fn trial(&mut self, spins: &mut SpinConfiguration, site: usize, h: Vector3<f64>) -> bool {
        let old = spins.as_slice()[site];
        let new = match self.proposal {
            Proposal::Sphere => random_on_sphere(&mut self.rng, spins.magnitude()),
            Proposal::Flip => -old,
        };
        let delta_e = -(new - old).dot(&h);

        let u: f64 = self.rng.gen();
        if delta_e <= 0.0 || u < (-self.beta * delta_e).exp() {
            spins.replace(site, new);
            self.energy += delta_e;
            true
        } else {
            false
        }
    }
}
