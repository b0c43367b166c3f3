use std::collections::BTreeMap;

use tracing::info;

use super::coupling::{CouplingTensor, CouplingTerm};
use super::mc_list::McList;
use crate::error::{Result, SpinError};
use crate::lattice::{Image, Lattice};
use crate::spins::SpinConfiguration;

/// Entries below this magnitude are dropped by [`CouplingModel::simplify`].
pub const ZERO_COUPLING_TOL: f64 = 1e-12;

/// Classical spin Hamiltonian `H = - sum_bonds s_i . J_ij . s_j`.
///
/// Bonds are collected with [`CouplingModel::add_bond`], normalized by
/// [`CouplingModel::simplify`] and compiled for the sweep kernel by
/// [`CouplingModel::build_mc_list`]. Adding bonds or simplifying again
/// discards a previously compiled list.
#[derive(Debug, Clone)]
pub struct CouplingModel {
    spin: f64,
    n_sites: usize,
    terms: Vec<CouplingTerm>,
    mc_list: Option<McList>,
}

impl CouplingModel {
    /// Empty model over `n_sites` spins of magnitude `spin`.
    pub fn new(spin: f64, n_sites: usize) -> Result<Self> {
        if !(spin.is_finite() && spin > 0.0) {
            return Err(SpinError::InvalidConfig(format!(
                "spin magnitude must be positive, got {spin}"
            )));
        }
        Ok(Self {
            spin,
            n_sites,
            terms: Vec::new(),
            mc_list: None,
        })
    }

    pub fn for_lattice(spin: f64, lattice: &Lattice) -> Result<Self> {
        Self::new(spin, lattice.n_sites())
    }

    /// Spin magnitude `S`.
    pub fn spin(&self) -> f64 {
        self.spin
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    pub fn terms(&self) -> &[CouplingTerm] {
        &self.terms
    }

    pub fn n_bonds(&self) -> usize {
        self.terms.len()
    }

    /// Record the exchange term between `site_i` (image `image_i`) and
    /// `site_j` (image `image_j`). Mirrored or repeated bonds are allowed and
    /// merged later by `simplify`.
    pub fn add_bond(
        &mut self,
        j: impl Into<CouplingTensor>,
        site_i: usize,
        site_j: usize,
        image_i: Image,
        image_j: Image,
    ) -> Result<()> {
        let j = j.into();
        for site in [site_i, site_j] {
            if site >= self.n_sites {
                return Err(SpinError::InvalidSite(format!(
                    "bond endpoint {site} outside model of {} sites",
                    self.n_sites
                )));
            }
        }
        if site_i == site_j {
            return Err(SpinError::InvalidCoupling(format!(
                "self-bond on site {site_i}"
            )));
        }
        if !j.is_finite() {
            return Err(SpinError::InvalidCoupling(format!(
                "non-finite tensor on bond {site_i}-{site_j}: {j:?}"
            )));
        }
        self.terms.push(CouplingTerm { site_i, site_j, j, image_i, image_j });
        self.mc_list = None;
        Ok(())
    }

    /// Canonicalize every bond, merge duplicates by summing their tensors
    /// and drop terms that vanish. Idempotent.
    pub fn simplify(&mut self) {
        let before = self.terms.len();
        let mut merged: BTreeMap<(usize, usize, Image), CouplingTensor> = BTreeMap::new();
        for term in &self.terms {
            let c = term.canonical();
            merged
                .entry(c.key())
                .and_modify(|j| *j = *j + c.j)
                .or_insert(c.j);
        }

        self.terms = merged
            .into_iter()
            .map(|((site_i, site_j, rel), j)| CouplingTerm {
                site_i,
                site_j,
                j: j.demoted(),
                image_i: [0, 0],
                image_j: rel,
            })
            .filter(|t| t.j.max_abs() > ZERO_COUPLING_TOL)
            .collect();
        self.mc_list = None;

        info!(before, after = self.terms.len(), "simplified coupling model");
    }

    /// Compile the per-site neighbor list used by the Metropolis kernel.
    pub fn build_mc_list(&mut self) -> &McList {
        let list = McList::compile(self.n_sites, &self.terms);
        info!(
            n_sites = self.n_sites,
            n_entries = list.n_entries(),
            "built Monte Carlo neighbor list"
        );
        self.mc_list.insert(list)
    }

    pub fn mc_list(&self) -> Option<&McList> {
        self.mc_list.as_ref()
    }

    /// Total energy of `spins`, summed over every bond.
    pub fn energy(&self, spins: &SpinConfiguration) -> Result<f64> {
        self.check_spins(spins)?;
        let s = spins.as_slice();
        Ok(-self
            .terms
            .iter()
            .map(|t| t.j.bilinear(&s[t.site_i], &s[t.site_j]))
            .sum::<f64>())
    }

    pub(crate) fn check_spins(&self, spins: &SpinConfiguration) -> Result<()> {
        if spins.len() != self.n_sites {
            return Err(SpinError::InvalidSite(format!(
                "configuration has {} spins, model has {} sites",
                spins.len(),
                self.n_sites
            )));
        }
        Ok(())
    }
}
