use std::ops::Range;

use nalgebra::{Matrix3, Vector3};

use super::coupling::{CouplingTensor, CouplingTerm};
use crate::lattice::Image;

/// Neighbor entry of the compiled list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McNeighbor {
    pub site: usize,
    /// Supercell image of the neighbor relative to the owning site.
    pub image: Image,
}

/// Coupling storage of a compiled list, chosen once for the whole model.
///
/// When every bond is diagonal the sweep contracts elementwise, otherwise
/// every record holds a full matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum McCouplings {
    Diagonal(Vec<Vector3<f64>>),
    General(Vec<Matrix3<f64>>),
}

impl McCouplings {
    pub fn len(&self) -> usize {
        match self {
            Self::Diagonal(v) => v.len(),
            Self::General(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-site bond arena in compressed-row layout.
///
/// The records of site `i` occupy `offsets[i]..offsets[i + 1]` in both
/// `neighbors` and `couplings`. Record `k` stores `J` oriented so that the
/// local field on the owning site is `sum_k J_k . s_{neighbors[k]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct McList {
    offsets: Vec<usize>,
    neighbors: Vec<McNeighbor>,
    couplings: McCouplings,
}

impl McList {
    pub(crate) fn compile(n_sites: usize, terms: &[CouplingTerm]) -> Self {
        let mut offsets = vec![0usize; n_sites + 1];
        for t in terms {
            offsets[t.site_i + 1] += 1;
            offsets[t.site_j + 1] += 1;
        }
        for i in 0..n_sites {
            offsets[i + 1] += offsets[i];
        }

        let n_entries = offsets[n_sites];
        let mut cursor = offsets.clone();
        let mut neighbors = vec![McNeighbor { site: 0, image: [0, 0] }; n_entries];
        let mut tensors = vec![CouplingTensor::Diagonal(Vector3::zeros()); n_entries];

        for t in terms {
            let rel = t.relative_image();

            let k = cursor[t.site_i];
            neighbors[k] = McNeighbor { site: t.site_j, image: rel };
            tensors[k] = t.j;
            cursor[t.site_i] += 1;

            let k = cursor[t.site_j];
            neighbors[k] = McNeighbor { site: t.site_i, image: [-rel[0], -rel[1]] };
            tensors[k] = t.j.transpose();
            cursor[t.site_j] += 1;
        }

        let all_diagonal = tensors
            .iter()
            .all(|j| matches!(j, CouplingTensor::Diagonal(_)));
        let couplings = if all_diagonal {
            McCouplings::Diagonal(
                tensors
                    .iter()
                    .map(|j| match j {
                        CouplingTensor::Diagonal(d) => *d,
                        CouplingTensor::General(m) => m.diagonal(),
                    })
                    .collect(),
            )
        } else {
            McCouplings::General(tensors.iter().map(|j| j.to_matrix()).collect())
        };

        Self { offsets, neighbors, couplings }
    }

    pub fn n_sites(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of records (twice the bond count).
    pub fn n_entries(&self) -> usize {
        self.neighbors.len()
    }

    /// Record range of `site`.
    #[inline]
    pub fn range(&self, site: usize) -> Range<usize> {
        self.offsets[site]..self.offsets[site + 1]
    }

    #[inline]
    pub fn neighbors(&self, site: usize) -> &[McNeighbor] {
        &self.neighbors[self.range(site)]
    }

    #[inline]
    pub fn neighbor(&self, k: usize) -> &McNeighbor {
        &self.neighbors[k]
    }

    pub fn couplings(&self) -> &McCouplings {
        &self.couplings
    }

    /// Local field `h_i = sum_j J_ij . s_j` on `site`.
    pub fn local_field(&self, site: usize, spins: &[Vector3<f64>]) -> Vector3<f64> {
        match &self.couplings {
            McCouplings::Diagonal(js) => self.field_with(site, spins, |k, s| js[k].component_mul(s)),
            McCouplings::General(js) => self.field_with(site, spins, |k, s| js[k] * s),
        }
    }

    /// Field accumulation with the contraction resolved by the caller.
    #[inline]
    pub(crate) fn field_with<F>(&self, site: usize, spins: &[Vector3<f64>], contract: F) -> Vector3<f64>
    where
        F: Fn(usize, &Vector3<f64>) -> Vector3<f64>,
    {
        let mut h = Vector3::zeros();
        for k in self.range(site) {
            h += contract(k, &spins[self.neighbors[k].site]);
        }
        h
    }
}
