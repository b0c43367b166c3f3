//! J1-J2-J3 Ising-axis model on the honeycomb lattice.
//!
//! Cell offsets are in units of the primitive vectors of
//! [`UnitCell::honeycomb`](crate::lattice::UnitCell::honeycomb). Each bond is
//! added exactly once; `simplify` only has to drop vanishing shells.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SpinError};
use crate::lattice::{Coord, Lattice};
use crate::model::CouplingModel;

/// Nearest neighbors: sublattice 0 to sublattice 1.
const J1_OFFSETS: [Coord; 3] = [[0, 0], [-1, 0], [-1, -1]];
/// Second neighbors within each sublattice, forward half of the shell.
const J2_OFFSETS: [Coord; 3] = [[1, 0], [1, 1], [0, 1]];
/// Third neighbors: sublattice 0 to sublattice 1 across a hexagon.
const J3_OFFSETS: [Coord; 3] = [[0, -1], [0, 1], [-2, -1]];

/// Exchange constants of the three neighbor shells, along the spin `z` axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoneycombJ1J2J3 {
    pub j1: f64,
    pub j2: f64,
    pub j3: f64,
}

impl Default for HoneycombJ1J2J3 {
    fn default() -> Self {
        Self { j1: -1.0, j2: 1.5, j3: 0.5 }
    }
}

impl HoneycombJ1J2J3 {
    /// Add every bond of the three shells to a fresh model on `lattice`.
    ///
    /// The returned model is neither simplified nor compiled.
    pub fn build(&self, lattice: &Lattice, spin: f64) -> Result<CouplingModel> {
        if lattice.n_sublattices() != 2 || lattice.name() != "honeycomb" {
            return Err(SpinError::InvalidConfig(format!(
                "J1-J2-J3 model needs a honeycomb lattice, got '{}'",
                lattice.name()
            )));
        }
        let mut model = CouplingModel::for_lattice(spin, lattice)?;
        let jz = |j: f64| Vector3::new(0.0, 0.0, j);

        for site_i in 0..lattice.n_sites() {
            let (coord_i, sub_i) = lattice.site_to_coord(site_i)?;
            let (_, image_i) = lattice.resolve_periodic(coord_i);
            let shifted = |d: &Coord| [coord_i[0] + d[0], coord_i[1] + d[1]];

            if sub_i == 0 {
                for d in &J1_OFFSETS {
                    let (site_j, image_j) = lattice.wrapped_site(shifted(d), 1)?;
                    model.add_bond(jz(self.j1), site_i, site_j, image_i, image_j)?;
                }
            }

            for d in &J2_OFFSETS {
                let (site_j, image_j) = lattice.wrapped_site(shifted(d), sub_i)?;
                model.add_bond(jz(self.j2), site_i, site_j, image_i, image_j)?;
            }

            if sub_i == 0 {
                for d in &J3_OFFSETS {
                    let (site_j, image_j) = lattice.wrapped_site(shifted(d), 1)?;
                    model.add_bond(jz(self.j3), site_i, site_j, image_i, image_j)?;
                }
            }
        }

        info!(
            j1 = self.j1,
            j2 = self.j2,
            j3 = self.j3,
            n_bonds = model.n_bonds(),
            "built honeycomb J1-J2-J3 model"
        );
        Ok(model)
    }
}
