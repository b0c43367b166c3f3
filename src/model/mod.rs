//! Model module - bilinear exchange Hamiltonians and their compiled form.

mod coupling;
mod hamiltonian;
mod mc_list;

pub use coupling::{CouplingTensor, CouplingTerm};
pub use hamiltonian::{CouplingModel, ZERO_COUPLING_TOL};
pub use mc_list::{McCouplings, McList, McNeighbor};
