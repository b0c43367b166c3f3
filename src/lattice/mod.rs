//! Lattice module - periodic 2D lattices with sublattice structure.

mod periodic;
mod unit_cell;

pub use periodic::{Coord, Image, Lattice};
pub use unit_cell::UnitCell;
