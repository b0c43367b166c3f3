//! Systems module - ready-made spin Hamiltonians on named lattices.

mod honeycomb;

pub use honeycomb::HoneycombJ1J2J3;
