use nalgebra::Vector3;

use super::unit_cell::UnitCell;
use crate::error::{Result, SpinError};

/// Integer cell coordinate along the two primitive vectors.
pub type Coord = [i64; 2];

/// Number of periodic wraps along each primitive vector.
pub type Image = [i64; 2];

/// Finite 2D lattice with periodic boundary conditions.
///
/// Sites are indexed in row-major order over cells with the sublattice
/// index running fastest: `site = (x * dims[1] + y) * n_sub + sub`.
#[derive(Debug, Clone)]
pub struct Lattice {
    cell: UnitCell,
    dims: [usize; 2],
    n_sites: usize,
}

impl Lattice {
    /// Build a lattice of `dims[0] x dims[1]` cells of the named unit cell.
    pub fn new(name: &str, dims: [usize; 2]) -> Result<Self> {
        Self::with_cell(UnitCell::from_name(name)?, dims)
    }

    pub fn with_cell(cell: UnitCell, dims: [usize; 2]) -> Result<Self> {
        if dims.iter().any(|&d| d == 0) {
            return Err(SpinError::InvalidSite(format!(
                "lattice dimensions must be positive, got {dims:?}"
            )));
        }
        let n_sites = dims[0] * dims[1] * cell.n_sublattices();
        Ok(Self { cell, dims, n_sites })
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn cell(&self) -> &UnitCell {
        &self.cell
    }

    pub fn dims(&self) -> [usize; 2] {
        self.dims
    }

    pub fn n_sublattices(&self) -> usize {
        self.cell.n_sublattices()
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Cell coordinate and sublattice of `site`.
    pub fn site_to_coord(&self, site: usize) -> Result<(Coord, usize)> {
        if site >= self.n_sites {
            return Err(SpinError::InvalidSite(format!(
                "site {site} outside lattice of {} sites",
                self.n_sites
            )));
        }
        let n_sub = self.n_sublattices();
        let sub = site % n_sub;
        let cell = site / n_sub;
        let x = cell / self.dims[1];
        let y = cell % self.dims[1];
        Ok(([x as i64, y as i64], sub))
    }

    /// Inverse of [`Lattice::site_to_coord`]. The coordinate must already lie
    /// inside the home supercell; use [`Lattice::wrapped_site`] otherwise.
    pub fn coord_to_site(&self, coord: Coord, sub: usize) -> Result<usize> {
        if sub >= self.n_sublattices() {
            return Err(SpinError::InvalidSite(format!(
                "sublattice {sub} outside basis of {}",
                self.n_sublattices()
            )));
        }
        let inside = coord
            .iter()
            .zip(self.dims.iter())
            .all(|(&c, &d)| c >= 0 && (c as usize) < d);
        if !inside {
            return Err(SpinError::InvalidSite(format!(
                "coordinate {coord:?} outside {:?} supercell",
                self.dims
            )));
        }
        let cell = coord[0] as usize * self.dims[1] + coord[1] as usize;
        Ok(cell * self.n_sublattices() + sub)
    }

    /// Wrap `coord` into `[0, l)` per axis and report how many times each
    /// axis wrapped.
    pub fn resolve_periodic(&self, coord: Coord) -> (Coord, Image) {
        let mut wrapped = [0i64; 2];
        let mut image = [0i64; 2];
        for d in 0..2 {
            let l = self.dims[d] as i64;
            wrapped[d] = coord[d].rem_euclid(l);
            image[d] = coord[d].div_euclid(l);
        }
        (wrapped, image)
    }

    /// Site index and supercell image of a possibly unwrapped coordinate.
    pub fn wrapped_site(&self, coord: Coord, sub: usize) -> Result<(usize, Image)> {
        let (wrapped, image) = self.resolve_periodic(coord);
        Ok((self.coord_to_site(wrapped, sub)?, image))
    }

    /// Real-space position of `site` inside the home supercell.
    pub fn position(&self, site: usize) -> Result<Vector3<f64>> {
        let (coord, sub) = self.site_to_coord(site)?;
        Ok(coord[0] as f64 * self.cell.a1 + coord[1] as f64 * self.cell.a2 + self.cell.basis[sub])
    }
}
