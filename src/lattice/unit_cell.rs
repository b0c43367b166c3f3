//! Named two-dimensional unit cells.

use nalgebra::Vector3;

use crate::error::{Result, SpinError};

/// Primitive vectors and sublattice basis of a 2D Bravais lattice.
///
/// Vectors are embedded in 3D with a zero `z` component so they combine
/// directly with spin vectors in snapshot output.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCell {
    pub name: String,
    pub a1: Vector3<f64>,
    pub a2: Vector3<f64>,
    /// Sublattice positions relative to the cell origin.
    pub basis: Vec<Vector3<f64>>,
}

impl UnitCell {
    /// Look up a unit cell by name.
    ///
    /// # Errors
    /// Returns [`SpinError::UnknownLattice`] for names outside
    /// `square`, `triangular`, `honeycomb` and `kagome`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "square" => Ok(Self::square()),
            "triangular" => Ok(Self::triangular()),
            "honeycomb" => Ok(Self::honeycomb()),
            "kagome" => Ok(Self::kagome()),
            _ => Err(SpinError::UnknownLattice(name.to_string())),
        }
    }

    pub fn square() -> Self {
        Self {
            name: "square".into(),
            a1: Vector3::new(1.0, 0.0, 0.0),
            a2: Vector3::new(0.0, 1.0, 0.0),
            basis: vec![Vector3::zeros()],
        }
    }

    pub fn triangular() -> Self {
        Self {
            name: "triangular".into(),
            a1: Vector3::new(1.0, 0.0, 0.0),
            a2: Vector3::new(0.5, 0.75_f64.sqrt(), 0.0),
            basis: vec![Vector3::zeros()],
        }
    }

    /// Honeycomb cell with 120 degrees between `a1` and `a2`.
    ///
    /// With this choice the three nearest neighbors of sublattice 0 in cell
    /// `(x, y)` are sublattice 1 in cells `(x, y)`, `(x - 1, y)` and
    /// `(x - 1, y - 1)`.
    pub fn honeycomb() -> Self {
        let s3 = 3.0_f64.sqrt();
        Self {
            name: "honeycomb".into(),
            a1: Vector3::new(1.0, 0.0, 0.0),
            a2: Vector3::new(-0.5, 0.5 * s3, 0.0),
            basis: vec![Vector3::zeros(), Vector3::new(0.5, s3 / 6.0, 0.0)],
        }
    }

    pub fn kagome() -> Self {
        let a1 = Vector3::new(1.0, 0.0, 0.0);
        let a2 = Vector3::new(0.5, 0.75_f64.sqrt(), 0.0);
        Self {
            name: "kagome".into(),
            a1,
            a2,
            basis: vec![Vector3::zeros(), 0.5 * a1, 0.5 * a2],
        }
    }

    pub fn n_sublattices(&self) -> usize {
        self.basis.len()
    }
}
