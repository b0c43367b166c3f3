use std::ops::Add;

use nalgebra::{Matrix3, Vector3};

use crate::lattice::Image;

/// Exchange tensor linking the components of two spins.
///
/// `Diagonal` covers the XXZ/XYZ forms `(Jx, Jy, Jz)`; `General` carries a
/// full 3x3 matrix (off-diagonal terms such as DM or Kitaev-Gamma).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouplingTensor {
    Diagonal(Vector3<f64>),
    General(Matrix3<f64>),
}

impl CouplingTensor {
    pub fn to_matrix(&self) -> Matrix3<f64> {
        match self {
            Self::Diagonal(d) => Matrix3::from_diagonal(d),
            Self::General(m) => *m,
        }
    }

    /// Tensor seen from the other end of the bond.
    pub fn transpose(&self) -> Self {
        match self {
            Self::Diagonal(d) => Self::Diagonal(*d),
            Self::General(m) => Self::General(m.transpose()),
        }
    }

    /// `J . s`
    pub fn apply(&self, s: &Vector3<f64>) -> Vector3<f64> {
        match self {
            Self::Diagonal(d) => d.component_mul(s),
            Self::General(m) => m * s,
        }
    }

    /// `a . J . b`
    pub fn bilinear(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        a.dot(&self.apply(b))
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Self::Diagonal(d) => d.iter().all(|x| x.is_finite()),
            Self::General(m) => m.iter().all(|x| x.is_finite()),
        }
    }

    /// Largest absolute entry.
    pub fn max_abs(&self) -> f64 {
        match self {
            Self::Diagonal(d) => d.amax(),
            Self::General(m) => m.amax(),
        }
    }

    /// Collapse a general tensor with vanishing off-diagonal entries.
    pub fn demoted(self) -> Self {
        match self {
            Self::General(m) => {
                let off_diagonal = (0..3)
                    .flat_map(|r| (0..3).map(move |c| (r, c)))
                    .filter(|(r, c)| r != c)
                    .all(|(r, c)| m[(r, c)] == 0.0);
                if off_diagonal {
                    Self::Diagonal(m.diagonal())
                } else {
                    self
                }
            }
            diag => diag,
        }
    }
}

impl Add for CouplingTensor {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Diagonal(a), Self::Diagonal(b)) => Self::Diagonal(a + b),
            (a, b) => Self::General(a.to_matrix() + b.to_matrix()),
        }
    }
}

impl From<Vector3<f64>> for CouplingTensor {
    fn from(d: Vector3<f64>) -> Self {
        Self::Diagonal(d)
    }
}

impl From<Matrix3<f64>> for CouplingTensor {
    fn from(m: Matrix3<f64>) -> Self {
        Self::General(m)
    }
}

/// One bilinear term `-s_i . J . s_j` between site `i` in supercell image
/// `image_i` and site `j` in image `image_j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingTerm {
    pub site_i: usize,
    pub site_j: usize,
    pub j: CouplingTensor,
    pub image_i: Image,
    pub image_j: Image,
}

impl CouplingTerm {
    /// Image of `j` relative to `i`.
    pub fn relative_image(&self) -> Image {
        [
            self.image_j[0] - self.image_i[0],
            self.image_j[1] - self.image_i[1],
        ]
    }

    /// Representative with `site_i < site_j` and `image_i` at the origin.
    ///
    /// A term and its mirror `(j, i, J^T)` map to the same representative.
    pub fn canonical(&self) -> Self {
        let rel = self.relative_image();
        if self.site_i <= self.site_j {
            Self {
                site_i: self.site_i,
                site_j: self.site_j,
                j: self.j,
                image_i: [0, 0],
                image_j: rel,
            }
        } else {
            Self {
                site_i: self.site_j,
                site_j: self.site_i,
                j: self.j.transpose(),
                image_i: [0, 0],
                image_j: [-rel[0], -rel[1]],
            }
        }
    }

    /// Key identifying the physical bond of a canonical term.
    pub(crate) fn key(&self) -> (usize, usize, Image) {
        (self.site_i, self.site_j, self.relative_image())
    }
}
