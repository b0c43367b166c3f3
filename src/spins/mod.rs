//! Spin module - classical spin configurations.

use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};

use crate::error::{Result, SpinError};

/// Uniformly distributed vector on the sphere of radius `magnitude`.
pub fn random_on_sphere<R: Rng + ?Sized>(rng: &mut R, magnitude: f64) -> Vector3<f64> {
    let v: [f64; 3] = UnitSphere.sample(rng);
    Vector3::from(v) * magnitude
}

/// One classical spin of fixed length `S` per lattice site.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinConfiguration {
    spins: Vec<Vector3<f64>>,
    magnitude: f64,
}

impl SpinConfiguration {
    /// All `n` spins pointing along `direction`.
    pub fn aligned(n: usize, magnitude: f64, direction: Vector3<f64>) -> Result<Self> {
        check_magnitude(magnitude)?;
        let unit = direction
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| SpinError::InvalidConfig("spin direction must be non-zero".into()))?;
        Ok(Self {
            spins: vec![unit * magnitude; n],
            magnitude,
        })
    }

    /// Wrap existing vectors, rescaling each to `magnitude`.
    pub fn from_vectors(vectors: Vec<Vector3<f64>>, magnitude: f64) -> Result<Self> {
        check_magnitude(magnitude)?;
        let spins = vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.try_normalize(f64::EPSILON)
                    .map(|u| u * magnitude)
                    .ok_or_else(|| SpinError::InvalidConfig(format!("spin {i} has zero length")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { spins, magnitude })
    }

    /// Draw every spin independently and uniformly on the sphere.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for s in self.spins.iter_mut() {
            *s = random_on_sphere(rng, self.magnitude);
        }
    }

    /// Mean spin `(mx, my, mz)`; zero for an empty configuration.
    pub fn magnetization(&self) -> Vector3<f64> {
        if self.spins.is_empty() {
            return Vector3::zeros();
        }
        self.spins.iter().sum::<Vector3<f64>>() / self.spins.len() as f64
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn len(&self) -> usize {
        self.spins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    pub fn as_slice(&self) -> &[Vector3<f64>] {
        &self.spins
    }

    pub fn get(&self, site: usize) -> Option<&Vector3<f64>> {
        self.spins.get(site)
    }

    /// Point `site` along `direction`, keeping the spin length.
    pub fn set(&mut self, site: usize, direction: Vector3<f64>) -> Result<()> {
        let n = self.spins.len();
        let unit = direction
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| SpinError::InvalidConfig("spin direction must be non-zero".into()))?;
        let slot = self
            .spins
            .get_mut(site)
            .ok_or_else(|| SpinError::InvalidSite(format!("site {site} outside {n} spins")))?;
        *slot = unit * self.magnitude;
        Ok(())
    }

    /// Trusted in-place update from the sweep kernel; `s` already has length `S`.
    #[inline]
    pub(crate) fn replace(&mut self, site: usize, s: Vector3<f64>) {
        self.spins[site] = s;
    }

    /// Whether every spin has length `S` within `tol`.
    pub fn is_normalized(&self, tol: f64) -> bool {
        self.spins
            .iter()
            .all(|s| (s.norm() - self.magnitude).abs() <= tol)
    }
}

fn check_magnitude(magnitude: f64) -> Result<()> {
    if magnitude.is_finite() && magnitude > 0.0 {
        Ok(())
    } else {
        Err(SpinError::InvalidConfig(format!(
            "spin magnitude must be positive, got {magnitude}"
        )))
    }
}
