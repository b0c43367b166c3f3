//! Error type shared by every stage of a run.

/// Errors raised while building a model or driving a simulation.
///
/// None of these are retried internally; they surface to the caller and
/// end the run.
#[derive(Debug, thiserror::Error)]
pub enum SpinError {
    /// Geometric decay ratio outside `[0.5, 1.0)`, or unusable temperatures.
    #[error("invalid annealing schedule: alpha = {alpha} must lie in [0.5, 1.0)")]
    InvalidAnnealingSchedule { alpha: f64 },

    /// Site, sublattice or coordinate outside the lattice domain.
    #[error("invalid site: {0}")]
    InvalidSite(String),

    /// Self-bond or malformed coupling tensor.
    #[error("invalid coupling: {0}")]
    InvalidCoupling(String),

    #[error("unknown lattice '{0}', expected square, triangular, honeycomb or kagome")]
    UnknownLattice(String),

    /// A sweep was requested before `build_mc_list` compiled the model.
    #[error("coupling model has no Monte Carlo list; call build_mc_list first")]
    ModelNotCompiled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed snapshot: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SpinError>;
