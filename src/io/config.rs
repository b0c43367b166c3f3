//! YAML run configuration.
//!
//! ```yaml
//! lattice: honeycomb
//! l: 30
//! j1: -1.0
//! j2: 1.5
//! j3: 0.5
//! seed: 0
//! kt: 0.4
//! kt0: 1.0
//! max_sweeps: 200000
//! log_interval: 50
//! sweeps_per_dump: 10000
//! proposal: sphere
//! dump_dir: dump
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpinError};
use crate::sampling::{Proposal, RunParams, MAX_LOCAL_STREAMS};
use crate::systems::HoneycombJ1J2J3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub lattice: String,
    /// Linear size; the lattice has `l x l` cells.
    pub l: usize,
    pub j1: f64,
    pub j2: f64,
    pub j3: f64,
    /// Spin length `S`.
    pub spin: f64,
    pub seed: u64,
    pub seed_local: u64,
    /// Final temperature.
    pub kt: f64,
    /// Initial annealing temperature.
    pub kt0: f64,
    pub max_sweeps: u64,
    /// Defaults to a quarter of `max_sweeps`.
    pub sweeps_anneal: Option<u64>,
    pub log_interval: u64,
    pub sweeps_per_dump: u64,
    pub proposal: Proposal,
    pub dump_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            lattice: "honeycomb".into(),
            l: 30,
            j1: -1.0,
            j2: 1.5,
            j3: 0.5,
            spin: 0.5,
            seed: 0,
            seed_local: 0,
            kt: 0.4,
            kt0: 1.0,
            max_sweeps: 200_000,
            sweeps_anneal: None,
            log_interval: 50,
            sweeps_per_dump: 10_000,
            proposal: Proposal::Sphere,
            dump_dir: PathBuf::from("dump"),
        }
    }
}

impl RunConfig {
    pub fn sweeps_anneal(&self) -> u64 {
        self.sweeps_anneal.unwrap_or(self.max_sweeps / 4)
    }

    pub fn couplings(&self) -> HoneycombJ1J2J3 {
        HoneycombJ1J2J3 { j1: self.j1, j2: self.j2, j3: self.j3 }
    }

    pub fn run_params(&self) -> RunParams {
        RunParams {
            max_sweeps: self.max_sweeps,
            log_interval: self.log_interval,
            sweeps_per_dump: self.sweeps_per_dump,
        }
    }

    /// Reject settings no run can use. The annealing ratio is checked when
    /// the schedule is built.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SpinError::InvalidConfig(msg));
        if self.l == 0 {
            return fail("l must be >= 1".into());
        }
        if self.max_sweeps == 0 {
            return fail("max_sweeps must be >= 1".into());
        }
        if self.log_interval == 0 || self.sweeps_per_dump == 0 {
            return fail("log_interval and sweeps_per_dump must be >= 1".into());
        }
        if self.sweeps_anneal() > self.max_sweeps {
            return fail(format!(
                "sweeps_anneal ({}) must not exceed max_sweeps ({})",
                self.sweeps_anneal(),
                self.max_sweeps
            ));
        }
        if self.seed_local >= MAX_LOCAL_STREAMS {
            return fail(format!("seed_local must be below {MAX_LOCAL_STREAMS}"));
        }
        for (name, t) in [("kt", self.kt), ("kt0", self.kt0), ("spin", self.spin)] {
            if !(t.is_finite() && t > 0.0) {
                return fail(format!("{name} must be positive, got {t}"));
            }
        }
        for (name, j) in [("j1", self.j1), ("j2", self.j2), ("j3", self.j3)] {
            if !j.is_finite() {
                return fail(format!("{name} must be finite"));
            }
        }
        Ok(())
    }
}

/// Read a [`RunConfig`] from a YAML file; missing keys keep their defaults.
pub fn read_run_config(path: impl AsRef<Path>) -> Result<RunConfig> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let config: RunConfig = serde_yaml::from_reader(reader)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: RunConfig = serde_yaml::from_str("l: 4\nmax_sweeps: 400\nproposal: flip\n").unwrap();
        assert_eq!(config.l, 4);
        assert_eq!(config.sweeps_anneal(), 100);
        assert_eq!(config.proposal, Proposal::Flip);
        assert_eq!(config.j2, 1.5);
        assert_eq!(config.dump_dir, PathBuf::from("dump"));
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(serde_yaml::from_str::<RunConfig>("temperature: 3.0\n").is_err());
    }

    #[test]
    fn test_validate() {
        let bad = [
            RunConfig { log_interval: 0, ..Default::default() },
            RunConfig { max_sweeps: 0, ..Default::default() },
            RunConfig { kt: -0.4, ..Default::default() },
            RunConfig { sweeps_anneal: Some(300_000), ..Default::default() },
            RunConfig { j3: f64::INFINITY, ..Default::default() },
            RunConfig { seed_local: MAX_LOCAL_STREAMS, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(SpinError::InvalidConfig(_))));
        }
        RunConfig::default().validate().unwrap();
    }

    #[test]
    fn test_read_run_config() {
        let path = std::env::temp_dir().join(format!("spin_mc_config_{}.yml", std::process::id()));
        std::fs::write(&path, "kt: 0.3\nseed: 12\n").unwrap();
        let config = read_run_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.kt, 0.3);
        assert_eq!(config.seed, 12);
        assert!(read_run_config(&path).is_err());
    }
}
