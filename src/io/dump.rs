//! Dump-directory files: energy log, site count, snapshots, run summary.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SpinError};
use crate::lattice::Lattice;
use crate::sampling::{Measurement, MeasurementSink, RunSummary, SnapshotSink};
use crate::spins::SpinConfiguration;
use crate::systems::HoneycombJ1J2J3;

pub const ENERGY_FILE: &str = "energy.dat";
pub const SITE_COUNT_FILE: &str = "Nsites.dat";
pub const SUMMARY_FILE: &str = "summary.yml";

/// Empty `dir`, creating it if needed.
///
/// Refuses the filesystem root and any directory containing the current
/// working directory.
pub fn prepare_dump_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(SpinError::InvalidConfig("dump_dir must not be empty".into()));
    }
    if dir.exists() {
        let target = fs::canonicalize(dir)?;
        let cwd = fs::canonicalize(std::env::current_dir()?)?;
        if target.parent().is_none() || cwd.starts_with(&target) {
            return Err(SpinError::InvalidConfig(format!(
                "refusing to clear dump_dir {}",
                dir.display()
            )));
        }
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Write the site count `L` as a single line.
pub fn write_site_count(dir: &Path, n_sites: usize) -> Result<()> {
    fs::write(dir.join(SITE_COUNT_FILE), format!("{n_sites}\n"))?;
    Ok(())
}

/// Contents of `summary.yml`: the model that was run and how it ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub couplings: HoneycombJ1J2J3,
    /// Spin length `S`.
    pub spin: f64,
    pub summary: RunSummary,
}

pub fn write_summary(dir: &Path, report: &RunReport) -> Result<()> {
    let file = File::create(dir.join(SUMMARY_FILE))?;
    serde_yaml::to_writer(BufWriter::new(file), report)?;
    Ok(())
}

pub fn read_summary(path: impl AsRef<Path>) -> Result<RunReport> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_yaml::from_reader(reader)?)
}

/// `energy.dat`: one header line, then fixed-width `n_sweeps E mz` rows.
pub struct EnergyLog {
    path: PathBuf,
}

impl EnergyLog {
    /// Create the log in `dir`, truncating any previous one.
    pub fn create(dir: &Path) -> Result<Self> {
        let path = dir.join(ENERGY_FILE);
        let mut file = File::create(&path)?;
        writeln!(file, "{:>20}{:>20}{:>20}", "#n_sweeps", "E", "mz")?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse every data row back.
    pub fn read(path: &Path) -> Result<Vec<Measurement>> {
        let reader = BufReader::new(File::open(path)?);
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(SpinError::Parse(format!("energy row '{line}'")));
            }
            rows.push(Measurement {
                n_sweeps: parse(fields[0])?,
                energy: parse(fields[1])?,
                mz: parse(fields[2])?,
            });
        }
        Ok(rows)
    }
}

impl MeasurementSink for EnergyLog {
    fn record(&mut self, m: Measurement) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{:20}{:20.7e}{:20.7e}", m.n_sweeps, m.energy, m.mz)?;
        Ok(())
    }
}

/// Writes `spins_<n_sweeps>.dat` files that [`read_snapshot`] restores.
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, n_sweeps: u64) -> PathBuf {
        self.dir.join(format!("spins_{n_sweeps}.dat"))
    }
}

impl SnapshotSink for SnapshotWriter {
    fn snapshot(&mut self, lattice: &Lattice, spins: &SpinConfiguration, n_sweeps: u64) -> Result<()> {
        if spins.len() != lattice.n_sites() {
            return Err(SpinError::InvalidSite(format!(
                "snapshot of {} spins on a {}-site lattice",
                spins.len(),
                lattice.n_sites()
            )));
        }
        let path = self.path_for(n_sweeps);
        let mut out = BufWriter::new(File::create(&path)?);
        let [l1, l2] = lattice.dims();
        writeln!(
            out,
            "# lattice {} {} {} spin {:e} n_sweeps {}",
            lattice.name(),
            l1,
            l2,
            spins.magnitude(),
            n_sweeps
        )?;
        writeln!(
            out,
            "#{:>9}{:>5}{:>6}{:>6}{:>16}{:>16}{:>20}{:>20}{:>20}",
            "site", "sub", "x", "y", "rx", "ry", "sx", "sy", "sz"
        )?;
        for (site, s) in spins.as_slice().iter().enumerate() {
            let (coord, sub) = lattice.site_to_coord(site)?;
            let r = lattice.position(site)?;
            writeln!(
                out,
                "{:10}{:5}{:6}{:6}{:16.8}{:16.8}{:20.12e}{:20.12e}{:20.12e}",
                site, sub, coord[0], coord[1], r.x, r.y, s.x, s.y, s.z
            )?;
        }
        out.flush()?;
        debug!(path = %path.display(), "wrote snapshot");
        Ok(())
    }
}

/// Restore `(n_sweeps, spins)` from a file written by [`SnapshotWriter`].
pub fn read_snapshot(path: &Path) -> Result<(u64, SpinConfiguration)> {
    let reader = BufReader::new(File::open(path)?);
    let mut magnitude = None;
    let mut n_sweeps = None;
    let mut rows: Vec<(usize, Vector3<f64>)> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.first() {
            None => continue,
            Some(&"#") if fields.get(1) == Some(&"lattice") => {
                for pair in fields.windows(2) {
                    match pair[0] {
                        "spin" => magnitude = Some(parse::<f64>(pair[1])?),
                        "n_sweeps" => n_sweeps = Some(parse::<u64>(pair[1])?),
                        _ => {}
                    }
                }
            }
            Some(f) if f.starts_with('#') => continue,
            Some(_) => {
                if fields.len() != 9 {
                    return Err(SpinError::Parse(format!("snapshot row '{}'", line.trim())));
                }
                let s = Vector3::new(parse(fields[6])?, parse(fields[7])?, parse(fields[8])?);
                rows.push((parse(fields[0])?, s));
            }
        }
    }

    let magnitude = magnitude.ok_or_else(|| SpinError::Parse("missing header".into()))?;
    let n_sweeps = n_sweeps.ok_or_else(|| SpinError::Parse("missing sweep count".into()))?;

    let n = rows.len();
    let mut vectors = vec![Vector3::zeros(); n];
    let mut seen = vec![false; n];
    for (site, s) in rows {
        if site >= n || seen[site] {
            return Err(SpinError::Parse(format!("site {site} repeated or out of range")));
        }
        seen[site] = true;
        vectors[site] = s;
    }
    Ok((n_sweeps, SpinConfiguration::from_vectors(vectors, magnitude)?))
}

fn parse<T: std::str::FromStr>(field: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| SpinError::Parse(format!("cannot parse '{field}'")))
}
