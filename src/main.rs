use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spin_mc::io::{read_run_config, RunConfig};
use spin_mc::runner;

/// Simulated annealing of the J1-J2-J3 Ising-axis model on the honeycomb lattice.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML run configuration; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lattice size
    #[arg(long = "L", alias = "l")]
    l: Option<usize>,

    #[arg(long = "J1", alias = "j1", allow_hyphen_values = true)]
    j1: Option<f64>,

    #[arg(long = "J2", alias = "j2", allow_hyphen_values = true)]
    j2: Option<f64>,

    #[arg(long = "J3", alias = "j3", allow_hyphen_values = true)]
    j3: Option<f64>,

    /// Random seed for the simulation
    #[arg(long)]
    seed: Option<u64>,

    /// Final temperature (in units of J)
    #[arg(long = "kT", alias = "kt")]
    kt: Option<f64>,

    /// Initial temperature for annealing
    #[arg(long = "kT0", alias = "kt0")]
    kt0: Option<f64>,

    /// Total number of Monte Carlo sweeps
    #[arg(long = "max_sweeps", alias = "max-sweeps")]
    max_sweeps: Option<u64>,

    /// Sweeps between measurements
    #[arg(long = "log_interval", alias = "log-interval")]
    log_interval: Option<u64>,

    /// Sweeps between snapshots
    #[arg(long = "sweeps_per_dump", alias = "sweeps-per-dump")]
    sweeps_per_dump: Option<u64>,

    #[arg(long = "dump_dir", alias = "dump-dir")]
    dump_dir: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut RunConfig) {
        if let Some(v) = self.l {
            config.l = v;
        }
        if let Some(v) = self.j1 {
            config.j1 = v;
        }
        if let Some(v) = self.j2 {
            config.j2 = v;
        }
        if let Some(v) = self.j3 {
            config.j3 = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.kt {
            config.kt = v;
        }
        if let Some(v) = self.kt0 {
            config.kt0 = v;
        }
        if let Some(v) = self.max_sweeps {
            config.max_sweeps = v;
        }
        if let Some(v) = self.log_interval {
            config.log_interval = v;
        }
        if let Some(v) = self.sweeps_per_dump {
            config.sweeps_per_dump = v;
        }
        if let Some(v) = self.dump_dir {
            config.dump_dir = v;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => read_run_config(path)?,
        None => RunConfig::default(),
    };
    args.apply(&mut config);
    info!(?config, "configuration loaded");

    let summary = runner::run(&config)?;

    println!("Monte Carlo annealing results");
    println!("----------------------------------------");
    println!("Sites:             {}", summary.n_sites);
    println!("Sweeps:            {} ({} annealing, alpha = {:.6})", summary.n_sweeps, summary.sweeps_anneal, summary.alpha);
    println!("Final kT:          {:.6}", summary.kt);
    println!("Energy per site:   {:.7}", summary.energy / summary.n_sites as f64);
    println!("mz:                {:.7}", summary.magnetization[2]);
    println!("Acceptance ratio:  {:.4}", summary.acceptance_ratio);
    println!("Results in:        {}", config.dump_dir.display());
    Ok(())
}
