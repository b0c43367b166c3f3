//! File-backed annealing run of the honeycomb J1-J2-J3 model.

use nalgebra::Vector3;
use tracing::info;

use crate::error::Result;
use crate::io::{
    prepare_dump_dir, write_site_count, write_summary, EnergyLog, RunConfig, RunReport,
    SnapshotWriter,
};
use crate::lattice::Lattice;
use crate::sampling::{run_annealing, AnnealingSchedule, MetropolisEngine, MetropolisParams, RunSummary};
use crate::spins::SpinConfiguration;

/// Build the model described by `config`, anneal it, and fill
/// `config.dump_dir` with the energy log, snapshots, site count, `beta.dat`
/// and a `summary.yml` [`RunReport`].
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    config.validate()?;
    let schedule = AnnealingSchedule::new(config.kt0, config.kt, config.sweeps_anneal())?;

    let lattice = Lattice::new(&config.lattice, [config.l, config.l])?;
    info!(
        lattice = lattice.name(),
        l = config.l,
        n_sites = lattice.n_sites(),
        "lattice ready"
    );
    let couplings = config.couplings();
    let mut model = couplings.build(&lattice, config.spin)?;
    model.simplify();
    model.build_mc_list();

    let dir = config.dump_dir.as_path();
    prepare_dump_dir(dir)?;
    let mut energy_log = EnergyLog::create(dir)?;
    write_site_count(dir, lattice.n_sites())?;
    let mut snapshots = SnapshotWriter::new(dir);

    info!(
        seed = config.seed,
        max_sweeps = config.max_sweeps,
        sweeps_anneal = schedule.sweeps_anneal(),
        alpha = schedule.alpha(),
        log_interval = config.log_interval,
        sweeps_per_dump = config.sweeps_per_dump,
        "Monte Carlo parameters"
    );

    let mut engine = MetropolisEngine::new(MetropolisParams {
        seed_global: config.seed,
        seed_local: config.seed_local,
        kt: config.kt0,
        energy_initial: 0.0,
        proposal: config.proposal,
    })?
    .with_dump_dir(dir);

    let mut spins = SpinConfiguration::aligned(lattice.n_sites(), model.spin(), Vector3::z())?;
    engine.randomize_spins(&mut spins);
    engine.update_energy(&model, &spins)?;

    let summary = run_annealing(
        &mut engine,
        &model,
        &lattice,
        &mut spins,
        &schedule,
        config.run_params(),
        &mut energy_log,
        &mut snapshots,
    )?;
    let report = RunReport { couplings, spin: config.spin, summary };
    write_summary(dir, &report)?;
    Ok(report.summary)
}
