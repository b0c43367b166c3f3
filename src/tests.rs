use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use nalgebra::Vector3;

use crate::io::{
    read_snapshot, read_summary, EnergyLog, RunConfig, ENERGY_FILE, SITE_COUNT_FILE, SUMMARY_FILE,
};
use crate::lattice::Lattice;
use crate::model::CouplingModel;
use crate::sampling::{
    run_annealing, AnnealingSchedule, Measurement, MetropolisEngine, MetropolisParams, Proposal,
    RunParams, RunSummary, Snapshot, BETA_LOG_FILE,
};
use crate::spins::SpinConfiguration;
use crate::systems::HoneycombJ1J2J3;
use crate::{runner, SpinError};

fn honeycomb_model(l: usize) -> (Lattice, CouplingModel) {
    let lattice = Lattice::new("honeycomb", [l, l]).unwrap();
    let mut model = HoneycombJ1J2J3::default().build(&lattice, 0.5).unwrap();
    model.simplify();
    model.build_mc_list();
    (lattice, model)
}

fn engine(seed_global: u64, seed_local: u64, kt: f64) -> MetropolisEngine {
    MetropolisEngine::new(MetropolisParams {
        seed_global,
        seed_local,
        kt,
        energy_initial: 0.0,
        proposal: Proposal::Sphere,
    })
    .unwrap()
}

fn reference_run() -> (MetropolisEngine, RunSummary, Vec<Measurement>, Vec<Snapshot>) {
    let (lattice, model) = honeycomb_model(4);
    let schedule = AnnealingSchedule::new(1.0, 0.4, 400 / 4).unwrap();
    let mut mc = engine(0, 0, 1.0);
    let mut spins = SpinConfiguration::aligned(lattice.n_sites(), 0.5, Vector3::z()).unwrap();
    mc.randomize_spins(&mut spins);
    mc.update_energy(&model, &spins).unwrap();

    let mut rows = Vec::new();
    let mut snaps = Vec::new();
    let params = RunParams { max_sweeps: 400, log_interval: 50, sweeps_per_dump: 200 };
    let summary = run_annealing(
        &mut mc, &model, &lattice, &mut spins, &schedule, params, &mut rows, &mut snaps,
    )
    .unwrap();
    (mc, summary, rows, snaps)
}

#[test]
fn test_honeycomb_reference_scenario() {
    let (mc, summary, rows, snaps) = reference_run();

    assert_eq!(summary.n_sites, 32);
    assert_eq!(mc.n_sweeps(), 400);
    assert_eq!(summary.sweeps_anneal, 100);
    assert_relative_eq!(summary.alpha, (0.4_f64.ln() / 100.0).exp(), epsilon = 1e-15);
    assert_relative_eq!(mc.beta(), 2.5, epsilon = 1e-12);

    let sweeps: Vec<u64> = rows.iter().map(|r| r.n_sweeps).collect();
    assert_eq!(sweeps, (0..=400).step_by(50).collect::<Vec<u64>>());
    for r in &rows {
        assert!(r.energy.is_finite());
        assert!(r.mz.abs() <= 0.5);
    }
    let snap_sweeps: Vec<u64> = snaps.iter().map(|s| s.n_sweeps).collect();
    assert_eq!(snap_sweeps, vec![0, 200, 400]);

    // logged once when annealing ends and once at exit
    let log = mc.beta_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].n_sweeps, 100);
    assert_eq!(log[1].n_sweeps, 400);
    assert!(log.iter().all(|r| (r.beta - 2.5).abs() < 1e-12));

    assert_relative_eq!(summary.energy, summary.energy_recomputed, epsilon = 1e-9);
}

#[test]
fn test_runs_are_deterministic() {
    let (a, summary_a, rows_a, snaps_a) = reference_run();
    let (b, summary_b, rows_b, snaps_b) = reference_run();
    assert_eq!(summary_a, summary_b);
    assert_eq!(rows_a, rows_b);
    assert_eq!(snaps_a, snaps_b);
    assert_eq!(a.energy(), b.energy());
    assert_eq!(a.acceptance_ratio(), b.acceptance_ratio());
}

#[test]
fn test_identical_seeds_identical_sweeps() {
    let (_, model) = honeycomb_model(3);
    let mut start = SpinConfiguration::aligned(model.n_sites(), 0.5, Vector3::z()).unwrap();
    engine(42, 0, 1.0).randomize_spins(&mut start);

    let run = |seed_local: u64| {
        let mut mc = engine(5, seed_local, 0.7);
        let mut spins = start.clone();
        mc.update_energy(&model, &spins).unwrap();
        for _ in 0..50 {
            mc.update_metropolis(&model, &mut spins).unwrap();
        }
        (mc.energy(), spins, mc.acceptance_ratio())
    };
    assert_eq!(run(3), run(3));
    assert_ne!(run(3).1, run(4).1);
}

#[test]
fn test_energy_consistency_and_magnetization_bound() {
    let (_, model) = honeycomb_model(5);
    let mut mc = engine(1, 2, 3.0);
    let mut spins = SpinConfiguration::aligned(model.n_sites(), 0.5, Vector3::x()).unwrap();
    mc.update_energy(&model, &spins).unwrap();

    for sweep in 0..300 {
        mc.update_metropolis(&model, &mut spins).unwrap();
        if sweep % 60 == 0 {
            mc.change_beta(mc.beta() * 1.5, false).unwrap();
        }
        assert!(spins.magnetization().norm() <= 0.5 + 1e-12);
        assert!((0.0..=1.0).contains(&mc.acceptance_ratio()));
    }
    let incremental = mc.energy();
    let recomputed = model.energy(&spins).unwrap();
    assert_relative_eq!(incremental, recomputed, epsilon = 1e-9);
    assert_relative_eq!(mc.update_energy(&model, &spins).unwrap(), incremental, epsilon = 1e-9);
}

#[test]
fn test_low_temperature_orders_ising_ferromagnet() {
    // ferromagnetic J1 only: the Ising-flip ground state is fully polarized along z
    let lattice = Lattice::new("honeycomb", [4, 4]).unwrap();
    let shells = HoneycombJ1J2J3 { j1: 1.0, j2: 0.0, j3: 0.0 };
    let mut model = shells.build(&lattice, 1.0).unwrap();
    model.simplify();
    model.build_mc_list();

    let mut mc = MetropolisEngine::new(MetropolisParams {
        seed_global: 3,
        kt: 0.05,
        proposal: Proposal::Flip,
        ..Default::default()
    })
    .unwrap();
    let mut spins = SpinConfiguration::aligned(32, 1.0, Vector3::z()).unwrap();
    mc.update_energy(&model, &spins).unwrap();
    for _ in 0..20 {
        mc.update_metropolis(&model, &mut spins).unwrap();
    }
    assert_relative_eq!(spins.magnetization().z, 1.0);
    assert_relative_eq!(mc.energy(), -48.0);
    assert_eq!(mc.acceptance_ratio(), 0.0);
}

#[test]
fn test_invalid_schedule_rejected_before_sweeping() {
    let config = RunConfig {
        l: 4,
        kt0: 1.0,
        kt: 0.1,
        max_sweeps: 8,
        dump_dir: std::env::temp_dir().join("spin_mc_never_created"),
        ..Default::default()
    };
    // alpha = 0.1^(1/2) < 0.5
    assert!(matches!(
        runner::run(&config),
        Err(SpinError::InvalidAnnealingSchedule { .. })
    ));
    assert!(!config.dump_dir.exists());
}

#[test]
fn test_file_backed_run() {
    let dir: PathBuf = std::env::temp_dir().join(format!("spin_mc_run_{}", std::process::id()));
    let config = RunConfig {
        l: 4,
        max_sweeps: 400,
        log_interval: 50,
        sweeps_per_dump: 200,
        dump_dir: dir.clone(),
        ..Default::default()
    };
    let summary = runner::run(&config).unwrap();

    let rows = EnergyLog::read(&dir.join(ENERGY_FILE)).unwrap();
    assert_eq!(rows.len(), 400 / 50 + 1);
    assert_eq!(fs::read_to_string(dir.join(SITE_COUNT_FILE)).unwrap().trim(), "32");
    assert_eq!(fs::read_to_string(dir.join(BETA_LOG_FILE)).unwrap().lines().count(), 2);
    let report = read_summary(dir.join(SUMMARY_FILE)).unwrap();
    assert_eq!(report.couplings, config.couplings());
    assert_eq!(report.spin, 0.5);
    assert_eq!(report.summary.n_sweeps, 400);
    assert_relative_eq!(report.summary.energy, summary.energy, max_relative = 1e-12);

    // restart check: a restored snapshot reproduces the tracked energy
    let (n_sweeps, spins) = read_snapshot(&dir.join("spins_400.dat")).unwrap();
    assert_eq!(n_sweeps, 400);
    let (_, model) = honeycomb_model(4);
    assert_relative_eq!(model.energy(&spins).unwrap(), summary.energy, epsilon = 1e-8);

    fs::remove_dir_all(&dir).unwrap();
}
