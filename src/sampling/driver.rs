//! Annealing run loop: measure, snapshot, sweep, cool.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::anneal::{AnnealingSchedule, Phase};
use super::metropolis::MetropolisEngine;
use super::traits::{Measurement, MeasurementSink, SnapshotSink};
use crate::error::{Result, SpinError};
use crate::lattice::Lattice;
use crate::model::CouplingModel;
use crate::spins::SpinConfiguration;

/// Loop lengths and intervals of an annealing run.
#[derive(Copy, Clone, Debug)]
pub struct RunParams {
    pub max_sweeps: u64,
    /// Sweeps between energy-log rows.
    pub log_interval: u64,
    /// Sweeps between snapshots.
    pub sweeps_per_dump: u64,
}

/// Final state of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub n_sites: usize,
    pub n_sweeps: u64,
    pub sweeps_anneal: u64,
    pub alpha: f64,
    pub kt: f64,
    pub beta: f64,
    pub energy: f64,
    /// Energy recomputed from every bond at the end of the run.
    pub energy_recomputed: f64,
    pub acceptance_ratio: f64,
    pub magnetization: [f64; 3],
}

/// Drive `engine` through `params.max_sweeps` sweeps following `schedule`.
///
/// A measurement is recorded whenever `n_sweeps % log_interval == 0` and a
/// snapshot whenever `n_sweeps % sweeps_per_dump == 0`, including the final
/// sweep count. After each sweep the temperature follows the schedule; the
/// target temperature is logged when annealing ends and once more at exit.
#[allow(clippy::too_many_arguments)]
pub fn run_annealing<M, S>(
    engine: &mut MetropolisEngine,
    model: &CouplingModel,
    lattice: &Lattice,
    spins: &mut SpinConfiguration,
    schedule: &AnnealingSchedule,
    params: RunParams,
    measurements: &mut M,
    snapshots: &mut S,
) -> Result<RunSummary>
where
    M: MeasurementSink + ?Sized,
    S: SnapshotSink + ?Sized,
{
    if params.log_interval == 0 || params.sweeps_per_dump == 0 {
        return Err(SpinError::InvalidConfig(
            "log_interval and sweeps_per_dump must be positive".into(),
        ));
    }
    info!(
        n_sites = spins.len(),
        max_sweeps = params.max_sweeps,
        sweeps_anneal = schedule.sweeps_anneal(),
        alpha = schedule.alpha(),
        "starting annealing run"
    );

    let kt_final = schedule.kt_final();
    while engine.n_sweeps() < params.max_sweeps {
        observe(engine, lattice, spins, params, measurements, snapshots)?;

        engine.update_metropolis(model, spins)?;

        let n = engine.n_sweeps();
        match schedule.phase(n) {
            Phase::Annealing => engine.change_beta(schedule.beta(n), false)?,
            Phase::Equilibrating if n == schedule.sweeps_anneal() => {
                engine.change_beta(1.0 / kt_final, true)?;
                info!(n_sweeps = n, kt = kt_final, "annealing finished, equilibrating");
            }
            Phase::Equilibrating => {}
        }
    }
    observe(engine, lattice, spins, params, measurements, snapshots)?;

    // the target temperature is recorded even if already logged
    engine.change_beta(1.0 / kt_final, true)?;

    let m = spins.magnetization();
    let summary = RunSummary {
        n_sites: spins.len(),
        n_sweeps: engine.n_sweeps(),
        sweeps_anneal: schedule.sweeps_anneal(),
        alpha: schedule.alpha(),
        kt: engine.kt(),
        beta: engine.beta(),
        energy: engine.energy(),
        energy_recomputed: model.energy(spins)?,
        acceptance_ratio: engine.acceptance_ratio(),
        magnetization: [m.x, m.y, m.z],
    };
    info!(
        n_sweeps = summary.n_sweeps,
        energy = summary.energy,
        mz = m.z,
        acceptance = summary.acceptance_ratio,
        "annealing run complete"
    );
    Ok(summary)
}

fn observe<M, S>(
    engine: &MetropolisEngine,
    lattice: &Lattice,
    spins: &SpinConfiguration,
    params: RunParams,
    measurements: &mut M,
    snapshots: &mut S,
) -> Result<()>
where
    M: MeasurementSink + ?Sized,
    S: SnapshotSink + ?Sized,
{
    let n = engine.n_sweeps();
    if n % params.log_interval == 0 {
        let mz = spins.magnetization().z;
        debug!(n_sweeps = n, energy = engine.energy(), mz, "measurement");
        measurements.record(Measurement { n_sweeps: n, energy: engine.energy(), mz })?;
    }
    if n % params.sweeps_per_dump == 0 {
        debug!(n_sweeps = n, "snapshot");
        engine.dump(snapshots, lattice, spins)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{MetropolisParams, Proposal, Snapshot};
    use crate::systems::HoneycombJ1J2J3;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    const KT0: f64 = 1.0;
    const KT: f64 = 0.4;
    const SWEEPS_ANNEAL: u64 = 20;

    struct EnergyTrace(Vec<f64>);

    impl MeasurementSink for EnergyTrace {
        fn record(&mut self, measurement: Measurement) -> Result<()> {
            self.0.push(measurement.energy);
            Ok(())
        }
    }

    fn setup() -> (Lattice, CouplingModel, MetropolisEngine, SpinConfiguration) {
        let lattice = Lattice::new("honeycomb", [4, 4]).unwrap();
        let mut model = HoneycombJ1J2J3::default().build(&lattice, 0.5).unwrap();
        model.simplify();
        model.build_mc_list();
        let mut engine = MetropolisEngine::new(MetropolisParams {
            seed_global: 11,
            kt: KT0,
            proposal: Proposal::Sphere,
            ..Default::default()
        })
        .unwrap();
        let mut spins = SpinConfiguration::aligned(lattice.n_sites(), 0.5, Vector3::z()).unwrap();
        engine.randomize_spins(&mut spins);
        engine.update_energy(&model, &spins).unwrap();
        (lattice, model, engine, spins)
    }

    /// Energies after each of `k` sweeps, with `beta_after(n)` set after sweep `n`.
    fn manual_trace(k: u64, beta_after: impl Fn(u64) -> f64) -> (Vec<f64>, f64) {
        let (_, model, mut engine, mut spins) = setup();
        let mut trace = vec![engine.energy()];
        for n in 1..=k {
            engine.update_metropolis(&model, &mut spins).unwrap();
            engine.change_beta(beta_after(n), false).unwrap();
            trace.push(engine.energy());
        }
        (trace, engine.beta())
    }

    #[test]
    fn test_sweeps_follow_the_cooling_schedule() {
        let schedule = AnnealingSchedule::new(KT0, KT, SWEEPS_ANNEAL).unwrap();
        let alpha = schedule.alpha();
        let scheduled = |n: u64| {
            if n < SWEEPS_ANNEAL {
                1.0 / (KT0 * alpha.powf(n as f64))
            } else {
                1.0 / KT
            }
        };

        for k in [1, 5, 13, 19, 20, 35] {
            let (lattice, model, mut engine, mut spins) = setup();
            let mut trace = EnergyTrace(Vec::new());
            let mut snapshots: Vec<Snapshot> = Vec::new();
            let params = RunParams { max_sweeps: k, log_interval: 1, sweeps_per_dump: 1000 };
            run_annealing(
                &mut engine, &model, &lattice, &mut spins, &schedule, params, &mut trace,
                &mut snapshots,
            )
            .unwrap();

            let (expected, beta_k) = manual_trace(k, scheduled);
            assert_eq!(trace.0.len() as u64, k + 1);
            for (got, want) in trace.0.iter().zip(&expected) {
                assert_relative_eq!(*got, *want, epsilon = 1e-9);
            }
            if k < SWEEPS_ANNEAL {
                assert_relative_eq!(beta_k, 1.0 / (KT0 * alpha.powi(k as i32)), max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_fixed_temperature_gives_a_different_trajectory() {
        // the energy trace must depend on beta
        let schedule = AnnealingSchedule::new(KT0, KT, SWEEPS_ANNEAL).unwrap();
        let (cooled, _) = manual_trace(35, |n| schedule.beta(n));
        let (fixed, _) = manual_trace(35, |_| 1.0 / KT0);
        assert_ne!(cooled, fixed);
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let (lattice, model, mut engine, mut spins) = setup();
        let schedule = AnnealingSchedule::new(KT0, KT, SWEEPS_ANNEAL).unwrap();
        let params = RunParams { max_sweeps: 10, log_interval: 0, sweeps_per_dump: 1 };
        let mut rows: Vec<Measurement> = Vec::new();
        let mut snapshots: Vec<Snapshot> = Vec::new();
        assert!(matches!(
            run_annealing(
                &mut engine, &model, &lattice, &mut spins, &schedule, params, &mut rows,
                &mut snapshots,
            ),
            Err(SpinError::InvalidConfig(_))
        ));
    }
}
