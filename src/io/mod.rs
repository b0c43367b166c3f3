//! IO module - run configuration and dump-directory files.

mod config;
mod dump;

pub use config::{read_run_config, RunConfig};
pub use dump::{
    prepare_dump_dir, read_snapshot, read_summary, write_site_count, write_summary, EnergyLog,
    RunReport, SnapshotWriter,
    ENERGY_FILE, SITE_COUNT_FILE, SUMMARY_FILE,
};
