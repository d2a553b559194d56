//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `pocketlist_core` linkage outside the mobile runtime.
//! - Report how many notes and tasks the configured database holds.

use pocketlist_core::{Collections, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pocketlist_core ping={}", pocketlist_core::ping());
    println!("pocketlist_core version={}", pocketlist_core::core_version());

    let config = CoreConfig::from_env();
    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = pocketlist_core::init_logging(&config.log_level, &log_dir.to_string_lossy())
        {
            eprintln!("logging disabled: {err}");
        }
    }

    let collections = match Collections::open_with_config(&config) {
        Ok(collections) => collections,
        Err(err) => {
            eprintln!("failed to open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    println!("db_path={}", config.db_path.display());
    println!("notes={}", collections.notes.notes().len());
    println!(
        "tasks={} open={}",
        collections.tasks.tasks().len(),
        collections.tasks.open_count()
    );
    ExitCode::SUCCESS
}
