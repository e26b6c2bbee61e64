//! Headless battle driver.
//!
//! Loads an encounter from the content directory, runs it with scripted
//! player input until it ends, and prints a JSON summary on stdout. Logs go
//! to stderr (and optionally a file), so the summary can be piped.
//!
//! # Examples
//!
//! ```bash
//! BATTLE_SPEED=fast RUST_LOG=battle_core=debug cargo run -p battle-sim
//! ```

mod config;
mod driver;
mod effects;
mod logging;

use anyhow::Result;

use config::SimConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = SimConfig::from_env();
    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Starting battle simulation");
    tracing::info!("Content: {}", config.content_dir.display());
    tracing::info!("Encounter: {}", config.encounter);

    let battle = driver::assemble(&config)?;
    let summary = driver::run(battle, &config);

    tracing::info!(
        outcome = %summary.outcome,
        ticks = summary.ticks,
        elapsed_ms = summary.elapsed_ms,
        "simulation finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
