mod args;

use args::Args;
use clap::Parser;
use fivem_harvest_run::config::HarvestConfig;
use fivem_harvest_run::desktop::SystemDesktop;
use fivem_harvest_run::error::HarvestResult;
use fivem_harvest_run::harvest::{CycleController, TokioSleeper};
use fivem_harvest_run::targeting::TargetingEngine;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.print_config {
        return match serde_json::to_string_pretty(&config) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("❌ Could not serialize config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

/// Preset, then environment, then command line.
fn load_config(args: &Args) -> HarvestResult<HarvestConfig> {
    let mut config = HarvestConfig::preset(args.preset);
    config.apply_env()?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(config: &HarvestConfig) -> HarvestResult<()> {
    let desktop = SystemDesktop::new()?;
    let engine = TargetingEngine::load(&config.template_path, config.match_threshold)
        .with_dump_dir(config.capture_dump_dir.clone());
    let mut controller = CycleController::new(config, desktop, engine, TokioSleeper, rand::rng())?;

    let interrupted = tokio::select! {
        summary = controller.run() => {
            log::info!(
                "✅ Finished after {} iterations ({} successful): {}.",
                summary.iterations,
                summary.successes,
                summary.stop_reason
            );
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        // The run may have stopped between a modifier press and its release.
        controller.release_held_keys();
        log::info!("🛑 Interrupted; shutting down.");
    }
    Ok(())
}
