//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::ensure_config_exists;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    ensure_config_exists(&args.config)?;

    let scanner = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        fov_deg = scanner.camera.horizontal_fov_deg,
        max_object_speed = scanner.motion.max_object_speed,
        coverage_mode = ?scanner.coverage.mode,
        "Configuration loaded"
    );

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        scanner,
        session: args.session.clone(),
        max_frames: if args.max_frames == 0 {
            None
        } else {
            Some(args.max_frames)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        annotate_dir: args.annotate_dir.clone(),
    };

    let pipeline = Pipeline::new(pipeline_config);

    // Dry run - check the session loads and exit
    if args.dry_run {
        let replay = pipeline.load_session()?;
        info!(
            events = replay.len(),
            frames = replay.frame_count(),
            "Dry run mode - configuration and session are valid, exiting"
        );
        return Ok(());
    }

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!(session = %args.session.display(), "Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        frames_analysed = stats.frames_analysed,
                        frames_failed = stats.frames_failed,
                        duration_secs = stats.duration.as_secs_f64(),
                        fps = format!("{:.2}", stats.fps()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        result = shutdown_signal => {
            result?;
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Aerial Scanner finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() -> Result<()> {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to install Ctrl+C handler")
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<(), anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        result = ctrl_c => result,
        result = terminate => result,
    }
}
