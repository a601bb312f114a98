//! Pipeline orchestrator - replays a session through the analyzer.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::ScannerConfig;
use ingestion::{SessionReplay, SESSION_FILE};
use tracing::{info, warn};

use super::{FrameAnalyzer, PipelineStats};
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scanner configuration
    pub scanner: ScannerConfig,

    /// Session directory to replay
    pub session: PathBuf,

    /// Maximum number of frames to analyse (None = unlimited)
    pub max_frames: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Directory for annotated frames (None = disabled)
    pub annotate_dir: Option<PathBuf>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Load the session without analysing it
    pub fn load_session(&self) -> Result<SessionReplay> {
        let session = &self.config.session;
        if !session.join(SESSION_FILE).is_file() {
            return Err(CliError::session_not_found(session).into());
        }

        let replay = SessionReplay::load(session)
            .with_context(|| format!("Failed to load session from {}", session.display()))?;
        if replay.frame_count() == 0 {
            return Err(CliError::empty_session(session).into());
        }

        Ok(replay)
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let replay = self.load_session()?;
        info!(
            session = %replay.dir().display(),
            events = replay.len(),
            frames = replay.frame_count(),
            span = ?replay.time_span(),
            "Session loaded"
        );

        let mut analyzer = FrameAnalyzer::from_config(&self.config.scanner);
        if let Some(dir) = &self.config.annotate_dir {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create annotation directory {}", dir.display())
            })?;
            info!(dir = %dir.display(), "Saving annotated frames");
            analyzer = analyzer.with_annotation(dir);
        }
        let mut rx = replay.start(self.config.buffer_size.max(1));
        let max_frames = self.config.max_frames;

        info!(max_frames = ?max_frames, "Pipeline running");

        // Single-owner analysis loop
        let mut stats = PipelineStats::default();
        let pipeline_task = async {
            while let Some(event) = rx.recv().await {
                stats.events_received += 1;

                match analyzer.on_event(event) {
                    Ok(Some(report)) => {
                        stats.frames_analysed += 1;
                        stats.metrics.update(&report);

                        if let Some(max) = max_frames {
                            if stats.frames_analysed >= max {
                                info!(frames = stats.frames_analysed, "Reached max frames limit");
                                break;
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        stats.frames_failed += 1;
                        warn!(error = %e, "Frame analysis failed, continuing");
                    }
                }
            }
        };

        // Run with optional timeout; statistics gathered so far are kept
        if let Some(timeout) = self.config.timeout {
            if tokio::time::timeout(timeout, pipeline_task).await.is_err() {
                warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
            }
        } else {
            pipeline_task.await;
        }

        // Shutdown
        info!("Shutting down pipeline...");
        replay.stop();
        drop(rx);

        let ingestion = replay.metrics().snapshot();
        let mut final_stats = stats;
        final_stats.duration = start_time.elapsed();
        final_stats.parse_errors = ingestion.parse_errors;
        final_stats.image_errors = ingestion.image_errors;
        final_stats.coverage_regions = analyzer.coverage().regions().len();

        for buffer in analyzer.sync().buffer_stats() {
            if buffer.out_of_order > 0 {
                warn!(
                    kind = buffer.kind.as_str(),
                    out_of_order = buffer.out_of_order,
                    "Telemetry arrived out of order"
                );
            }
        }

        info!(
            focal_length = ?analyzer.detector().focal_length(),
            duration_secs = final_stats.duration.as_secs_f64(),
            fps = format!("{:.2}", final_stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(final_stats)
    }
}
