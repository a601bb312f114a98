//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// Aerial Scanner - ground-speed motion detection and coverage tracking for airborne cameras
#[derive(Parser, Debug)]
#[command(
    name = "aerial-scanner",
    author,
    version,
    about = "Airborne camera motion detection and coverage tracking",
    long_about = "Replays a recorded flight session through the analysis pipeline.\n\n\
                  Fuses camera frames with GPS and IMU telemetry, detects objects \n\
                  moving over the ground, and accumulates the surveyed area."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "AERIAL_SCANNER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "AERIAL_SCANNER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging setup requested by `-v`, `--quiet` and `--log-format`
    pub fn observability_config(&self) -> ObservabilityConfig {
        ObservabilityConfig::from_verbosity(self.verbose, self.quiet, self.log_format.into())
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyse a recorded flight session
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "scanner.toml",
        env = "AERIAL_SCANNER_CONFIG"
    )]
    pub config: PathBuf,

    /// Session directory containing session.jsonl
    #[arg(short, long, env = "AERIAL_SCANNER_SESSION")]
    pub session: PathBuf,

    /// Maximum number of frames to analyse (0 = unlimited)
    #[arg(long, default_value = "0", env = "AERIAL_SCANNER_MAX_FRAMES")]
    pub max_frames: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "AERIAL_SCANNER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and session, then exit without analysing
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size between replay and analysis
    #[arg(long, default_value = "64", env = "AERIAL_SCANNER_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "AERIAL_SCANNER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Save frames with outlined objects as PNG into this directory
    #[arg(long, env = "AERIAL_SCANNER_ANNOTATE_DIR")]
    pub annotate_dir: Option<PathBuf>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "scanner.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "scanner.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::try_parse_from([
            "aerial-scanner",
            "run",
            "--session",
            "flights/a",
            "--max-frames",
            "10",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.session, PathBuf::from("flights/a"));
                assert_eq!(args.max_frames, 10);
                assert_eq!(args.buffer_size, 64);
                assert_eq!(args.metrics_port, 0);
                assert!(args.annotate_dir.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_session() {
        assert!(Cli::try_parse_from(["aerial-scanner", "run"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["aerial-scanner", "-q", "-v", "info"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_observability_config_from_flags() {
        let cli =
            Cli::try_parse_from(["aerial-scanner", "-vv", "--log-format", "json", "info"]).unwrap();
        let config = cli.observability_config();
        assert_eq!(config.default_log_level, "trace");
        assert_eq!(config.log_format, observability::LogFormat::Json);
        assert!(!config.ignore_env);

        let cli = Cli::try_parse_from(["aerial-scanner", "-q", "info"]).unwrap();
        let config = cli.observability_config();
        assert_eq!(config.default_log_level, "warn");
        assert_eq!(config.log_format, observability::LogFormat::Pretty);
        assert!(config.ignore_env);
    }

    #[test]
    fn test_parse_annotate_dir() {
        let cli = Cli::try_parse_from([
            "aerial-scanner",
            "run",
            "--session",
            "flights/a",
            "--annotate-dir",
            "out/annotated",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.annotate_dir, Some(PathBuf::from("out/annotated")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
