//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{CoverageMode, FocalReference, ScannerConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    horizontal_fov_deg: f64,
    max_object_speed: f64,
    detection_threshold: f64,
    coverage_mode: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    horizontal_fov_deg: config.camera.horizontal_fov_deg,
                    max_object_speed: config.motion.max_object_speed,
                    detection_threshold: config.motion.detection_threshold(),
                    coverage_mode: format!("{:?}", config.coverage.mode),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ScannerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.camera.focal_reference == FocalReference::LegacyHeight
        && config.camera.image_width.is_none()
    {
        warnings.push(
            "camera.focal_reference = legacy_height derives the focal length from the frame height"
                .to_string(),
        );
    }

    if config.coverage.mode == CoverageMode::Legacy {
        warnings.push(
            "coverage.mode = legacy drops footprints that do not touch the coverage".to_string(),
        );
    }

    if config.motion.min_detection_speed == 0.0 {
        warnings.push("motion.min_detection_speed is 0 - every moving pixel is kept".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Horizontal FOV: {}°", summary.horizontal_fov_deg);
            println!("  Max object speed: {}", summary.max_object_speed);
            println!("  Detection threshold: {:.2}", summary.detection_threshold);
            println!("  Coverage mode: {}", summary.coverage_mode);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(content: &str) -> (tempfile::NamedTempFile, ValidateArgs) {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        (file, args)
    }

    #[test]
    fn test_valid_config_reports_summary() {
        let (_file, args) = args_for(
            r#"
[motion]
max_object_speed = 10.0
min_detection_speed = 1.0

[coverage]
mode = "multi_region"
"#,
        );

        let result = validate_config(&args);
        assert!(result.valid);
        assert!(result.warnings.is_none());
        let summary = result.summary.unwrap();
        assert!((summary.detection_threshold - 25.5).abs() < 1e-9);
        assert_eq!(summary.coverage_mode, "MultiRegion");
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let (_file, args) = args_for("[camera]\nhorizontal_fov_deg = 200.0\n");

        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("camera.horizontal_fov_deg"));
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "does/not/exist.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_legacy_mode_warns() {
        let warnings = collect_warnings(&ScannerConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("coverage.mode"));
    }
}
