//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{FocalReference, ScannerConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::ensure_config_exists;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    camera: CameraInfo,
    sensor_sync: SensorSyncInfo,
    motion: MotionInfo,
    coverage: CoverageInfo,
}

#[derive(Serialize)]
struct CameraInfo {
    horizontal_fov_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_height: Option<u32>,
    focal_reference: String,
    /// Known only with an explicit calibration width
    #[serde(skip_serializing_if = "Option::is_none")]
    focal_length_px: Option<f64>,
}

#[derive(Serialize)]
struct SensorSyncInfo {
    location_buffer_len: usize,
    orientation_buffer_len: usize,
}

#[derive(Serialize)]
struct MotionInfo {
    max_object_speed: f64,
    min_detection_speed: f64,
    detection_threshold: f64,
    object_size_low: f64,
    object_size_high: f64,
    flow_block_size: u32,
    flow_search_radius: u32,
}

#[derive(Serialize)]
struct CoverageInfo {
    mode: String,
    weld_epsilon: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    ensure_config_exists(&args.config)?;

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &ScannerConfig) -> ConfigInfo {
    let camera = &config.camera;
    let motion = &config.motion;

    ConfigInfo {
        version: format!("{:?}", config.version),
        camera: CameraInfo {
            horizontal_fov_deg: camera.horizontal_fov_deg,
            image_width: camera.image_width,
            image_height: camera.image_height,
            focal_reference: focal_reference_name(camera.focal_reference).to_string(),
            focal_length_px: camera
                .image_width
                .map(|width| motion_detector::focal_length(width, camera.horizontal_fov_deg)),
        },
        sensor_sync: SensorSyncInfo {
            location_buffer_len: config.sensor_sync.location_buffer_len,
            orientation_buffer_len: config.sensor_sync.orientation_buffer_len,
        },
        motion: MotionInfo {
            max_object_speed: motion.max_object_speed,
            min_detection_speed: motion.min_detection_speed,
            detection_threshold: motion.detection_threshold(),
            object_size_low: motion.object_size_low,
            object_size_high: motion.object_size_high,
            flow_block_size: motion.flow.block_size,
            flow_search_radius: motion.flow.search_radius,
        },
        coverage: CoverageInfo {
            mode: format!("{:?}", config.coverage.mode),
            weld_epsilon: config.coverage.weld_epsilon,
        },
    }
}

fn focal_reference_name(reference: FocalReference) -> &'static str {
    match reference {
        FocalReference::Width => "width",
        FocalReference::LegacyHeight => "legacy_height",
    }
}

fn print_config_info(config: &ScannerConfig) {
    let info = build_config_info(config);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Aerial Scanner Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📷 Camera");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Horizontal FOV: {}°", info.camera.horizontal_fov_deg);
    match (info.camera.image_width, info.camera.image_height) {
        (Some(w), Some(h)) => println!("   ├─ Calibrated size: {}x{}", w, h),
        (Some(w), None) => println!("   ├─ Calibrated width: {}", w),
        _ => println!("   ├─ Calibrated size: (from first frame)"),
    }
    match info.camera.focal_length_px {
        Some(focal) => println!("   └─ Focal length: {:.2} px", focal),
        None => println!(
            "   └─ Focal length: derived from frame {}",
            info.camera.focal_reference
        ),
    }

    println!("\n📡 Sensor Sync");
    println!("   ├─ Location buffer: {}", info.sensor_sync.location_buffer_len);
    println!(
        "   └─ Orientation buffer: {}",
        info.sensor_sync.orientation_buffer_len
    );

    let motion = &info.motion;
    println!("\n🎯 Motion Detection");
    println!("   ├─ Max object speed: {}", motion.max_object_speed);
    println!(
        "   ├─ Min detection speed: {} (intensity {:.2})",
        motion.min_detection_speed, motion.detection_threshold
    );
    println!(
        "   ├─ Object size: {} .. {} of frame",
        motion.object_size_low, motion.object_size_high
    );
    println!(
        "   └─ Flow: block {} px, radius {} px",
        motion.flow_block_size, motion.flow_search_radius
    );

    println!("\n🗺️  Coverage");
    println!("   ├─ Mode: {}", info.coverage.mode);
    println!("   └─ Weld epsilon: {}", info.coverage.weld_epsilon);

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focal_length_shown_with_explicit_width() {
        let mut config = ScannerConfig::default();
        assert!(build_config_info(&config).camera.focal_length_px.is_none());

        config.camera.image_width = Some(100);
        let info = build_config_info(&config);
        let focal = info.camera.focal_length_px.unwrap();
        assert!((focal - 86.6025).abs() < 1e-3);
        assert_eq!(info.camera.focal_reference, "width");
    }

    #[test]
    fn test_info_json_shape() {
        let info = build_config_info(&ScannerConfig::default());
        let value = serde_json::to_value(&info).unwrap();

        assert_eq!(value["coverage"]["mode"], "Legacy");
        assert_eq!(value["motion"]["flow_block_size"], 8);
        assert!(value["camera"].get("image_width").is_none());
    }

    #[test]
    fn test_missing_config_is_error() {
        let args = InfoArgs {
            config: "missing.toml".into(),
            json: true,
        };
        assert!(run_info(&args).is_err());
    }
}
