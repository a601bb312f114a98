//! Configuration validation
//!
//! Rules:
//! - horizontal view angle in (0, 180) degrees
//! - explicit image dimensions > 0
//! - buffer capacities > 0
//! - 0 <= min_detection_speed < max_object_speed
//! - 0 <= object_size_low < object_size_high <= 1
//! - weld_epsilon > 0, flow block_size > 0

use contracts::{
    CameraConfig, ContractError, CoverageConfig, MotionConfig, ScannerConfig, SensorSyncConfig,
};

/// Validate a ScannerConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ScannerConfig) -> Result<(), ContractError> {
    validate_camera(&config.camera)?;
    validate_sensor_sync(&config.sensor_sync)?;
    validate_motion(&config.motion)?;
    validate_coverage(&config.coverage)?;
    Ok(())
}

fn validate_camera(camera: &CameraConfig) -> Result<(), ContractError> {
    let fov = camera.horizontal_fov_deg;
    if !(fov > 0.0 && fov < 180.0) {
        return Err(ContractError::config_validation(
            "camera.horizontal_fov_deg",
            format!("must be in (0, 180), got {fov}"),
        ));
    }

    for (field, value) in [
        ("camera.image_width", camera.image_width),
        ("camera.image_height", camera.image_height),
    ] {
        if value == Some(0) {
            return Err(ContractError::config_validation(field, "must be > 0"));
        }
    }
    Ok(())
}

fn validate_sensor_sync(sync: &SensorSyncConfig) -> Result<(), ContractError> {
    if sync.location_buffer_len == 0 {
        return Err(ContractError::config_validation(
            "sensor_sync.location_buffer_len",
            "buffer capacity must be > 0",
        ));
    }
    if sync.orientation_buffer_len == 0 {
        return Err(ContractError::config_validation(
            "sensor_sync.orientation_buffer_len",
            "buffer capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_motion(motion: &MotionConfig) -> Result<(), ContractError> {
    if !(motion.max_object_speed > 0.0) {
        return Err(ContractError::config_validation(
            "motion.max_object_speed",
            format!("must be > 0, got {}", motion.max_object_speed),
        ));
    }

    if !(motion.min_detection_speed >= 0.0 && motion.min_detection_speed < motion.max_object_speed)
    {
        return Err(ContractError::config_validation(
            "motion.min_detection_speed",
            format!(
                "must be in [0, max_object_speed ({})), got {}",
                motion.max_object_speed, motion.min_detection_speed
            ),
        ));
    }

    let (low, high) = (motion.object_size_low, motion.object_size_high);
    if !(low >= 0.0 && low < high && high <= 1.0) {
        return Err(ContractError::config_validation(
            "motion.object_size_low / motion.object_size_high",
            format!("require 0 <= low < high <= 1, got low={low} high={high}"),
        ));
    }

    if motion.flow.block_size == 0 {
        return Err(ContractError::config_validation(
            "motion.flow.block_size",
            "must be > 0",
        ));
    }
    Ok(())
}

fn validate_coverage(coverage: &CoverageConfig) -> Result<(), ContractError> {
    if !(coverage.weld_epsilon > 0.0) {
        return Err(ContractError::config_validation(
            "coverage.weld_epsilon",
            format!("must be > 0, got {}", coverage.weld_epsilon),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ContractError) -> String {
        match err {
            ContractError::ConfigValidation { field, .. } => field,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&ScannerConfig::default()).is_ok());
    }

    #[test]
    fn test_fov_out_of_range() {
        let mut config = ScannerConfig::default();
        config.camera.horizontal_fov_deg = 180.0;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "camera.horizontal_fov_deg"
        );

        config.camera.horizontal_fov_deg = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_image_width() {
        let mut config = ScannerConfig::default();
        config.camera.image_width = Some(0);
        assert_eq!(field_of(validate(&config).unwrap_err()), "camera.image_width");
    }

    #[test]
    fn test_zero_buffer_len() {
        let mut config = ScannerConfig::default();
        config.sensor_sync.orientation_buffer_len = 0;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "sensor_sync.orientation_buffer_len"
        );
    }

    #[test]
    fn test_detection_speed_not_below_max() {
        let mut config = ScannerConfig::default();
        config.motion.min_detection_speed = config.motion.max_object_speed;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "motion.min_detection_speed"
        );
    }

    #[test]
    fn test_size_limits_order() {
        let mut config = ScannerConfig::default();
        config.motion.object_size_low = 0.5;
        config.motion.object_size_high = 0.1;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("low < high"));
    }

    #[test]
    fn test_weld_epsilon_positive() {
        let mut config = ScannerConfig::default();
        config.coverage.weld_epsilon = 0.0;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "coverage.weld_epsilon"
        );
    }

    #[test]
    fn test_first_error_wins() {
        let mut config = ScannerConfig::default();
        config.camera.horizontal_fov_deg = -1.0;
        config.coverage.weld_epsilon = -1.0;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "camera.horizontal_fov_deg"
        );
    }
}
