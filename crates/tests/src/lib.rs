//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Config -> SensorSync -> GroundSpeedMotionDetector -> CoverageSweeper
//! - Recorded session replay through the same chain
//! - Coverage policies over realistic flight strips

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_default_config_validates() {
        let config = contracts::ScannerConfig::default();
        assert!(config_loader::ConfigLoader::validate(&config).is_ok());
    }
}

#[cfg(test)]
mod fixtures {
    use contracts::{FovFootprint, GeoPoint};
    use image::{Rgb, RgbImage};

    /// Nadir footprint of a 60° camera 100 m above `(0, lng)`, ~1.155 m/px at 100 px
    pub fn footprint(lng: f64) -> FovFootprint {
        let (dlat, dlng) = (0.000_522_4, 0.000_518_8);
        FovFootprint::new([
            GeoPoint::new(dlat, lng - dlng),
            GeoPoint::new(dlat, lng + dlng),
            GeoPoint::new(-dlat, lng + dlng),
            GeoPoint::new(-dlat, lng - dlng),
        ])
    }

    /// Black 100x100 frame with a white 16x16 square at `(x, 40)`
    pub fn square_frame(x: u32) -> RgbImage {
        RgbImage::from_fn(100, 100, |px, py| {
            if px >= x && px < x + 16 && (40..56).contains(&py) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }
}

#[cfg(test)]
mod e2e_tests {
    use contracts::{CoverageMode, ObjectKind, ScannerConfig};
    use coverage::{CoverageSweeper, GeoUnion};
    use motion_detector::{BlockMatchingFlow, GroundSpeedMotionDetector};
    use observability::{AnalysisMetricsAggregator, FrameReport};
    use sensor_sync::SensorSync;

    use super::fixtures::{footprint, square_frame};

    /// End-to-end test: SensorSync -> detector -> coverage
    ///
    /// A square moves 4 px between frames; block matching sees its leading
    /// and trailing edges move while its uniform interior stays still.
    #[test]
    fn test_e2e_moving_square() {
        let config = ScannerConfig::default();
        let mut sync = SensorSync::new(config.sensor_sync.clone());
        let mut detector = GroundSpeedMotionDetector::new(
            config.camera.clone(),
            config.motion.clone(),
            BlockMatchingFlow::from_config(&config.motion.flow),
        );
        let mut sweeper = CoverageSweeper::new(config.coverage.clone(), GeoUnion::new());
        let mut aggregator = AnalysisMetricsAggregator::new();

        for (i, x) in [40u32, 44].into_iter().enumerate() {
            let t = i as f64 * 0.1;
            sync.ingest_location(0.0, 3.0, 100.0, t);
            sync.ingest_orientation(0.0, 0.0, 0.0, t);
            sync.set_frame(square_frame(x), t + 0.01);

            let record = sync.fuse_image().unwrap();
            assert_eq!(record.t, t + 0.01);
            assert_eq!(record.alt, 100.0);

            let bootstrap = !detector.is_primed();
            let fov = footprint(3.0);
            let detection = detector.detect(&record, &fov).unwrap();
            sweeper.update(&fov);

            aggregator.update(&FrameReport {
                t: record.t,
                bootstrap,
                objects: detection.objects.len(),
                peak_speed: detection.peak_speed,
                coverage_vertices: sweeper.vertex_count(),
                coverage_area: sweeper.area(),
                ..Default::default()
            });

            if bootstrap {
                assert!(detection.objects.is_empty());
                continue;
            }

            // 4 px at ~1.155 m/px
            assert!(detection.peak_speed > 4.0, "{}", detection.peak_speed);
            assert!(!detection.objects.is_empty());
            for object in &detection.objects {
                assert_eq!(object.kind, ObjectKind::Moving);
                let bbox = object.bbox;
                assert!(bbox.x >= 40 && bbox.x + bbox.width <= 64, "{:?}", bbox);
                assert!(bbox.y >= 40 && bbox.y + bbox.height <= 56, "{:?}", bbox);
                assert_eq!(
                    object.crop.dimensions(),
                    (bbox.width, bbox.height)
                );
            }
            // Static background
            assert_eq!(detection.speed_image.get_pixel(5, 5)[0], 0);
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.bootstrap_frames, 1);
        assert_eq!(summary.frames_with_objects, 1);
    }

    /// A strip of overlapping footprints grows one polygon
    #[test]
    fn test_e2e_coverage_strip() {
        let config = ScannerConfig::default();
        let mut sweeper = CoverageSweeper::new(config.coverage.clone(), GeoUnion::new());

        let single = footprint(3.0).to_polygon().area();
        for i in 0..10 {
            let boundary = sweeper.update(&footprint(3.0 + i as f64 * 0.0004));
            assert!(boundary.len() >= 4);
        }

        assert_eq!(sweeper.regions().len(), 1);
        assert_eq!(sweeper.dropped_components(), 0);

        // 10 footprints, each 0.0010376 wide, advancing 0.0004
        let width = 2.0 * 0.000_518_8 + 9.0 * 0.0004;
        let expected = width * 2.0 * 0.000_522_4;
        assert!((sweeper.area() - expected).abs() < 1e-10, "{}", sweeper.area());
        assert!(sweeper.area() > single);
    }

    /// A gap in the strip: legacy drops the far footprint, multi-region keeps it
    #[test]
    fn test_e2e_coverage_gap_policies() {
        // Footprints are ~0.00104 wide: 3.0 and 3.002 leave a gap
        let far = footprint(3.002);

        let mut config = ScannerConfig::default();
        let mut legacy = CoverageSweeper::new(config.coverage.clone(), GeoUnion::new());
        legacy.update(&footprint(3.0));
        legacy.update(&far);
        assert_eq!(legacy.regions().len(), 1);
        assert_eq!(legacy.dropped_components(), 1);

        config.coverage.mode = CoverageMode::MultiRegion;
        let mut multi = CoverageSweeper::new(config.coverage.clone(), GeoUnion::new());
        multi.update(&footprint(3.0));
        multi.update(&far);
        assert_eq!(multi.regions().len(), 2);
        assert_eq!(multi.boundaries().len(), 2);

        // Bridging footprint overlaps both regions and joins them
        multi.update(&footprint(3.001));
        assert_eq!(multi.regions().len(), 1);
        assert_eq!(multi.boundaries().len(), 1);
    }
}

#[cfg(test)]
mod replay_tests {
    use contracts::ScannerConfig;
    use coverage::{CoverageSweeper, GeoUnion};
    use ingestion::{SessionEvent, SessionReplay, SessionWriter};
    use motion_detector::{BlockMatchingFlow, GroundSpeedMotionDetector};
    use sensor_sync::SensorSync;

    use super::fixtures::{footprint, square_frame};

    /// Recorded session -> replay -> SensorSync -> detector -> coverage
    #[tokio::test]
    async fn test_replay_session_end_to_end() {
        let dir = tempfile::tempdir().unwrap();

        let mut writer = SessionWriter::create(dir.path()).unwrap();
        for i in 0..3u32 {
            let t = i as f64 * 0.1;
            writer.write_location(0.0, 3.0, 100.0, t).unwrap();
            writer.write_orientation(0.0, 0.0, 0.0, t).unwrap();
            writer
                .write_frame(&square_frame(40 + 4 * i), t + 0.05, &footprint(3.0))
                .unwrap();
        }
        writer.finish().unwrap();

        let replay = SessionReplay::load(dir.path()).unwrap();
        assert_eq!(replay.len(), 9);
        assert_eq!(replay.frame_count(), 3);

        let config = ScannerConfig::default();
        let mut sync = SensorSync::new(config.sensor_sync.clone());
        let mut detector = GroundSpeedMotionDetector::new(
            config.camera.clone(),
            config.motion.clone(),
            BlockMatchingFlow::from_config(&config.motion.flow),
        );
        let mut sweeper = CoverageSweeper::new(config.coverage.clone(), GeoUnion::new());

        let mut object_counts = Vec::new();
        let mut rx = replay.start(2);
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Location(sample) => {
                    sync.ingest_location(sample.lat, sample.lng, sample.alt, sample.t)
                }
                SessionEvent::Orientation {
                    roll_deg,
                    pitch_deg,
                    azimuth_deg,
                    t,
                } => sync.ingest_orientation(roll_deg, pitch_deg, azimuth_deg, t),
                SessionEvent::Frame {
                    image,
                    t,
                    footprint,
                } => {
                    sync.set_frame(image, t);
                    let record = sync.fuse_image().unwrap();
                    let detection = detector.detect(&record, &footprint).unwrap();
                    sweeper.update(&footprint);
                    object_counts.push(detection.objects.len());
                }
            }
        }

        assert_eq!(object_counts.len(), 3);
        assert_eq!(object_counts[0], 0);
        assert!(object_counts[1] > 0);
        assert!(object_counts[2] > 0);

        let snapshot = replay.metrics().snapshot();
        assert_eq!(snapshot.events_sent, 9);
        assert_eq!(snapshot.frames_sent, 3);
        assert_eq!(sweeper.update_count(), 3);
        assert_eq!(sync.reference_origin().map(|o| o.alt), Some(100.0));
    }

    /// Config file on disk drives the component settings
    #[test]
    fn test_config_file_drives_components() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanner.toml");
        std::fs::write(
            &path,
            r#"
[camera]
horizontal_fov_deg = 90.0
image_width = 200

[sensor_sync]
location_buffer_len = 3

[coverage]
mode = "multi_region"
"#,
        )
        .unwrap();

        let config = config_loader::ConfigLoader::load_from_path(&path).unwrap();
        let detector = GroundSpeedMotionDetector::new(
            config.camera.clone(),
            config.motion.clone(),
            BlockMatchingFlow::default(),
        );
        // tan(45°) = 1
        assert!((detector.focal_length().unwrap() - 100.0).abs() < 1e-9);

        let mut sync = SensorSync::new(config.sensor_sync.clone());
        for i in 0..5 {
            sync.ingest_location(0.0, 0.0, 0.0, i as f64);
        }
        assert_eq!(sync.locations().count(), 3);
        assert_eq!(sync.reference_origin().map(|o| o.t), Some(0.0));
    }
}
