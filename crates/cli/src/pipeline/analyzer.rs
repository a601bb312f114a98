//! Per-event analysis: telemetry fusion, motion detection and coverage.

use std::path::{Path, PathBuf};
use std::time::Instant;

use contracts::{ContractError, FovFootprint, MovingObject, OpticalFlow, PolygonUnion, ScannerConfig};
use coverage::{CoverageSweeper, GeoUnion};
use image::RgbImage;
use ingestion::SessionEvent;
use motion_detector::{annotate_objects, BlockMatchingFlow, GroundSpeedMotionDetector};
use observability::{record_buffer_stats, record_detection, record_frame_latency_ms, FrameReport};
use sensor_sync::SensorSync;
use tracing::{debug, info, warn};

/// Single owner of the analysis state for one session
pub struct FrameAnalyzer<F = BlockMatchingFlow, U = GeoUnion> {
    sync: SensorSync,
    detector: GroundSpeedMotionDetector<F>,
    coverage: CoverageSweeper<U>,
    annotate_dir: Option<PathBuf>,
    frames: u64,
}

impl FrameAnalyzer {
    /// Analyzer with the built-in block-matching flow and `geo` union
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(
            config,
            BlockMatchingFlow::from_config(&config.motion.flow),
            GeoUnion::new(),
        )
    }
}

impl<F: OpticalFlow, U: PolygonUnion> FrameAnalyzer<F, U> {
    pub fn new(config: &ScannerConfig, flow: F, union: U) -> Self {
        Self {
            sync: SensorSync::new(config.sensor_sync.clone()),
            detector: GroundSpeedMotionDetector::new(
                config.camera.clone(),
                config.motion.clone(),
                flow,
            ),
            coverage: CoverageSweeper::new(config.coverage.clone(), union),
            annotate_dir: None,
            frames: 0,
        }
    }

    /// Save an annotated copy of every frame with objects into `dir`
    pub fn with_annotation(mut self, dir: impl Into<PathBuf>) -> Self {
        self.annotate_dir = Some(dir.into());
        self
    }

    /// Apply one replayed event; frames yield a report
    pub fn on_event(&mut self, event: SessionEvent) -> Result<Option<FrameReport>, ContractError> {
        match event {
            SessionEvent::Location(sample) => {
                self.sync
                    .ingest_location(sample.lat, sample.lng, sample.alt, sample.t);
                Ok(None)
            }
            SessionEvent::Orientation {
                roll_deg,
                pitch_deg,
                azimuth_deg,
                t,
            } => {
                self.sync
                    .ingest_orientation(roll_deg, pitch_deg, azimuth_deg, t);
                Ok(None)
            }
            SessionEvent::Frame {
                image,
                t,
                footprint,
            } => self.on_frame(image, t, &footprint).map(Some),
        }
    }

    /// Fuse, detect and extend coverage for one frame
    ///
    /// Coverage is updated even when detection fails, since the footprint is
    /// valid regardless of the image contents.
    pub fn on_frame(
        &mut self,
        image: RgbImage,
        t: f64,
        footprint: &FovFootprint,
    ) -> Result<FrameReport, ContractError> {
        let started = Instant::now();
        let index = self.frames;
        self.frames += 1;
        let degraded_fusion = !self.sync.has_location() || !self.sync.has_orientation();

        self.sync.set_frame(image, t);
        let record = self
            .sync
            .fuse_image()
            .ok_or_else(|| ContractError::Other("frame missing after set_frame".to_string()))?;

        let bootstrap = !self.detector.is_primed();
        let detection = self.detector.detect(&record, footprint);
        self.coverage.update(footprint);
        let detection = detection?;

        record_detection(&detection);
        if let Some(dir) = &self.annotate_dir {
            if !detection.objects.is_empty() {
                save_annotated(dir, index, &record.image, &detection.objects);
            }
        }
        record_buffer_stats(&self.sync.buffer_stats());

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        record_frame_latency_ms(latency_ms);

        if !detection.objects.is_empty() {
            info!(
                t,
                objects = detection.objects.len(),
                peak_speed = format!("{:.2}", detection.peak_speed),
                "Moving objects detected"
            );
        } else {
            debug!(t, peak_speed = detection.peak_speed, "Frame analysed");
        }

        Ok(FrameReport {
            t,
            bootstrap,
            objects: detection.objects.len(),
            peak_speed: detection.peak_speed,
            coverage_vertices: self.coverage.vertex_count(),
            coverage_area: self.coverage.area(),
            welded_vertices: self.coverage.welded_vertices(),
            dropped_components: self.coverage.dropped_components(),
            degraded_fusion,
            latency_ms,
        })
    }

    pub fn sync(&self) -> &SensorSync {
        &self.sync
    }

    pub fn coverage(&self) -> &CoverageSweeper<U> {
        &self.coverage
    }

    pub fn detector(&self) -> &GroundSpeedMotionDetector<F> {
        &self.detector
    }
}

/// Annotation output is best effort; a failed write never fails the frame
fn save_annotated(dir: &Path, index: u64, image: &RgbImage, objects: &[MovingObject]) {
    let path = annotated_path(dir, index);
    match annotate_objects(image, objects).save(&path) {
        Ok(()) => debug!(path = %path.display(), "Annotated frame saved"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to save annotated frame"),
    }
}

fn annotated_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(format!("frame_{:06}.png", index))
}
