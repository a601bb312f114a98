//! Main sensor sync implementation.

use std::sync::Arc;

use contracts::{
    BufferStats, FusedImageRecord, FusedImuRecord, ImageFrame, LocationSample, OrientationSample,
    SampleKind, SensorSyncConfig,
};
use image::RgbImage;
use tracing::{instrument, trace, warn};

use crate::buffer::SampleBuffer;

/// Nearest-time fusion of location, orientation and camera streams
///
/// Single-threaded and synchronous; wrap it in [`crate::SharedSensorSync`]
/// when ingestion and fusion run on different threads.
#[derive(Debug)]
pub struct SensorSync {
    /// Configuration
    config: SensorSyncConfig,
    /// Location buffer
    locations: SampleBuffer<LocationSample>,
    /// Orientation buffer (radians)
    orientations: SampleBuffer<OrientationSample>,
    /// Most recent frame
    frame: Option<ImageFrame>,
    /// First location of the flight, the stable local-planar origin
    reference: Option<LocationSample>,
}

impl SensorSync {
    /// Create a sync with the configured buffer capacities
    pub fn new(config: SensorSyncConfig) -> Self {
        let locations = SampleBuffer::new(config.location_buffer_len);
        let orientations = SampleBuffer::new(config.orientation_buffer_len);

        Self {
            config,
            locations,
            orientations,
            frame: None,
            reference: None,
        }
    }

    /// Buffer a location sample; the first one becomes the reference origin
    #[instrument(level = "trace", name = "sensor_sync_ingest_location", skip(self))]
    pub fn ingest_location(&mut self, lat: f64, lng: f64, alt: f64, t: f64) {
        let sample = LocationSample { lat, lng, alt, t };

        if self.reference.is_none() {
            trace!(lat, lng, alt, "reference origin recorded");
            self.reference = Some(sample);
        }

        if self.locations.push(sample).is_some() {
            record_eviction(SampleKind::Location);
        }
        record_sample(SampleKind::Location);
    }

    /// Buffer an orientation sample given in degrees
    #[instrument(level = "trace", name = "sensor_sync_ingest_orientation", skip(self))]
    pub fn ingest_orientation(&mut self, roll_deg: f64, pitch_deg: f64, azimuth_deg: f64, t: f64) {
        let sample = OrientationSample::from_degrees(roll_deg, pitch_deg, azimuth_deg, t);

        if self.orientations.push(sample).is_some() {
            record_eviction(SampleKind::Orientation);
        }
        record_sample(SampleKind::Orientation);
    }

    /// Record the most recent frame; fusion happens on [`Self::fuse_image`]
    pub fn set_frame(&mut self, image: RgbImage, t: f64) {
        self.frame = Some(ImageFrame::new(image, t));
    }

    /// Record a frame whose pixels are already shared
    pub fn set_shared_frame(&mut self, image: Arc<RgbImage>, t: f64) {
        self.frame = Some(ImageFrame { image, t });
    }

    /// Fuse the current frame with the nearest location and orientation
    ///
    /// Returns `None` until a frame has been set. A stream with no samples
    /// contributes zero-valued fields.
    #[instrument(level = "debug", name = "sensor_sync_fuse_image", skip(self))]
    pub fn fuse_image(&self) -> Option<FusedImageRecord> {
        let frame = self.frame.as_ref()?;

        let location = self.nearest_location(frame.t);
        let orientation = match self.orientations.nearest(frame.t) {
            Some(sample) => *sample,
            None => {
                warn_empty(SampleKind::Orientation, frame.t);
                OrientationSample::default()
            }
        };

        Some(FusedImageRecord::new(
            Arc::clone(&frame.image),
            location,
            orientation,
            frame.t,
        ))
    }

    /// Fuse the latest orientation sample with the nearest location
    #[instrument(level = "debug", name = "sensor_sync_fuse_orientation", skip(self))]
    pub fn fuse_orientation(&self) -> FusedImuRecord {
        let orientation = match self.orientations.latest() {
            Some(sample) => *sample,
            None => {
                warn_empty(SampleKind::Orientation, 0.0);
                OrientationSample::default()
            }
        };

        let location = self.nearest_location(orientation.t);
        FusedImuRecord::new(orientation, location)
    }

    fn nearest_location(&self, t: f64) -> LocationSample {
        match self.locations.nearest(t) {
            Some(sample) => *sample,
            None => {
                warn_empty(SampleKind::Location, t);
                LocationSample::default()
            }
        }
    }

    /// First location ever ingested
    pub fn reference_origin(&self) -> Option<LocationSample> {
        self.reference
    }

    /// Current frame, if any
    pub fn frame(&self) -> Option<&ImageFrame> {
        self.frame.as_ref()
    }

    /// Whether any location sample is buffered
    pub fn has_location(&self) -> bool {
        !self.locations.is_empty()
    }

    /// Whether any orientation sample is buffered
    pub fn has_orientation(&self) -> bool {
        !self.orientations.is_empty()
    }

    /// Location samples, oldest first
    pub fn locations(&self) -> impl Iterator<Item = &LocationSample> {
        self.locations.iter()
    }

    /// Orientation samples, oldest first
    pub fn orientations(&self) -> impl Iterator<Item = &OrientationSample> {
        self.orientations.iter()
    }

    /// Per-stream buffer statistics
    pub fn buffer_stats(&self) -> [BufferStats; 2] {
        [
            BufferStats {
                kind: SampleKind::Location,
                len: self.locations.len(),
                capacity: self.locations.capacity(),
                evicted: self.locations.evicted_count(),
                out_of_order: self.locations.out_of_order_count(),
            },
            BufferStats {
                kind: SampleKind::Orientation,
                len: self.orientations.len(),
                capacity: self.orientations.capacity(),
                evicted: self.orientations.evicted_count(),
                out_of_order: self.orientations.out_of_order_count(),
            },
        ]
    }

    /// Get configuration
    pub fn config(&self) -> &SensorSyncConfig {
        &self.config
    }
}

fn record_sample(kind: SampleKind) {
    metrics::counter!("scanner_telemetry_samples_total", "kind" => kind.as_str()).increment(1);
}

fn record_eviction(kind: SampleKind) {
    metrics::counter!("scanner_buffer_evictions_total", "kind" => kind.as_str()).increment(1);
}

fn warn_empty(kind: SampleKind, t: f64) {
    warn!(
        kind = kind.as_str(),
        t, "fusing with empty telemetry buffer, fields are zero"
    );
    metrics::counter!("scanner_fusion_empty_buffer_total", "kind" => kind.as_str()).increment(1);
}
