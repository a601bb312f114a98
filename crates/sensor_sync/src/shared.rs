//! Lock-guarded handle for hosts that ingest and fuse on different threads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{FusedImageRecord, FusedImuRecord, SensorSyncConfig};
use image::RgbImage;

use crate::engine::SensorSync;

/// Cloneable, mutex-guarded [`SensorSync`]
///
/// Every call takes the lock for its whole duration, so a fuse never observes
/// a half-applied ingest.
#[derive(Debug, Clone)]
pub struct SharedSensorSync {
    inner: Arc<Mutex<SensorSync>>,
}

impl SharedSensorSync {
    pub fn new(config: SensorSyncConfig) -> Self {
        Self::from_sync(SensorSync::new(config))
    }

    pub fn from_sync(sync: SensorSync) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sync)),
        }
    }

    /// Exclusive access for a batch of calls
    pub fn lock(&self) -> MutexGuard<'_, SensorSync> {
        // Every mutation leaves the buffers consistent, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ingest_location(&self, lat: f64, lng: f64, alt: f64, t: f64) {
        self.lock().ingest_location(lat, lng, alt, t);
    }

    pub fn ingest_orientation(&self, roll_deg: f64, pitch_deg: f64, azimuth_deg: f64, t: f64) {
        self.lock().ingest_orientation(roll_deg, pitch_deg, azimuth_deg, t);
    }

    pub fn set_frame(&self, image: RgbImage, t: f64) {
        self.lock().set_frame(image, t);
    }

    pub fn fuse_image(&self) -> Option<FusedImageRecord> {
        self.lock().fuse_image()
    }

    pub fn fuse_orientation(&self) -> FusedImuRecord {
        self.lock().fuse_orientation()
    }
}
