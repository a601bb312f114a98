//! Recorded session replay

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{FovFootprint, LocationSample};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};
use crate::event::{SessionEvent, SessionRecord};
use crate::stats::IngestionMetrics;

/// Session file name inside a session directory
pub const SESSION_FILE: &str = "session.jsonl";

/// Parsed flight session, ready to be streamed
#[derive(Debug)]
pub struct SessionReplay {
    dir: PathBuf,
    records: Arc<Vec<SessionRecord>>,
    metrics: Arc<IngestionMetrics>,
    running: Arc<AtomicBool>,
}

impl SessionReplay {
    /// Parse `<dir>/session.jsonl`
    ///
    /// Blank lines are ignored; malformed lines are logged, counted and skipped.
    #[instrument(name = "session_load", skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(SESSION_FILE);
        let content = fs::read_to_string(&path).map_err(|e| IngestionError::io(&path, e))?;

        let metrics = Arc::new(IngestionMetrics::new());
        let records = parse_records(&content, &metrics);
        info!(
            records = records.len(),
            skipped = metrics.snapshot().parse_errors,
            "session loaded"
        );

        Ok(Self {
            dir,
            records: Arc::new(records),
            metrics,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parsed records in file order
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_frame()).count()
    }

    /// `(first, last)` timestamp, if any record exists
    pub fn time_span(&self) -> Option<(f64, f64)> {
        let first = self.records.first()?.timestamp();
        let last = self.records.last()?.timestamp();
        Some((first, last))
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Stream events in file order over a bounded channel
    ///
    /// Runs on a blocking task: frame images are decoded as they are sent, so
    /// a slow consumer holds back decoding. The stream ends when every record
    /// was sent, [`Self::stop`] is called, or the receiver is dropped.
    pub fn start(&self, channel_capacity: usize) -> mpsc::Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        let dir = self.dir.clone();
        let records = self.records.clone();
        let metrics = self.metrics.clone();
        let running = self.running.clone();

        running.store(true, Ordering::SeqCst);

        tokio::task::spawn_blocking(move || {
            debug!(records = records.len(), "session replay started");

            for record in records.iter() {
                if !running.load(Ordering::Relaxed) {
                    break;
                }

                let Some(event) = load_event(&dir, record, &metrics) else {
                    continue;
                };
                let is_frame = matches!(event, SessionEvent::Frame { .. });

                if tx.blocking_send(event).is_err() {
                    debug!("replay channel closed");
                    break;
                }
                metrics.record_sent(is_frame);
            }

            running.store(false, Ordering::SeqCst);
            debug!("session replay finished");
        });

        rx
    }

    /// Stop a running replay after the event in flight
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

fn parse_records(content: &str, metrics: &IngestionMetrics) -> Vec<SessionRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                let err = IngestionError::ParseFailed {
                    line: idx + 1,
                    message: e.to_string(),
                };
                warn!(error = %err, "skipping session line");
                metrics.record_parse_error();
                None
            }
        })
        .collect()
}

/// Resolve one record into an event; frames whose image fails to load are skipped
fn load_event(dir: &Path, record: &SessionRecord, metrics: &IngestionMetrics) -> Option<SessionEvent> {
    match record {
        SessionRecord::Location { lat, lng, alt, t } => Some(SessionEvent::Location(LocationSample {
            lat: *lat,
            lng: *lng,
            alt: *alt,
            t: *t,
        })),
        SessionRecord::Orientation {
            roll,
            pitch,
            azimuth,
            t,
        } => Some(SessionEvent::Orientation {
            roll_deg: *roll,
            pitch_deg: *pitch,
            azimuth_deg: *azimuth,
            t: *t,
        }),
        SessionRecord::Frame { t, image, fov } => match load_image(&dir.join(image)) {
            Ok(image) => Some(SessionEvent::Frame {
                image,
                t: *t,
                footprint: FovFootprint::new(*fov),
            }),
            Err(err) => {
                warn!(error = %err, t, "skipping frame");
                metrics.record_image_error();
                None
            }
        },
    }
}

fn load_image(path: &Path) -> Result<image::RgbImage> {
    image::open(path)
        .map(|image| image.to_rgb8())
        .map_err(|e| IngestionError::ImageLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
