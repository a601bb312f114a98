//! Session recording

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::FovFootprint;
use image::RgbImage;

use crate::error::{IngestionError, Result};
use crate::event::SessionRecord;
use crate::replay::SESSION_FILE;

/// Frame directory inside a session directory
pub const FRAMES_DIR: &str = "frames";

/// Writes a session directory readable by [`crate::SessionReplay`]
pub struct SessionWriter {
    dir: PathBuf,
    out: BufWriter<File>,
    frames: u64,
}

impl SessionWriter {
    /// Create `dir` (and `dir/frames`) and truncate its session file
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let frames = dir.join(FRAMES_DIR);
        fs::create_dir_all(&frames).map_err(|e| IngestionError::io(&frames, e))?;

        let path = dir.join(SESSION_FILE);
        let file = File::create(&path).map_err(|e| IngestionError::io(&path, e))?;

        Ok(Self {
            dir,
            out: BufWriter::new(file),
            frames: 0,
        })
    }

    pub fn write_location(&mut self, lat: f64, lng: f64, alt: f64, t: f64) -> Result<()> {
        self.write_record(&SessionRecord::Location { lat, lng, alt, t })
    }

    /// Angles in degrees
    pub fn write_orientation(&mut self, roll: f64, pitch: f64, azimuth: f64, t: f64) -> Result<()> {
        self.write_record(&SessionRecord::Orientation {
            roll,
            pitch,
            azimuth,
            t,
        })
    }

    /// Save the frame as PNG under `frames/` and record it
    pub fn write_frame(&mut self, image: &RgbImage, t: f64, footprint: &FovFootprint) -> Result<()> {
        self.frames += 1;
        let relative = Path::new(FRAMES_DIR).join(format!("{:06}.png", self.frames));
        let path = self.dir.join(&relative);

        image.save(&path).map_err(|e| IngestionError::ImageLoad {
            path: path.clone(),
            message: e.to_string(),
        })?;

        self.write_record(&SessionRecord::Frame {
            t,
            image: relative,
            fov: footprint.corners,
        })
    }

    pub fn write_record(&mut self, record: &SessionRecord) -> Result<()> {
        let path = self.dir.join(SESSION_FILE);
        let line = serde_json::to_string(record).map_err(|e| {
            IngestionError::io(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        writeln!(self.out, "{line}").map_err(|e| IngestionError::io(&path, e))
    }

    /// Flush buffered lines
    pub fn finish(mut self) -> Result<()> {
        let path = self.dir.join(SESSION_FILE);
        self.out.flush().map_err(|e| IngestionError::io(&path, e))
    }
}
