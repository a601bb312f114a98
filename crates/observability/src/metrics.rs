//! Analysis metrics
//!
//! Per-frame detection and coverage metrics, plus an in-memory aggregator for
//! the end-of-run summary.

use contracts::{BufferStats, MotionDetection};
use metrics::{counter, gauge, histogram};

/// Record one motion detection pass
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_detection;
///
/// let detection = detector.detect(&record, &footprint)?;
/// record_detection(&detection);
/// ```
pub fn record_detection(detection: &MotionDetection) {
    counter!("scanner_frames_total").increment(1);

    let objects = detection.objects.len();
    gauge!("scanner_objects_current").set(objects as f64);
    if objects > 0 {
        counter!("scanner_objects_total").increment(objects as u64);
    }

    histogram!("scanner_peak_speed").record(detection.peak_speed);
}

/// Record telemetry buffer depths
pub fn record_buffer_stats(stats: &[BufferStats]) {
    for stat in stats {
        gauge!("scanner_buffer_depth", "kind" => stat.kind.as_str()).set(stat.len as f64);
    }
}

/// Record wall-clock time spent on one frame
pub fn record_frame_latency_ms(latency_ms: f64) {
    histogram!("scanner_frame_latency_ms").record(latency_ms);
}

/// Outcome of one analysed frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Capture time (seconds)
    pub t: f64,
    /// First frame after a (re)start; no motion measured
    pub bootstrap: bool,
    pub objects: usize,
    /// Highest metric speed before clipping
    pub peak_speed: f64,
    pub coverage_vertices: usize,
    pub coverage_area: f64,
    /// Vertices welded away by the sweeper so far
    pub welded_vertices: u64,
    /// Disjoint union components discarded so far
    pub dropped_components: u64,
    /// Location or orientation buffer was empty at fusion time
    pub degraded_fusion: bool,
    pub latency_ms: f64,
}

/// Analysis metrics aggregator
///
/// Aggregates in memory for statistics and the summary printout.
#[derive(Debug, Clone, Default)]
pub struct AnalysisMetricsAggregator {
    pub total_frames: u64,

    pub bootstrap_frames: u64,

    pub degraded_frames: u64,

    pub total_objects: u64,

    pub frames_with_objects: u64,

    /// Objects per measured frame
    pub object_stats: RunningStats,

    /// Peak speed per measured frame
    pub speed_stats: RunningStats,

    /// Coverage vertex count after each frame
    pub vertex_stats: RunningStats,

    pub latency_stats: RunningStats,

    /// Coverage area after the latest frame
    pub coverage_area: f64,

    pub welded_vertices: u64,

    pub dropped_components: u64,
}

impl AnalysisMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregated statistics
    pub fn update(&mut self, report: &FrameReport) {
        self.total_frames += 1;
        if report.degraded_fusion {
            self.degraded_frames += 1;
        }

        self.vertex_stats.push(report.coverage_vertices as f64);
        self.latency_stats.push(report.latency_ms);
        self.coverage_area = report.coverage_area;
        self.welded_vertices = report.welded_vertices;
        self.dropped_components = report.dropped_components;

        if report.bootstrap {
            self.bootstrap_frames += 1;
            return;
        }

        self.total_objects += report.objects as u64;
        if report.objects > 0 {
            self.frames_with_objects += 1;
        }
        self.object_stats.push(report.objects as f64);
        self.speed_stats.push(report.peak_speed);
    }

    /// Generate summary report
    pub fn summary(&self) -> MetricsSummary {
        let measured = self.total_frames - self.bootstrap_frames;
        MetricsSummary {
            total_frames: self.total_frames,
            bootstrap_frames: self.bootstrap_frames,
            degraded_frames: self.degraded_frames,
            total_objects: self.total_objects,
            frames_with_objects: self.frames_with_objects,
            detection_rate: if measured > 0 {
                self.frames_with_objects as f64 / measured as f64 * 100.0
            } else {
                0.0
            },
            objects_per_frame: StatsSummary::from(&self.object_stats),
            peak_speed: StatsSummary::from(&self.speed_stats),
            coverage_vertices: StatsSummary::from(&self.vertex_stats),
            frame_latency_ms: StatsSummary::from(&self.latency_stats),
            coverage_area: self.coverage_area,
            welded_vertices: self.welded_vertices,
            dropped_components: self.dropped_components,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub bootstrap_frames: u64,
    pub degraded_frames: u64,
    pub total_objects: u64,
    pub frames_with_objects: u64,
    pub detection_rate: f64,
    pub objects_per_frame: StatsSummary,
    pub peak_speed: StatsSummary,
    pub coverage_vertices: StatsSummary,
    pub frame_latency_ms: StatsSummary,
    pub coverage_area: f64,
    pub welded_vertices: u64,
    pub dropped_components: u64,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Analysis Metrics Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(f, "Bootstrap frames: {}", self.bootstrap_frames)?;
        writeln!(f, "Degraded fusions: {}", self.degraded_frames)?;
        writeln!(
            f,
            "Frames with objects: {} ({:.2}%)",
            self.frames_with_objects, self.detection_rate
        )?;
        writeln!(f, "Total objects: {}", self.total_objects)?;
        writeln!(f, "Objects per frame: {}", self.objects_per_frame)?;
        writeln!(f, "Peak speed: {}", self.peak_speed)?;
        writeln!(f, "Coverage vertices: {}", self.coverage_vertices)?;
        writeln!(f, "Frame latency (ms): {}", self.frame_latency_ms)?;
        writeln!(f, "Coverage area: {:.3e}", self.coverage_area)?;
        writeln!(f, "Welded vertices: {}", self.welded_vertices)?;
        writeln!(f, "Dropped components: {}", self.dropped_components)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
