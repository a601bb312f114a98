//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::AnalysisMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames that went through detection and coverage
    pub frames_analysed: u64,

    /// Frames rejected by the detector (size mismatch)
    pub frames_failed: u64,

    /// Total events received from the replay
    pub events_received: u64,

    /// Session lines that could not be parsed
    pub parse_errors: u64,

    /// Frames skipped because the image failed to load
    pub image_errors: u64,

    /// Disjoint coverage regions at the end of the run
    pub coverage_regions: usize,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Per-frame analysis aggregator
    pub metrics: AnalysisMetricsAggregator,
}

impl PipelineStats {
    /// Calculate frames per second throughput
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_analysed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames analysed: {}", self.frames_analysed);
        println!("   ├─ Frames failed: {}", self.frames_failed);
        println!("   ├─ Events received: {}", self.events_received);
        println!("   ├─ Parse errors: {}", self.parse_errors);
        println!("   ├─ Image errors: {}", self.image_errors);
        println!("   └─ FPS: {:.2}", self.fps());

        let summary = self.metrics.summary();

        println!("\n🎯 Motion Detection");
        println!("   ├─ Bootstrap frames: {}", summary.bootstrap_frames);
        println!("   ├─ Degraded fusions: {}", summary.degraded_frames);
        println!(
            "   ├─ Frames with objects: {} ({:.2}%)",
            summary.frames_with_objects, summary.detection_rate
        );
        println!("   ├─ Total objects: {}", summary.total_objects);
        println!("   ├─ Objects per frame: {}", summary.objects_per_frame);
        println!("   └─ Peak speed: {}", summary.peak_speed);

        println!("\n🗺️  Coverage");
        println!("   ├─ Regions: {}", self.coverage_regions);
        println!("   ├─ Area: {:.3e}", summary.coverage_area);
        println!("   ├─ Vertices: {}", summary.coverage_vertices);
        println!("   ├─ Welded vertices: {}", summary.welded_vertices);
        println!("   └─ Dropped components: {}", summary.dropped_components);

        println!("\n⏱️  Frame latency (ms): {}", summary.frame_latency_ms);
        println!();
    }
}
