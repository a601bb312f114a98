//! Analysis pipeline module.

mod analyzer;
mod orchestrator;
mod stats;

pub use analyzer::FrameAnalyzer;
pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
