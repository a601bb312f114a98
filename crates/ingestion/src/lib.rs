//! # Ingestion
//!
//! Recorded flight-session replay.
//!
//! Responsibilities:
//! - Parse `session.jsonl` (location, orientation and frame events)
//! - Decode frame images relative to the session directory
//! - Stream events in file order over a bounded tokio channel
//! - Record sessions for tests and tooling
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{SessionEvent, SessionReplay};
//!
//! let replay = SessionReplay::load("flights/2024-05-03")?;
//! let mut rx = replay.start(64);
//! while let Some(event) = rx.recv().await {
//!     match event {
//!         SessionEvent::Location(sample) => { /* ... */ }
//!         SessionEvent::Orientation { .. } => { /* ... */ }
//!         SessionEvent::Frame { image, t, footprint } => { /* ... */ }
//!     }
//! }
//! ```

mod error;
mod event;
mod stats;
mod replay;
mod writer;

// Re-exports
pub use error::{IngestionError, Result};
pub use event::{SessionEvent, SessionRecord};
pub use stats::{IngestionMetrics, MetricsSnapshot};
pub use replay::{SessionReplay, SESSION_FILE};
pub use writer::{SessionWriter, FRAMES_DIR};
