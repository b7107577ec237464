// crates/frameloom-export/src/lib.rs
//
// The export pipeline. No editor or renderer internals — those arrive
// through the boundary traits, which keeps every piece of this crate
// testable against in-memory doubles.
//
// Typical embedding:
//   1. Implement EditorHost + SceneRenderer (or use FfmpegHost for the
//      host side)
//   2. Run ExportSession::start directly, or spawn_export for a
//      background thread with channel-based progress

pub mod audio;
pub mod boundary;
pub mod decode;
pub mod error;
pub mod frames;
pub mod session;
pub mod worker;
pub mod writer;

#[cfg(test)]
mod testutil;

pub use boundary::{
    Capabilities, ClipPlayer, DecodedAudio, EditorHost, HostEnv, SceneRenderer, VideoSource,
};
pub use decode::FfmpegHost;
pub use error::ExportError;
pub use frames::FrameProcessor;
pub use session::{ExportOptions, ExportOutcome, ExportSession};
pub use worker::spawn_export;
pub use writer::{ContainerWriter, EncodedContainer, Mp4Writer};

// Channel/event types live in frameloom-core; re-exported so callers need
// only one import path.
pub use frameloom_core::{ExportEvent, NullProgress, Phase, ProgressReporter};
