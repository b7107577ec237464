// crates/frameloom-core/src/lib.rs
//
// Pure export data — no ffmpeg, no renderer handles.
// Everything here is plain, serializable (where it makes sense), and shared
// between frameloom-export and whatever editor embeds it.

pub mod cache;
pub mod config;
pub mod events;
pub mod frame;
pub mod timeline;

pub use cache::BoundedCache;
pub use config::ExportConfig;
pub use events::{ExportEvent, NullProgress, Phase, ProgressReporter};
pub use frame::{PixelBuffer, TextureHandle};
pub use timeline::{ClipKind, ClipSnapshot, TimelineSnapshot, ViewState};
