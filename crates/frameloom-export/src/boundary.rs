// crates/frameloom-export/src/boundary.rs
//
// External collaborator interfaces. The exporter coordinates three parties
// it does not own — the editing engine, the scene renderer, and the host
// environment — and talks to each strictly through these traits. Everything
// here is mockable; the real implementations live with the embedding app
// (except FfmpegHost in decode.rs, which backs HostEnv with ffmpeg + fs).

use std::path::PathBuf;

use uuid::Uuid;

use frameloom_core::{ExportConfig, PixelBuffer, TextureHandle, TimelineSnapshot, ViewState};

use crate::error::ExportError;
use crate::writer::ContainerWriter;

// ── Editing engine ────────────────────────────────────────────────────────────

/// The editing engine as the exporter needs it: absolute playback position,
/// an immutable snapshot, per-clip access, and the exclusive export flag.
pub trait EditorHost {
    /// Total timeline duration in milliseconds.
    fn timeline_duration_ms(&self) -> f64;

    /// Immutable capture of all clips/tracks at export start.
    fn snapshot(&self) -> TimelineSnapshot;

    /// Acquire the exclusive export flag. Returns false — without touching
    /// anything — when another session already holds it.
    fn begin_export(&mut self) -> bool;

    /// Release the exclusive export flag.
    fn end_export(&mut self);

    /// Move the playhead to an absolute position.
    fn set_playback_time(&mut self, time_ms: f64);

    /// Advance every clip's internal state for the new position. Zero-delta:
    /// state is derived from the absolute time, not from an increment.
    fn tick_clips(&mut self, time_ms: f64);

    /// Suspend/resume normal playback-driven updates for the whole editor.
    fn set_playback_paused(&mut self, paused: bool);

    fn view_state(&self) -> ViewState;
    fn restore_view_state(&mut self, state: ViewState);

    /// Live player object for a clip, if it still exists.
    fn player(&mut self, clip_id: Uuid) -> Option<&mut dyn ClipPlayer>;

    /// Live decodable source behind a video clip.
    fn video_source(&mut self, source_id: Uuid) -> Option<&mut dyn VideoSource>;
}

/// The mutable face of one clip during export: its visual texture and the
/// flag that keeps its normal per-tick decode update from fighting the
/// substituted static frame.
pub trait ClipPlayer {
    fn texture(&self) -> TextureHandle;
    fn set_texture(&mut self, texture: TextureHandle);

    fn source_ref(&self) -> Uuid;
    fn set_source_ref(&mut self, source: Uuid);

    fn set_suspend_updates(&mut self, suspend: bool);
}

/// A seekable video source. Seek is asynchronous on real backends — the
/// frame processor polls `frame_ready` under a bounded deadline.
pub trait VideoSource {
    fn seek(&mut self, timestamp_ms: f64);

    /// True once the frame requested by the last `seek` is decodable.
    fn frame_ready(&self) -> bool;

    /// Draw the current frame into the extraction surface and read it back
    /// as tightly-packed RGBA at the requested size.
    fn read_pixels(&mut self, width: u32, height: u32) -> Result<PixelBuffer, ExportError>;
}

// ── Scene renderer ────────────────────────────────────────────────────────────

/// Black-box drawing and pixel extraction.
pub trait SceneRenderer {
    /// Draw the current scene graph to the render target.
    fn render_scene(&mut self) -> Result<(), ExportError>;

    /// Read back the render target as tightly-packed RGBA at `width × height`.
    fn extract_pixels(&mut self, width: u32, height: u32) -> Result<PixelBuffer, ExportError>;

    /// Upload pixels as a renderer-resident texture and return its handle.
    fn create_texture(&mut self, pixels: &PixelBuffer) -> TextureHandle;
}

// ── Host environment ──────────────────────────────────────────────────────────

/// Presence of the encoding primitives an export needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Capabilities {
    pub h264: bool,
    pub aac:  bool,
}

impl Capabilities {
    /// Names of the missing features, empty when the host can export.
    pub fn missing(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.h264 {
            out.push("h264 video encoder".to_string());
        }
        if !self.aac {
            out.push("aac audio encoder".to_string());
        }
        out
    }
}

/// Decoded audio payload: one f32 sample vec per channel, all the same
/// length, at the source's native rate.
#[derive(Clone, Debug, Default)]
pub struct DecodedAudio {
    pub channels:    Vec<Vec<f32>>,
    pub sample_rate: u32,
}

/// Everything the export consumes from the host platform.
pub trait HostEnv {
    /// Synchronous capability probe. Runs before any mutation.
    fn capabilities(&self) -> Capabilities;

    /// Fetch the full payload of a media source.
    fn fetch_media(&mut self, source_id: Uuid) -> Result<Vec<u8>, ExportError>;

    /// Decode encoded audio bytes to per-channel float samples.
    fn decode_audio(&mut self, bytes: &[u8]) -> Result<DecodedAudio, ExportError>;

    /// Open a container writer for this export's dimensions and frame rate.
    fn open_container(&mut self, config: &ExportConfig)
        -> Result<Box<dyn ContainerWriter>, ExportError>;

    /// Deliver the finished artifact (the download-trigger side effect).
    /// Returns where it landed.
    fn deliver_artifact(&mut self, filename: &str, bytes: &[u8])
        -> Result<PathBuf, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_capabilities_are_named() {
        let caps = Capabilities { h264: false, aac: true };
        assert_eq!(caps.missing(), vec!["h264 video encoder".to_string()]);
        assert!(Capabilities { h264: true, aac: true }.missing().is_empty());
    }
}
