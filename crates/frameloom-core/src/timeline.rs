// crates/frameloom-core/src/timeline.rs
//
// Read-only timeline data as the exporter sees it. The editing engine builds
// a TimelineSnapshot once at export start; the frame loop consumes it without
// ever mutating it. Live clip objects (textures, decode state) stay on the
// editor side behind the frameloom-export boundary traits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Export-relevant classification of a clip.
///
/// `Other` covers everything the exporter renders but never substitutes or
/// mixes (titles, stills, shapes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipKind {
    Video,
    Audio,
    Other,
}

/// One clip as captured at export start.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClipSnapshot {
    pub id:          Uuid,
    pub kind:        ClipKind,
    /// Identity of the underlying media source — the cache key half that
    /// lets two clips on the same footage share extracted frames.
    pub source_id:   Uuid,
    pub start_ms:    f64,
    pub duration_ms: f64,
    /// Linear gain, 0.0–1.0. Only meaningful for audio clips.
    #[serde(default = "default_volume")]
    pub volume:      f32,
    #[serde(default)]
    pub track_row:   usize,
}

fn default_volume() -> f32 { 1.0 }

impl ClipSnapshot {
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }

    /// Active interval is half-open: `[start, end)`.
    pub fn contains(&self, time_ms: f64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms()
    }
}

/// Immutable capture of all clips at export start.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub clips: Vec<ClipSnapshot>,
}

impl TimelineSnapshot {
    pub fn new(clips: Vec<ClipSnapshot>) -> Self {
        Self { clips }
    }

    /// Timeline duration = the furthest clip end.
    pub fn duration_ms(&self) -> f64 {
        self.clips.iter().map(ClipSnapshot::end_ms).fold(0.0, f64::max)
    }

    pub fn clips_of(&self, kind: ClipKind) -> impl Iterator<Item = &ClipSnapshot> {
        self.clips.iter().filter(move |c| c.kind == kind)
    }
}

/// Editor-observable state saved before the export mutates anything and
/// restored exactly once afterwards, success or failure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub playback_time_ms: f64,
    pub zoom:             f32,
    pub viewport_x:       f32,
    pub panels_visible:   bool,
    pub is_playing:       bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            playback_time_ms: 0.0,
            zoom:             1.0,
            viewport_x:       0.0,
            panels_visible:   true,
            is_playing:       false,
        }
    }
}
