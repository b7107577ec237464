// crates/frameloom-export/src/frames.rs
//
// Video frame processor: extracts, caches, and substitutes static frames for
// video sources during export.
//
// Two independent LRU levels, both keyed by (source identity, quantized
// timestamp):
//   frame cache   (10) — raw RGBA from the extraction surface, read at a
//                        fixed 4K ceiling so downscaling to the output size
//                        never loses more detail than necessary
//   texture cache  (5) — renderer-resident textures built from cached pixels
// Eviction in one never implies eviction in the other.
//
// Substitution is reversible: the first substitution for a clip records its
// original texture/source in an explicit per-clip table, and restore_all
// undoes every record unconditionally and idempotently at session end —
// success or failure. While a static substitute is active the clip's normal
// per-tick decode update is suspended.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use frameloom_core::{BoundedCache, PixelBuffer, TextureHandle};

use crate::boundary::{EditorHost, SceneRenderer};
use crate::error::ExportError;

/// Raw pixel frames kept hot.
pub const FRAME_CACHE_CAPACITY: usize = 10;
/// Renderer textures kept hot.
pub const TEXTURE_CACHE_CAPACITY: usize = 5;

/// Extraction surface size — the quality ceiling, independent of the final
/// output resolution.
pub const EXTRACT_WIDTH: u32 = 3840;
pub const EXTRACT_HEIGHT: u32 = 2160;

/// Poll interval while waiting on a source's frame-ready signal.
const READY_POLL: Duration = Duration::from_millis(1);

/// Cache key: source identity + timestamp quantized to a 1 ms grid, so
/// near-duplicate requests coalesce onto one decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub source_id:    Uuid,
    pub quantized_ms: i64,
}

impl FrameKey {
    pub fn new(source_id: Uuid, timestamp_ms: f64) -> Self {
        Self { source_id, quantized_ms: timestamp_ms.round() as i64 }
    }
}

/// What a clip looked like before its first substitution this session.
struct SubstitutionRecord {
    original_texture: TextureHandle,
    original_source:  Uuid,
}

pub struct FrameProcessor {
    frame_cache:   BoundedCache<FrameKey, Arc<PixelBuffer>>,
    texture_cache: BoundedCache<FrameKey, TextureHandle>,
    /// Keyed by clip id; drained by restore_all.
    substitutions: HashMap<Uuid, SubstitutionRecord>,
    seek_timeout:  Duration,
}

impl FrameProcessor {
    pub fn new(seek_timeout: Duration) -> Self {
        Self {
            frame_cache:   BoundedCache::new(FRAME_CACHE_CAPACITY),
            texture_cache: BoundedCache::new(TEXTURE_CACHE_CAPACITY),
            substitutions: HashMap::new(),
            seek_timeout,
        }
    }

    /// Substitute `clip_id`'s live texture with a static frame of
    /// `source_id` at `timestamp_ms`, decoding only on cache miss.
    ///
    /// Any failure here is fatal to the export — there is no best-effort
    /// skip — and names the source that failed.
    pub fn substitute(
        &mut self,
        editor: &mut dyn EditorHost,
        renderer: &mut dyn SceneRenderer,
        clip_id: Uuid,
        source_id: Uuid,
        timestamp_ms: f64,
    ) -> Result<(), ExportError> {
        let key = FrameKey::new(source_id, timestamp_ms);

        // ── Level 1: raw pixels ───────────────────────────────────────────────
        let pixels = match self.frame_cache.get(&key) {
            Some(hit) => Arc::clone(hit),
            None => {
                let extracted = Self::extract_frame(editor, source_id, timestamp_ms, self.seek_timeout)?;
                let buf = Arc::new(extracted);
                self.frame_cache.insert(key, Arc::clone(&buf));
                buf
            }
        };

        // ── Level 2: renderer texture ─────────────────────────────────────────
        let texture = match self.texture_cache.get(&key) {
            Some(hit) => *hit,
            None => {
                let tex = renderer.create_texture(&pixels);
                self.texture_cache.insert(key, tex);
                tex
            }
        };

        // ── Swap into the live clip, remembering the original once ───────────
        let player = editor.player(clip_id).ok_or_else(|| ExportError::SourceFetch {
            source_id,
            reason: format!("clip {clip_id} has no live player"),
        })?;

        if !self.substitutions.contains_key(&clip_id) {
            self.substitutions.insert(
                clip_id,
                SubstitutionRecord {
                    original_texture: player.texture(),
                    original_source:  player.source_ref(),
                },
            );
        }

        player.set_texture(texture);
        player.set_suspend_updates(true);
        Ok(())
    }

    /// Seek the source, wait (bounded) for frame-ready, read back pixels at
    /// the extraction ceiling.
    fn extract_frame(
        editor: &mut dyn EditorHost,
        source_id: Uuid,
        timestamp_ms: f64,
        seek_timeout: Duration,
    ) -> Result<PixelBuffer, ExportError> {
        let source = editor.video_source(source_id).ok_or_else(|| ExportError::SourceFetch {
            source_id,
            reason: "no video source registered for this id".into(),
        })?;

        source.seek(timestamp_ms);

        let deadline = Instant::now() + seek_timeout;
        while !source.frame_ready() {
            if Instant::now() >= deadline {
                return Err(ExportError::SeekTimeout { source_id, waited: seek_timeout });
            }
            std::thread::sleep(READY_POLL);
        }

        source.read_pixels(EXTRACT_WIDTH, EXTRACT_HEIGHT)
    }

    /// Undo every substitution and drop both caches.
    ///
    /// Runs on every exit path of the session; records are drained on the
    /// first call so repeats are no-ops. A clip that disappeared mid-export
    /// is skipped — there is nothing left to restore on it.
    pub fn restore_all(&mut self, editor: &mut dyn EditorHost) {
        let count = self.substitutions.len();
        for (clip_id, record) in self.substitutions.drain() {
            if let Some(player) = editor.player(clip_id) {
                player.set_texture(record.original_texture);
                player.set_source_ref(record.original_source);
                player.set_suspend_updates(false);
            } else {
                log::warn!("restore: clip {clip_id} vanished before restoration");
            }
        }
        self.frame_cache.clear();
        self.texture_cache.clear();
        if count > 0 {
            log::debug!("restored {count} substituted clip(s)");
        }
    }

    /// Number of clips currently substituted (not yet restored).
    pub fn active_substitutions(&self) -> usize {
        self.substitutions.len()
    }
}
