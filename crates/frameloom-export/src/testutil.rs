// crates/frameloom-export/src/testutil.rs
//
// Shared in-memory doubles for the exporter's collaborators. Each mock
// records every call the exporter makes so tests can assert on ordering,
// counts, and restoration rather than on encoded output.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use frameloom_core::{
    ClipKind, ClipSnapshot, ExportConfig, PixelBuffer, TextureHandle, TimelineSnapshot, ViewState,
};

use crate::boundary::{
    Capabilities, ClipPlayer, DecodedAudio, EditorHost, HostEnv, SceneRenderer, VideoSource,
};
use crate::error::ExportError;
use crate::writer::{ContainerWriter, EncodedContainer};

// ── Editing engine ────────────────────────────────────────────────────────────

pub struct MockPlayer {
    pub texture:      TextureHandle,
    pub source_ref:   Uuid,
    pub suspended:    bool,
    pub texture_sets: usize,
}

impl ClipPlayer for MockPlayer {
    fn texture(&self) -> TextureHandle {
        self.texture
    }

    fn set_texture(&mut self, texture: TextureHandle) {
        self.texture = texture;
        self.texture_sets += 1;
    }

    fn source_ref(&self) -> Uuid {
        self.source_ref
    }

    fn set_source_ref(&mut self, source: Uuid) {
        self.source_ref = source;
    }

    fn set_suspend_updates(&mut self, suspend: bool) {
        self.suspended = suspend;
    }
}

pub struct MockSource {
    /// Flip to false to make every seek hang until the deadline.
    pub ready:      bool,
    pub seeks:      usize,
    pub reads:      usize,
    /// Requested timestamps, in call order.
    pub seek_times: Vec<f64>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self { ready: true, seeks: 0, reads: 0, seek_times: Vec::new() }
    }
}

impl VideoSource for MockSource {
    fn seek(&mut self, timestamp_ms: f64) {
        self.seeks += 1;
        self.seek_times.push(timestamp_ms);
    }

    fn frame_ready(&self) -> bool {
        self.ready
    }

    fn read_pixels(&mut self, _width: u32, _height: u32) -> Result<PixelBuffer, ExportError> {
        self.reads += 1;
        // Tiny fixed-size frame; callers only care that it is well-formed.
        Ok(PixelBuffer { width: 4, height: 4, data: vec![0x40; 64] })
    }
}

/// In-memory editing engine: a clip list plus the live player/source objects
/// the exporter pokes at, with call counters on everything it is expected
/// to touch.
pub struct MockEditor {
    pub duration_ms:    f64,
    pub clips:          Vec<ClipSnapshot>,
    pub players:        HashMap<Uuid, MockPlayer>,
    pub sources:        HashMap<Uuid, MockSource>,
    pub export_active:  bool,
    pub begin_calls:    usize,
    pub end_calls:      usize,
    pub playback_times: Vec<f64>,
    pub ticks:          Vec<f64>,
    pub pause_calls:    Vec<bool>,
    pub restored_view:  Option<ViewState>,
    next_texture:       u64,
}

impl MockEditor {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            clips: Vec::new(),
            players: HashMap::new(),
            sources: HashMap::new(),
            export_active: false,
            begin_calls: 0,
            end_calls: 0,
            playback_times: Vec::new(),
            ticks: Vec::new(),
            pause_calls: Vec::new(),
            restored_view: None,
            next_texture: 1,
        }
    }

    /// Add a clip on a fresh source. Video clips get a live player and a
    /// seekable source; audio clips are snapshot-only.
    pub fn add_clip(
        &mut self,
        kind: ClipKind,
        start_ms: f64,
        duration_ms: f64,
        volume: f32,
    ) -> (Uuid, Uuid) {
        let source_id = Uuid::new_v4();
        let clip_id = self.add_clip_on_source(kind, source_id, start_ms, duration_ms, volume);
        (clip_id, source_id)
    }

    /// Add a clip sharing an existing source (or naming a brand-new one).
    pub fn add_clip_on_source(
        &mut self,
        kind: ClipKind,
        source_id: Uuid,
        start_ms: f64,
        duration_ms: f64,
        volume: f32,
    ) -> Uuid {
        let clip_id = Uuid::new_v4();
        self.clips.push(ClipSnapshot {
            id: clip_id,
            kind,
            source_id,
            start_ms,
            duration_ms,
            volume,
            track_row: 0,
        });

        if kind == ClipKind::Video {
            let texture = TextureHandle::new(self.next_texture);
            self.next_texture += 1;
            self.players.insert(
                clip_id,
                MockPlayer { texture, source_ref: source_id, suspended: false, texture_sets: 0 },
            );
            self.sources.entry(source_id).or_default();
        }
        clip_id
    }
}

impl EditorHost for MockEditor {
    fn timeline_duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot { clips: self.clips.clone() }
    }

    fn begin_export(&mut self) -> bool {
        self.begin_calls += 1;
        if self.export_active {
            return false;
        }
        self.export_active = true;
        true
    }

    fn end_export(&mut self) {
        self.end_calls += 1;
        self.export_active = false;
    }

    fn set_playback_time(&mut self, time_ms: f64) {
        self.playback_times.push(time_ms);
    }

    fn tick_clips(&mut self, time_ms: f64) {
        self.ticks.push(time_ms);
    }

    fn set_playback_paused(&mut self, paused: bool) {
        self.pause_calls.push(paused);
    }

    fn view_state(&self) -> ViewState {
        ViewState {
            playback_time_ms: 777.0,
            zoom: 2.5,
            viewport_x: 123.0,
            panels_visible: true,
            is_playing: false,
        }
    }

    fn restore_view_state(&mut self, state: ViewState) {
        self.restored_view = Some(state);
    }

    fn player(&mut self, clip_id: Uuid) -> Option<&mut dyn ClipPlayer> {
        self.players.get_mut(&clip_id).map(|p| p as &mut dyn ClipPlayer)
    }

    fn video_source(&mut self, source_id: Uuid) -> Option<&mut dyn VideoSource> {
        self.sources.get_mut(&source_id).map(|s| s as &mut dyn VideoSource)
    }
}

// ── Scene renderer ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRenderer {
    pub renders:          usize,
    pub extracts:         usize,
    pub textures_created: usize,
    /// Make render_scene fail on the Nth call (0-based).
    pub fail_at_render:   Option<usize>,
}

impl SceneRenderer for MockRenderer {
    fn render_scene(&mut self) -> Result<(), ExportError> {
        let index = self.renders;
        self.renders += 1;
        if self.fail_at_render == Some(index) {
            return Err(ExportError::Render(format!("injected failure at frame {index}")));
        }
        Ok(())
    }

    fn extract_pixels(&mut self, width: u32, height: u32) -> Result<PixelBuffer, ExportError> {
        self.extracts += 1;
        Ok(PixelBuffer {
            width,
            height,
            data: vec![0x80; (width as usize) * (height as usize) * 4],
        })
    }

    fn create_texture(&mut self, _pixels: &PixelBuffer) -> TextureHandle {
        self.textures_created += 1;
        // Offset keeps mock handles distinct from the editor's originals.
        TextureHandle::new(1000 + self.textures_created as u64)
    }
}

// ── Container writer ──────────────────────────────────────────────────────────

/// Everything a MockWriter saw, shared out so the log survives the writer
/// being consumed by finalize.
#[derive(Default)]
pub struct WriterLog {
    /// (pts_secs, duration_secs) per video frame.
    pub video:             Vec<(f64, f64)>,
    /// (samples, channels, sample_rate, pts_secs) per audio submission.
    pub audio:             Vec<(Vec<f32>, u16, u32, f64)>,
    pub audio_track_added: bool,
    pub finalized:         usize,
}

impl WriterLog {
    pub fn shared() -> Arc<Mutex<WriterLog>> {
        Arc::new(Mutex::new(WriterLog::default()))
    }
}

pub struct MockWriter {
    log: Arc<Mutex<WriterLog>>,
    pub fail_finalize: bool,
}

impl MockWriter {
    pub fn new(log: Arc<Mutex<WriterLog>>) -> Self {
        Self { log, fail_finalize: false }
    }
}

impl ContainerWriter for MockWriter {
    fn add_audio_track(&mut self) -> Result<(), ExportError> {
        let mut log = self.log.lock().unwrap();
        if !log.video.is_empty() {
            return Err(ExportError::Container("audio track added after first frame".into()));
        }
        log.audio_track_added = true;
        Ok(())
    }

    fn write_video_frame(
        &mut self,
        pixels: &PixelBuffer,
        pts_secs: f64,
        duration_secs: f64,
    ) -> Result<(), ExportError> {
        if !pixels.is_well_formed() {
            return Err(ExportError::Container("malformed pixel buffer".into()));
        }
        self.log.lock().unwrap().video.push((pts_secs, duration_secs));
        Ok(())
    }

    fn write_audio_samples(
        &mut self,
        interleaved: &[f32],
        channels: u16,
        sample_rate: u32,
        pts_secs: f64,
    ) -> Result<(), ExportError> {
        self.log
            .lock()
            .unwrap()
            .audio
            .push((interleaved.to_vec(), channels, sample_rate, pts_secs));
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<EncodedContainer, ExportError> {
        if self.fail_finalize {
            return Err(ExportError::Container("injected finalize failure".into()));
        }
        let mut log = self.log.lock().unwrap();
        log.finalized += 1;
        Ok(EncodedContainer { bytes: b"mock-container".to_vec() })
    }
}

// ── Host environment ──────────────────────────────────────────────────────────

/// Host double: registered media payloads, a byte-to-sample audio decoder,
/// and a shared writer log every opened container reports into.
///
/// decode_audio turns each payload byte `b` into one mono sample `b / 100.0`
/// at 1000 Hz, so pts and duration math stay legible in assertions.
pub struct MockHost {
    pub caps:          Capabilities,
    media:             HashMap<Uuid, Vec<u8>>,
    pub fetches:       usize,
    pub decodes:       usize,
    pub containers:    usize,
    pub writer_log:    Arc<Mutex<WriterLog>>,
    /// (filename, payload length) per delivery.
    pub deliveries:    Vec<(String, usize)>,
    pub fail_finalize: bool,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            caps: Capabilities { h264: true, aac: true },
            media: HashMap::new(),
            fetches: 0,
            decodes: 0,
            containers: 0,
            writer_log: WriterLog::shared(),
            deliveries: Vec::new(),
            fail_finalize: false,
        }
    }

    pub fn register_media(&mut self, source_id: Uuid, bytes: Vec<u8>) {
        self.media.insert(source_id, bytes);
    }
}

impl HostEnv for MockHost {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn fetch_media(&mut self, source_id: Uuid) -> Result<Vec<u8>, ExportError> {
        self.fetches += 1;
        self.media
            .get(&source_id)
            .cloned()
            .ok_or_else(|| ExportError::SourceFetch {
                source_id,
                reason: "no payload registered".into(),
            })
    }

    fn decode_audio(&mut self, bytes: &[u8]) -> Result<DecodedAudio, ExportError> {
        self.decodes += 1;
        if bytes.is_empty() {
            return Err(ExportError::Decode("empty audio payload".into()));
        }
        let samples: Vec<f32> = bytes.iter().map(|&b| b as f32 / 100.0).collect();
        Ok(DecodedAudio { channels: vec![samples], sample_rate: 1_000 })
    }

    fn open_container(
        &mut self,
        _config: &ExportConfig,
    ) -> Result<Box<dyn ContainerWriter>, ExportError> {
        self.containers += 1;
        let mut writer = MockWriter::new(Arc::clone(&self.writer_log));
        writer.fail_finalize = self.fail_finalize;
        Ok(Box::new(writer))
    }

    fn deliver_artifact(&mut self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        self.deliveries.push((filename.to_string(), bytes.len()));
        Ok(PathBuf::from(format!("/mock-exports/{filename}")))
    }
}
