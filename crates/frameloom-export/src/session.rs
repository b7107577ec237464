// crates/frameloom-export/src/session.rs
//
// Export session coordinator: one deterministic pass over the timeline that
// turns a snapshot into a delivered MP4.
//
// Phase ladder and progress weights:
//   init 0 → config 0 → video-prep 10 → output-setup 15 → audio 15..20
//   → render 25 + 75·(i+1)/total → finalize 100
// Reported percent is clamped monotonically non-decreasing; the final report
// is always (100, finalize) on success.
//
// Frame timing is pure arithmetic on the frame index. The loop sets the
// playhead to `i · frame_duration_ms` and ticks clips with zero delta, so a
// slow render never stretches the output and a fast one never compresses it.
//
// Cleanup (substitution restore, view state, playback resume, export flag)
// runs exactly once on every exit path after the exclusive flag was taken.
// No artifact is delivered on failure.

use std::path::PathBuf;
use std::time::Duration;

use frameloom_core::{ClipKind, ExportConfig, Phase, ProgressReporter, TimelineSnapshot};

use crate::audio::{process_audio_samples, setup_audio_tracks};
use crate::boundary::{EditorHost, HostEnv, SceneRenderer};
use crate::error::ExportError;
use crate::frames::FrameProcessor;

/// Session tunables. Output size and rate here are defaults; `start` can
/// override the rate per call.
#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    pub fps:          u32,
    pub width:        u32,
    pub height:       u32,
    /// Deadline for a video source's frame-ready signal after a seek.
    pub seek_timeout: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fps:          30,
            width:        1920,
            height:       1080,
            seek_timeout: Duration::from_secs(5),
        }
    }
}

/// What a finished export produced.
#[derive(Clone, Debug)]
pub struct ExportOutcome {
    pub path:           PathBuf,
    pub frames_written: u64,
    pub had_audio:      bool,
}

/// One export run over borrowed collaborators.
///
/// A session registers no listeners and owns no global state: releasing
/// one — started or not — is plain ownership, and `start` finishes its own
/// cleanup before returning, so no `Drop` impl is needed.
pub struct ExportSession<'a> {
    editor:       &'a mut dyn EditorHost,
    renderer:     &'a mut dyn SceneRenderer,
    host:         &'a mut dyn HostEnv,
    progress:     &'a mut dyn ProgressReporter,
    options:      ExportOptions,
    last_percent: f32,
}

impl<'a> ExportSession<'a> {
    pub fn new(
        editor: &'a mut dyn EditorHost,
        renderer: &'a mut dyn SceneRenderer,
        host: &'a mut dyn HostEnv,
        progress: &'a mut dyn ProgressReporter,
        options: ExportOptions,
    ) -> Self {
        Self { editor, renderer, host, progress, options, last_percent: 0.0 }
    }

    /// Run the whole export. `filename` defaults to `export.mp4`;
    /// `frame_rate` overrides the configured fps for this call only.
    pub fn start(
        &mut self,
        filename: Option<&str>,
        frame_rate: Option<u32>,
    ) -> Result<ExportOutcome, ExportError> {
        // Both preflight checks happen before any editor mutation.
        let missing = self.host.capabilities().missing();
        if !missing.is_empty() {
            return Err(ExportError::Capability { missing });
        }
        if !self.editor.begin_export() {
            return Err(ExportError::Concurrency);
        }

        self.last_percent = 0.0;
        let saved_view = self.editor.view_state();
        self.editor.set_playback_paused(true);

        let mut frames = FrameProcessor::new(self.options.seek_timeout);
        let result = self.run(filename, frame_rate, &mut frames);

        // One cleanup pass, success or failure.
        frames.restore_all(self.editor);
        self.editor.restore_view_state(saved_view);
        self.editor.set_playback_paused(false);
        self.editor.end_export();

        match &result {
            Ok(outcome) => log::info!(
                "export done: {} frame(s), audio={}, {}",
                outcome.frames_written,
                outcome.had_audio,
                outcome.path.display()
            ),
            Err(err) => log::warn!("export failed: {err}"),
        }
        result
    }

    fn run(
        &mut self,
        filename: Option<&str>,
        frame_rate: Option<u32>,
        frames: &mut FrameProcessor,
    ) -> Result<ExportOutcome, ExportError> {
        self.report(0.0, Phase::Init);

        // ── config ────────────────────────────────────────────────────────────
        let fps = frame_rate.unwrap_or(self.options.fps);
        let (config, snapshot) = self
            .configure(fps)
            .map_err(|e| e.into_phase(Phase::Config))?;
        self.report(Phase::Config.base_percent(), Phase::Config);

        // ── video prep ────────────────────────────────────────────────────────
        self.check_video_sources(&snapshot)
            .map_err(|e| e.into_phase(Phase::VideoPrep))?;
        self.report(Phase::VideoPrep.base_percent(), Phase::VideoPrep);

        // ── output setup ──────────────────────────────────────────────────────
        let mut writer = self
            .host
            .open_container(&config)
            .map_err(|e| e.into_phase(Phase::OutputSetup))?;
        self.report(Phase::OutputSetup.base_percent(), Phase::OutputSetup);

        // ── audio ─────────────────────────────────────────────────────────────
        let tracks = setup_audio_tracks(self.host, &snapshot)
            .map_err(|e| e.into_phase(Phase::Audio))?;
        let had_audio = !tracks.is_empty();
        if had_audio {
            writer
                .add_audio_track()
                .and_then(|_| process_audio_samples(self.host, writer.as_mut(), &tracks))
                .map_err(|e| e.into_phase(Phase::Audio))?;
        }
        self.report(20.0, Phase::Audio);

        // ── render loop ───────────────────────────────────────────────────────
        for i in 0..config.total_frames {
            let frame_time = config.frame_time_ms(i);
            self.editor.set_playback_time(frame_time);
            self.editor.tick_clips(frame_time);

            for clip in snapshot.clips_of(ClipKind::Video) {
                if !clip.contains(frame_time) {
                    continue;
                }
                // Source-local time: offset into the clip's media.
                frames
                    .substitute(
                        self.editor,
                        self.renderer,
                        clip.id,
                        clip.source_id,
                        frame_time - clip.start_ms,
                    )
                    .map_err(|e| e.into_phase(Phase::Render))?;
            }

            self.renderer
                .render_scene()
                .and_then(|_| self.renderer.extract_pixels(config.width, config.height))
                .and_then(|pixels| {
                    writer.write_video_frame(
                        &pixels,
                        config.frame_pts_secs(i),
                        config.frame_duration_secs(),
                    )
                })
                .map_err(|e| e.into_phase(Phase::Render))?;

            let percent = 25.0 + 75.0 * (i + 1) as f32 / config.total_frames as f32;
            self.report(percent, Phase::Render);
        }

        // ── finalize + deliver ────────────────────────────────────────────────
        let container = writer
            .finalize()
            .map_err(|e| e.into_phase(Phase::Finalize))?;
        let path = self
            .host
            .deliver_artifact(filename.unwrap_or("export.mp4"), &container.bytes)
            .map_err(|e| e.into_phase(Phase::Finalize))?;
        self.report(100.0, Phase::Finalize);

        Ok(ExportOutcome { path, frames_written: config.total_frames, had_audio })
    }

    /// Validate the timeline and freeze this session's configuration.
    fn configure(&mut self, fps: u32) -> Result<(ExportConfig, TimelineSnapshot), ExportError> {
        if fps == 0 {
            return Err(ExportError::Invalid("frame rate must be positive".into()));
        }
        let duration_ms = self.editor.timeline_duration_ms();
        if duration_ms <= 0.0 {
            return Err(ExportError::Invalid("timeline is empty".into()));
        }
        let snapshot = self.editor.snapshot();
        if snapshot.clips.is_empty() {
            return Err(ExportError::Invalid("timeline has no clips".into()));
        }
        let config = ExportConfig::new(duration_ms, fps, self.options.width, self.options.height);
        log::debug!(
            "export config: {}x{} @ {fps}fps, {} frame(s) over {duration_ms}ms",
            config.width,
            config.height,
            config.total_frames
        );
        Ok((config, snapshot))
    }

    /// Every video clip must have a live, seekable source before the loop
    /// touches the first frame.
    fn check_video_sources(&mut self, snapshot: &TimelineSnapshot) -> Result<(), ExportError> {
        for clip in snapshot.clips_of(ClipKind::Video) {
            if self.editor.video_source(clip.source_id).is_none() {
                return Err(ExportError::SourceFetch {
                    source_id: clip.source_id,
                    reason:    "video source not available".into(),
                });
            }
        }
        Ok(())
    }

    /// Forward progress, never letting the reported percent regress.
    fn report(&mut self, percent: f32, phase: Phase) {
        let clamped = percent.clamp(self.last_percent, 100.0);
        self.last_percent = clamped;
        self.progress.report(clamped, phase);
    }
}
