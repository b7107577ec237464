// crates/frameloom-core/src/events.rs
//
// Types that flow across the channel between the export worker and whoever
// is watching it. No ffmpeg, no renderer handles — just plain data.

use std::path::PathBuf;
use uuid::Uuid;

/// The coordinator's fixed, progress-weighted stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Config,
    VideoPrep,
    OutputSetup,
    Audio,
    Render,
    Finalize,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Init        => "init",
            Phase::Config      => "config",
            Phase::VideoPrep   => "video-prep",
            Phase::OutputSetup => "output-setup",
            Phase::Audio       => "audio",
            Phase::Render      => "render",
            Phase::Finalize    => "finalize",
        }
    }

    /// Progress percentage reported on entry to this phase. The audio phase
    /// spans 15–20 and the render loop 25–100; those interior values come
    /// from the session, not from here.
    pub fn base_percent(self) -> f32 {
        match self {
            Phase::Init        => 0.0,
            Phase::Config      => 0.0,
            Phase::VideoPrep   => 10.0,
            Phase::OutputSetup => 15.0,
            Phase::Audio       => 15.0,
            Phase::Render      => 25.0,
            Phase::Finalize    => 100.0,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Results sent from the export worker thread to the caller.
#[derive(Clone, Debug)]
pub enum ExportEvent {
    Progress { job_id: Uuid, percent: f32, phase: Phase },
    Done     { job_id: Uuid, path: PathBuf },
    Error    { job_id: Uuid, msg: String },
}

/// Receives `(percent, phase)` pairs from the session.
///
/// The session guarantees percent is monotonically non-decreasing and that
/// the final call of any successful export is `(100.0, Phase::Finalize)`.
pub trait ProgressReporter {
    fn report(&mut self, percent: f32, phase: Phase);
}

/// Reporter that discards everything. Useful for headless callers and tests.
#[derive(Default)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn report(&mut self, _percent: f32, _phase: Phase) {}
}
