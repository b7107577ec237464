// crates/frameloom-export/src/worker.rs
//
// Background export worker: runs one session on a dedicated thread and
// streams ExportEvents back over a bounded channel. No cancel API — an
// export either finishes or fails, and both paths converge on the session's
// own cleanup.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use uuid::Uuid;

use frameloom_core::{ExportEvent, Phase, ProgressReporter};

use crate::boundary::{EditorHost, HostEnv, SceneRenderer};
use crate::session::{ExportOptions, ExportSession};

/// Progress sink that forwards onto the event channel. Progress updates are
/// best-effort (a full channel drops them); terminal events block while the
/// receiver lives and fail immediately once it is dropped, so an abandoned
/// worker always runs to completion.
struct ChannelProgress {
    job_id: Uuid,
    tx:     Sender<ExportEvent>,
}

impl ProgressReporter for ChannelProgress {
    fn report(&mut self, percent: f32, phase: Phase) {
        let _ = self.tx.try_send(ExportEvent::Progress { job_id: self.job_id, percent, phase });
    }
}

/// Spawn an export on its own thread.
///
/// The collaborators move into the worker for the session's lifetime; the
/// caller keeps the job id, the join handle, and the event receiver. The
/// last event on the channel is always `Done` or `Error` for this job id.
pub fn spawn_export<E, R, H>(
    mut editor: E,
    mut renderer: R,
    mut host: H,
    options: ExportOptions,
    filename: Option<String>,
    frame_rate: Option<u32>,
) -> (Uuid, JoinHandle<()>, Receiver<ExportEvent>)
where
    E: EditorHost + Send + 'static,
    R: SceneRenderer + Send + 'static,
    H: HostEnv + Send + 'static,
{
    let job_id = Uuid::new_v4();
    let (tx, rx) = bounded(256);

    let handle = thread::spawn(move || {
        let mut progress = ChannelProgress { job_id, tx: tx.clone() };
        let result = ExportSession::new(
            &mut editor,
            &mut renderer,
            &mut host,
            &mut progress,
            options,
        )
        .start(filename.as_deref(), frame_rate);

        let terminal = match result {
            Ok(outcome) => ExportEvent::Done { job_id, path: outcome.path },
            Err(err) => ExportEvent::Error { job_id, msg: err.to_string() },
        };
        let _ = tx.send(terminal);
    });

    (job_id, handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockEditor, MockHost, MockRenderer};
    use frameloom_core::ClipKind;
    use std::time::Duration;

    fn options() -> ExportOptions {
        ExportOptions { fps: 10, width: 32, height: 32, seek_timeout: Duration::from_secs(1) }
    }

    #[test]
    fn worker_streams_progress_and_terminates_with_done() {
        let mut editor = MockEditor::new(500.0);
        editor.add_clip(ClipKind::Video, 0.0, 500.0, 1.0);
        let (job_id, handle, rx) =
            spawn_export(editor, MockRenderer::default(), MockHost::new(), options(), None, None);

        let events: Vec<ExportEvent> = rx.iter().collect();
        handle.join().unwrap();

        assert!(events.len() >= 2, "expected progress plus a terminal event");
        let saw_render_progress = events.iter().any(|e| {
            matches!(e, ExportEvent::Progress { phase: Phase::Render, job_id: id, .. } if *id == job_id)
        });
        assert!(saw_render_progress);
        match events.last().unwrap() {
            ExportEvent::Done { job_id: id, path } => {
                assert_eq!(*id, job_id);
                assert_eq!(*path, std::path::PathBuf::from("/mock-exports/export.mp4"));
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[test]
    fn dropped_receiver_does_not_wedge_the_worker() {
        let mut editor = MockEditor::new(500.0);
        editor.add_clip(ClipKind::Video, 0.0, 500.0, 1.0);
        let (_job_id, handle, rx) =
            spawn_export(editor, MockRenderer::default(), MockHost::new(), options(), None, None);

        // Caller walks away; sends fail as disconnected instead of blocking.
        drop(rx);
        handle.join().unwrap();
    }

    #[test]
    fn worker_reports_failure_as_error_event() {
        let mut editor = MockEditor::new(500.0);
        editor.add_clip(ClipKind::Video, 0.0, 500.0, 1.0);
        let mut renderer = MockRenderer::default();
        renderer.fail_at_render = Some(0);
        let (job_id, handle, rx) =
            spawn_export(editor, renderer, MockHost::new(), options(), None, None);

        let events: Vec<ExportEvent> = rx.iter().collect();
        handle.join().unwrap();

        match events.last().unwrap() {
            ExportEvent::Error { job_id: id, msg } => {
                assert_eq!(*id, job_id);
                assert!(msg.contains("render"), "message names the phase: {msg}");
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }
}
