// crates/frameloom-core/src/config.rs
//
// Frame arithmetic for one export. Created once at session start from the
// timeline duration and the chosen frame rate; immutable afterwards. All
// presentation timestamps in the output container derive from this struct,
// never from wall-clock time.

use serde::{Deserialize, Serialize};

/// Fixed parameters of one export run.
///
/// Invariants, held by construction:
///   total_frames      = ceil(duration_ms / 1000 · fps)
///   frame_duration_ms = 1000 / fps
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub fps:               u32,
    pub width:             u32,
    pub height:            u32,
    pub total_frames:      u64,
    pub frame_duration_ms: f64,
}

impl ExportConfig {
    /// Build the config for a timeline of `duration_ms` at `fps`.
    ///
    /// `fps` must be non-zero; width/height are the final output pixel
    /// dimensions (the extraction ceiling is independent of them).
    pub fn new(duration_ms: f64, fps: u32, width: u32, height: u32) -> Self {
        let fps = fps.max(1);
        let total_frames = (duration_ms.max(0.0) / 1000.0 * fps as f64).ceil() as u64;
        Self {
            fps,
            width,
            height,
            total_frames,
            frame_duration_ms: 1000.0 / fps as f64,
        }
    }

    /// Timeline position of frame `i` in milliseconds.
    pub fn frame_time_ms(&self, i: u64) -> f64 {
        i as f64 * self.frame_duration_ms
    }

    /// Presentation timestamp of frame `i` in seconds (container timebase).
    pub fn frame_pts_secs(&self, i: u64) -> f64 {
        i as f64 / self.fps as f64
    }

    /// Fixed per-frame duration in seconds.
    pub fn frame_duration_secs(&self) -> f64 {
        1.0 / self.fps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_frames_is_ceiling() {
        // 2000 ms at 10 fps → exactly 20 frames.
        assert_eq!(ExportConfig::new(2000.0, 10, 640, 360).total_frames, 20);
        // 1001 ms at 30 fps → ceil(30.03) = 31.
        assert_eq!(ExportConfig::new(1001.0, 30, 640, 360).total_frames, 31);
        // 33 ms at 30 fps → ceil(0.99) = 1.
        assert_eq!(ExportConfig::new(33.0, 30, 640, 360).total_frames, 1);
        assert_eq!(ExportConfig::new(0.0, 30, 640, 360).total_frames, 0);
    }

    #[test]
    fn frame_duration_is_reciprocal_of_fps() {
        let cfg = ExportConfig::new(1000.0, 25, 1280, 720);
        assert!((cfg.frame_duration_ms - 40.0).abs() < 1e-9);
        assert!((cfg.frame_duration_secs() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn last_frame_end_lands_within_one_frame_of_duration() {
        for &(dur, fps) in &[(2000.0, 10u32), (1234.0, 30), (987.5, 24), (40.0, 60), (59_994.0, 30)] {
            let cfg = ExportConfig::new(dur, fps, 640, 360);
            let last = cfg.total_frames - 1;
            let end_ms = cfg.frame_time_ms(last) + cfg.frame_duration_ms;
            assert!(
                end_ms >= dur - 1e-6 && end_ms < dur + cfg.frame_duration_ms,
                "dur={dur} fps={fps}: last frame ends at {end_ms}"
            );
        }
    }

    #[test]
    fn pts_are_contiguous() {
        let cfg = ExportConfig::new(500.0, 30, 640, 360);
        for i in 1..cfg.total_frames {
            let gap = cfg.frame_pts_secs(i) - cfg.frame_pts_secs(i - 1);
            assert!((gap - cfg.frame_duration_secs()).abs() < 1e-9);
        }
    }
}
