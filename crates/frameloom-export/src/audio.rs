// crates/frameloom-export/src/audio.rs
//
// Audio processor: fetch, decode, gain-adjust, and submit every audio clip
// into the container's single audio track.
//
// Per-track timing and volume correctness live here; compositing two tracks
// whose time ranges overlap is the container writer's job (the MP4 writer
// sums and clamps — see writer.rs).

use frameloom_core::{ClipKind, TimelineSnapshot};
use uuid::Uuid;

use crate::boundary::HostEnv;
use crate::error::ExportError;
use crate::writer::ContainerWriter;

/// One audio clip's contribution: payload plus placement.
#[derive(Debug)]
pub struct AudioTrack {
    pub source_id:   Uuid,
    pub start_ms:    f64,
    pub duration_ms: f64,
    /// Linear gain, clamped to [0, 1] at setup time.
    pub volume:      f32,
    pub bytes:       Vec<u8>,
}

/// Scan the snapshot for audio clips and fetch each one's full payload.
///
/// An empty result means the audio phase is a no-op and no audio track is
/// added to the container. Returned tracks are sorted ascending by start
/// time, the order `process_audio_samples` submits them in.
pub fn setup_audio_tracks(
    host: &mut dyn HostEnv,
    snapshot: &TimelineSnapshot,
) -> Result<Vec<AudioTrack>, ExportError> {
    let mut tracks: Vec<AudioTrack> = Vec::new();

    for clip in snapshot.clips_of(ClipKind::Audio) {
        let bytes = host.fetch_media(clip.source_id)?;
        tracks.push(AudioTrack {
            source_id:   clip.source_id,
            start_ms:    clip.start_ms,
            duration_ms: clip.duration_ms,
            volume:      clip.volume.clamp(0.0, 1.0),
            bytes,
        });
    }

    tracks.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
    log::debug!("audio setup: {} track(s)", tracks.len());
    Ok(tracks)
}

/// Decode each track, apply its gain, and submit it to the writer at
/// `start_ms / 1000` seconds.
///
/// Decoding happens at the source's native sample rate; the writer owns any
/// rate conversion. Sources with more than two channels contribute their
/// first two.
pub fn process_audio_samples(
    host: &mut dyn HostEnv,
    writer: &mut dyn ContainerWriter,
    tracks: &[AudioTrack],
) -> Result<(), ExportError> {
    for track in tracks {
        let decoded = host.decode_audio(&track.bytes)?;
        if decoded.channels.is_empty() || decoded.sample_rate == 0 {
            log::warn!("audio source {} decoded to nothing — skipping", track.source_id);
            continue;
        }

        let channels = decoded.channels.len().min(2);
        let native_len = decoded.channels[..channels]
            .iter()
            .map(|c| c.len())
            .min()
            .unwrap_or(0);

        // Trim to the clip's placed duration.
        let wanted = (track.duration_ms / 1000.0 * decoded.sample_rate as f64).round() as usize;
        let samples = native_len.min(wanted);
        if samples == 0 {
            continue;
        }

        let mut interleaved = Vec::with_capacity(samples * channels);
        for i in 0..samples {
            for ch in &decoded.channels[..channels] {
                interleaved.push(ch[i] * track.volume);
            }
        }

        writer.write_audio_samples(
            &interleaved,
            channels as u16,
            decoded.sample_rate,
            track.start_ms / 1000.0,
        )?;
    }
    Ok(())
}
