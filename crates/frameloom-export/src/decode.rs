// crates/frameloom-export/src/decode.rs
//
// Audio byte decoding and the filesystem-backed host environment.
//
// decode_audio_bytes hands fetched media to ffmpeg through a temp file (the
// demuxer wants a seekable path, not a slice), decodes the best audio
// stream, and converts to planar f32 at the source's NATIVE rate and channel
// count. Rate conversion to the container's 44.1 kHz is the writer's job;
// keeping the native rate here means each payload is resampled at most once.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context as AnyhowContext};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::format::sample::{Sample, Type as SampleType};
use ffmpeg::media::Type as MediaType;
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::frame::audio::Audio as AudioFrame;
use uuid::Uuid;

use frameloom_core::ExportConfig;

use crate::boundary::{Capabilities, DecodedAudio, HostEnv};
use crate::error::ExportError;
use crate::writer::{probe_capabilities, ContainerWriter, Mp4Writer};

/// Decode target: planar f32, one plane per channel.
const DECODE_FMT: Sample = Sample::F32(SampleType::Planar);

/// Decode an encoded audio payload to per-channel f32 samples at the
/// source's native rate.
pub fn decode_audio_bytes(bytes: &[u8]) -> anyhow::Result<DecodedAudio> {
    ffmpeg::init().context("ffmpeg init")?;

    let mut scratch = tempfile::NamedTempFile::new().context("audio scratch file")?;
    scratch.write_all(bytes).context("stage audio bytes")?;
    scratch.flush().context("stage audio bytes")?;

    let mut ictx = input(scratch.path()).context("open audio payload")?;

    let stream_idx = ictx
        .streams()
        .best(MediaType::Audio)
        .ok_or_else(|| anyhow!("no audio stream in payload"))?
        .index();

    let stream = ictx
        .stream(stream_idx)
        .ok_or_else(|| anyhow!("audio stream vanished"))?;
    let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .context("codec context")?;
    let mut decoder = dec_ctx.decoder().audio().context("audio decoder")?;

    // Built lazily on the first decoded frame, once the real source
    // format/layout/rate is known.
    let mut resampler: Option<resampling::Context> = None;
    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut sample_rate: u32 = 0;

    for result in ictx.packets() {
        let (stream, packet) = match result {
            Ok(p) => p,
            Err(_) => continue,
        };
        if stream.index() != stream_idx {
            continue;
        }
        if decoder.send_packet(&packet).is_err() {
            continue;
        }

        let mut frame = AudioFrame::empty();
        while decoder.receive_frame(&mut frame).is_ok() {
            append_planar(&frame, &mut resampler, &mut channels, &mut sample_rate)?;
        }
    }

    // Flush decoder
    let _ = decoder.send_eof();
    let mut frame = AudioFrame::empty();
    while decoder.receive_frame(&mut frame).is_ok() {
        append_planar(&frame, &mut resampler, &mut channels, &mut sample_rate)?;
    }

    if channels.iter().all(|c| c.is_empty()) {
        return Err(anyhow!("no audio samples decoded"));
    }

    Ok(DecodedAudio { channels, sample_rate })
}

/// Convert `frame` to planar f32 (same rate, same layout) and append each
/// plane to its channel vec.
fn append_planar(
    frame: &AudioFrame,
    resampler: &mut Option<resampling::Context>,
    channels: &mut Vec<Vec<f32>>,
    sample_rate: &mut u32,
) -> anyhow::Result<()> {
    let src_channels = frame.ch_layout().channels() as usize;
    if *sample_rate == 0 {
        *sample_rate = frame.rate();
        channels.resize_with(src_channels.max(1), Vec::new);
    }

    if frame.format() == DECODE_FMT {
        append_planes(frame, channels);
        return Ok(());
    }

    // Mono sources must be declared MONO so swr doesn't misread the count.
    if resampler.is_none() {
        let src_layout = if src_channels >= 2 {
            frame.ch_layout()
        } else {
            ChannelLayout::MONO
        };
        let built = resampling::Context::get2(
            frame.format(), src_layout,         frame.rate(),
            DECODE_FMT,     frame.ch_layout(),  frame.rate(),
        )
        .context("create audio decode resampler")?;
        *resampler = Some(built);
    }

    if let Some(rs) = resampler.as_mut() {
        let mut converted = AudioFrame::empty();
        if rs.run(frame, &mut converted).is_ok() && converted.samples() > 0 {
            append_planes(&converted, channels);
        }
    }
    Ok(())
}

/// Append each plane's samples to its channel vec. ffmpeg sample buffers
/// are native-endian f32, so reinterpret in place rather than decoding a
/// fixed byte order.
fn append_planes(frame: &AudioFrame, channels: &mut Vec<Vec<f32>>) {
    let samples = frame.samples();
    for (ch, out) in channels.iter_mut().enumerate() {
        if ch >= frame.planes() {
            break;
        }
        unsafe {
            let data = frame.data(ch);
            let f32s = std::slice::from_raw_parts(data.as_ptr() as *const f32, samples);
            out.extend_from_slice(f32s);
        }
    }
}

// ── Filesystem-backed host ────────────────────────────────────────────────────

/// HostEnv over the local filesystem and ffmpeg: media sources are
/// registered paths, containers are `Mp4Writer`s, delivery is a file write
/// into the output directory.
pub struct FfmpegHost {
    media_paths: HashMap<Uuid, PathBuf>,
    output_dir:  PathBuf,
}

impl FfmpegHost {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { media_paths: HashMap::new(), output_dir }
    }

    /// Bind a source id to a local media file.
    pub fn register_source(&mut self, source_id: Uuid, path: PathBuf) {
        self.media_paths.insert(source_id, path);
    }
}

impl HostEnv for FfmpegHost {
    fn capabilities(&self) -> Capabilities {
        probe_capabilities()
    }

    fn fetch_media(&mut self, source_id: Uuid) -> Result<Vec<u8>, ExportError> {
        let path = self
            .media_paths
            .get(&source_id)
            .ok_or_else(|| ExportError::SourceFetch {
                source_id,
                reason: "no path registered".into(),
            })?;
        std::fs::read(path).map_err(|e| ExportError::SourceFetch {
            source_id,
            reason: format!("{}: {e}", path.display()),
        })
    }

    fn decode_audio(&mut self, bytes: &[u8]) -> Result<DecodedAudio, ExportError> {
        decode_audio_bytes(bytes).map_err(|e| ExportError::Decode(format!("{e:#}")))
    }

    fn open_container(
        &mut self,
        config: &ExportConfig,
    ) -> Result<Box<dyn ContainerWriter>, ExportError> {
        Ok(Box::new(Mp4Writer::open(config)?))
    }

    fn deliver_artifact(&mut self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(filename);
        std::fs::write(&path, bytes)
            .map_err(|e| ExportError::Container(format!("deliver {}: {e}", path.display())))?;
        log::info!("delivered {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
