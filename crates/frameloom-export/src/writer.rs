// crates/frameloom-export/src/writer.rs
//
// Container writer boundary + the ffmpeg-backed MP4 implementation.
//
// Stream layout in the output MP4:
//   Stream 0 — H.264 video (YUV420P, CRF 18, preset fast)
//   Stream 1 — AAC audio  (FLTP stereo, 44100 Hz, 128 kbps), present only
//              when add_audio_track() was called before the first frame.
//
// PTS strategy:
//   Video: monotonically increasing frame counter in 1/fps. The caller hands
//   us second-based timestamps; we verify they are strictly increasing and
//   derive the counter ourselves, so output pacing never depends on how long
//   a frame took to render.
//   Audio: monotonically increasing sample counter in 1/44100, produced by
//   draining the master mix buffer at finalize time.
//
// Mixing:
//   Audio submissions arrive tagged with a presentation timestamp and may
//   overlap. Each one is resampled to packed stereo f32 @ 44100 and SUMMED
//   into a pts-positioned master buffer, clamped to [-1, 1]. Gaps stay
//   silent. A writer with different overlap semantics (last-write, ducking)
//   can replace this one behind the trait. The mix buffer holds the whole
//   session in RAM (~21 MB per stereo minute at 44.1 kHz), sized for the
//   short timelines this export targets.
//
// Audio FIFO:
//   AAC wants exactly encoder.frame_size() (typically 1024) samples per
//   input frame. The master mix is drained into a stereo FLTP ring buffer;
//   full frames are popped and sent to the encoder, and the tail is
//   zero-padded on the final flush so no PCM is lost.

use std::io::Read;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::{self, Id as CodecId};
use ffmpeg::encoder;
use ffmpeg::format::sample::Type as SampleType;
use ffmpeg::format::{output as open_output, Pixel, Sample};
use ffmpeg::software::resampling;
use ffmpeg::software::scaling::{Context as ScaleCtx, Flags as ScaleFlags};
use ffmpeg::util::channel_layout::{ChannelLayout, ChannelLayoutMask};
use ffmpeg::util::frame::audio::Audio as AudioFrame;
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::util::rational::Rational;
use ffmpeg::Packet;

use frameloom_core::{ExportConfig, PixelBuffer};

use crate::boundary::Capabilities;
use crate::error::ExportError;

// ── Boundary contract ─────────────────────────────────────────────────────────

/// The finished artifact: one demuxable media container as bytes.
pub struct EncodedContainer {
    pub bytes: Vec<u8>,
}

/// Incremental sink for rendered frames and mixed audio.
///
/// Video frames must arrive with strictly increasing presentation timestamps
/// and a fixed per-frame duration. Audio may be submitted before or
/// interleaved with video, in non-decreasing pts order per track; overlap
/// compositing between tracks is this writer's responsibility (the MP4
/// implementation sums and clamps). `finalize` consumes the writer, so a
/// second finalize per session is unrepresentable.
pub trait ContainerWriter {
    /// Declare that this export carries an audio track. Must be called
    /// before the first video frame is written.
    fn add_audio_track(&mut self) -> Result<(), ExportError>;

    fn write_video_frame(
        &mut self,
        pixels: &PixelBuffer,
        pts_secs: f64,
        duration_secs: f64,
    ) -> Result<(), ExportError>;

    /// Submit interleaved f32 samples starting at `pts_secs`.
    fn write_audio_samples(
        &mut self,
        interleaved: &[f32],
        channels: u16,
        sample_rate: u32,
        pts_secs: f64,
    ) -> Result<(), ExportError>;

    fn finalize(self: Box<Self>) -> Result<EncodedContainer, ExportError>;
}

// ── Constants ─────────────────────────────────────────────────────────────────

/// Output audio sample rate for all exports.
const AUDIO_RATE: i32 = 44_100;

// ── Capability probe ──────────────────────────────────────────────────────────

/// Which encoding primitives this build of ffmpeg actually carries.
/// Backs `HostEnv::capabilities` for the real host.
pub fn probe_capabilities() -> Capabilities {
    if ffmpeg::init().is_err() {
        return Capabilities::default();
    }
    Capabilities {
        h264: encoder::find(CodecId::H264).is_some(),
        aac:  encoder::find(CodecId::AAC).is_some(),
    }
}

// ── Audio FIFO ────────────────────────────────────────────────────────────────

/// Stereo FLTP (float planar) sample ring buffer feeding the AAC encoder.
struct AudioFifo {
    left:  Vec<f32>,
    right: Vec<f32>,
}

impl AudioFifo {
    fn new() -> Self {
        Self { left: Vec::new(), right: Vec::new() }
    }

    /// Samples currently buffered, per channel.
    fn len(&self) -> usize {
        self.left.len()
    }

    /// Append interleaved stereo samples (L R L R …).
    fn push_interleaved(&mut self, samples: &[f32]) {
        for pair in samples.chunks_exact(2) {
            self.left.push(pair[0]);
            self.right.push(pair[1]);
        }
    }

    /// Pop one encoder-sized frame from the front of the FIFO.
    ///
    /// If fewer than `n` samples remain the tail is zero-padded (used only
    /// for the final flush frame so the AAC encoder receives a full
    /// fixed-size input). PTS is `sample_idx` in the 1/44100 timebase.
    fn pop_frame(&mut self, n: usize, sample_idx: i64) -> AudioFrame {
        let available = self.left.len().min(n);

        let mut frame = AudioFrame::new(
            Sample::F32(SampleType::Planar),
            n,
            ChannelLayoutMask::STEREO,
        );
        frame.set_rate(AUDIO_RATE as u32);
        frame.set_pts(Some(sample_idx));

        unsafe {
            let ldata = frame.data_mut(0);
            let ldst  = std::slice::from_raw_parts_mut(ldata.as_mut_ptr() as *mut f32, n);
            ldst[..available].copy_from_slice(&self.left[..available]);
            if available < n {
                ldst[available..].fill(0.0);
            }

            let rdata = frame.data_mut(1);
            let rdst  = std::slice::from_raw_parts_mut(rdata.as_mut_ptr() as *mut f32, n);
            rdst[..available].copy_from_slice(&self.right[..available]);
            if available < n {
                rdst[available..].fill(0.0);
            }
        }

        self.left.drain(..available);
        self.right.drain(..available);

        frame
    }
}

// ── MP4 writer ────────────────────────────────────────────────────────────────

struct AudioTrackState {
    encoder:        ffmpeg::encoder::Audio,
    /// Next output frame's PTS in samples (stream timebase = 1/44100).
    out_sample_idx: i64,
    /// AAC frame size in samples (typically 1024).
    frame_size:     usize,
    fifo:           AudioFifo,
    /// Interleaved stereo master mix at 44100 Hz; index = sample pair.
    mix:            Vec<f32>,
    audio_tb:       Rational,
}

pub struct Mp4Writer {
    octx:   ffmpeg::format::context::Output,
    video:  ffmpeg::encoder::Video,
    /// RGBA → YUV420P, dimensions fixed for the whole session.
    scaler: ScaleCtx,
    audio:  Option<AudioTrackState>,

    width:          u32,
    height:         u32,
    frame_tb:       Rational,
    next_frame_idx: i64,
    last_pts_secs:  f64,
    header_written: bool,

    /// Keeps the scratch output alive (and deletes it) for the writer's
    /// lifetime; finalize reads the muxed bytes back out of it.
    scratch: tempfile::NamedTempFile,
}

impl Mp4Writer {
    pub fn open(config: &ExportConfig) -> Result<Self, ExportError> {
        ffmpeg::init().map_err(|e| ExportError::Container(format!("ffmpeg init: {e}")))?;

        if config.width < 2 || config.height < 2 {
            return Err(ExportError::Invalid(format!(
                "output dimensions {}x{} too small",
                config.width, config.height
            )));
        }

        let scratch = tempfile::Builder::new()
            .prefix("frameloom_out_")
            .suffix(".mp4")
            .tempfile()
            .map_err(|e| ExportError::Container(format!("create scratch output: {e}")))?;

        let mut octx = open_output(&scratch.path().to_path_buf())
            .map_err(|e| ExportError::Container(format!("open output container: {e}")))?;

        // ── Video encoder (stream 0) ──────────────────────────────────────────
        let frame_tb = Rational::new(1, config.fps as i32);

        let h264 = encoder::find(CodecId::H264).ok_or_else(|| {
            ExportError::Container("H.264 encoder not found — is libx264 available?".into())
        })?;

        let mut ost_video = octx
            .add_stream(h264)
            .map_err(|e| ExportError::Container(format!("add video stream: {e}")))?;
        ost_video.set_time_base(frame_tb);

        let video_enc_ctx = codec::context::Context::new_with_codec(h264);
        let mut video_enc = video_enc_ctx
            .encoder()
            .video()
            .map_err(|e| ExportError::Container(format!("create video encoder context: {e}")))?;

        video_enc.set_width(config.width);
        video_enc.set_height(config.height);
        video_enc.set_format(Pixel::YUV420P);
        video_enc.set_time_base(frame_tb);
        video_enc.set_frame_rate(Some(Rational::new(config.fps as i32, 1)));
        video_enc.set_bit_rate(0); // CRF controls quality; bit_rate 0 signals VBR

        let mut opts = ffmpeg::Dictionary::new();
        opts.set("crf", "18");
        opts.set("preset", "fast");

        let mut video = video_enc
            .open_as_with(h264, opts)
            .map_err(|e| ExportError::Container(format!("open H.264 encoder: {e}")))?;

        // Square pixels must be forced on the OPENED context — libavcodec
        // resets sample_aspect_ratio during codec initialisation, clobbering
        // anything set before open_as_with.
        video.set_aspect_ratio(Rational::new(1, 1));

        // Copy encoder params into the stream's codecpar so the muxer knows
        // resolution, format, and codec-private data. encoder::Video does not
        // implement AsPtr<AVCodecParameters>, so FFI it is.
        unsafe {
            let ret = ffmpeg::ffi::avcodec_parameters_from_context(
                (**(*octx.as_mut_ptr()).streams.add(0)).codecpar,
                video.as_ptr() as *mut ffmpeg::ffi::AVCodecContext,
            );
            if ret < 0 {
                return Err(ExportError::Container(format!(
                    "avcodec_parameters_from_context (video) failed: {ret}"
                )));
            }
        }

        let scaler = ScaleCtx::get(
            Pixel::RGBA,
            config.width,
            config.height,
            Pixel::YUV420P,
            config.width,
            config.height,
            ScaleFlags::BILINEAR,
        )
        .map_err(|e| ExportError::Container(format!("create RGBA→YUV scaler: {e}")))?;

        log::debug!(
            "mp4 writer open: {}x{} @ {} fps → {}",
            config.width,
            config.height,
            config.fps,
            scratch.path().display()
        );

        Ok(Self {
            octx,
            video,
            scaler,
            audio: None,
            width: config.width,
            height: config.height,
            frame_tb,
            next_frame_idx: 0,
            last_pts_secs: f64::NEG_INFINITY,
            header_written: false,
            scratch,
        })
    }

    /// Write the container header once, after all streams exist.
    fn ensure_header(&mut self) -> Result<(), ExportError> {
        if self.header_written {
            return Ok(());
        }
        self.octx
            .write_header()
            .map_err(|e| ExportError::Container(format!("write output header: {e}")))?;
        self.header_written = true;
        Ok(())
    }

    /// Receive all pending video packets and write them to the muxer.
    fn drain_video_packets(&mut self) -> Result<(), ExportError> {
        let ost_tb = self.octx.stream(0).map(|s| s.time_base()).unwrap_or(self.frame_tb);
        let mut pkt = Packet::empty();
        while self.video.receive_packet(&mut pkt).is_ok() {
            pkt.set_stream(0);
            pkt.rescale_ts(self.frame_tb, ost_tb);
            pkt.write_interleaved(&mut self.octx)
                .map_err(|e| ExportError::Container(format!("write video packet: {e}")))?;
        }
        Ok(())
    }

    /// Resample one submission to packed stereo f32 @ 44100.
    ///
    /// Mono is declared MONO so swresample doesn't misread the layout, and
    /// comes back duplicated to both output channels.
    fn to_mix_format(
        interleaved: &[f32],
        channels: u16,
        sample_rate: u32,
    ) -> Result<Vec<f32>, ExportError> {
        if channels == 2 && sample_rate == AUDIO_RATE as u32 {
            return Ok(interleaved.to_vec());
        }

        // More than two channels: keep the first two of each group.
        let head;
        let (interleaved, channels) = if channels > 2 {
            head = interleaved
                .chunks_exact(channels as usize)
                .flat_map(|group| [group[0], group[1]])
                .collect::<Vec<f32>>();
            (head.as_slice(), 2u16)
        } else {
            (interleaved, channels)
        };

        let nsamples = interleaved.len() / channels as usize;
        if nsamples == 0 {
            return Ok(Vec::new());
        }

        let (mask, layout) = if channels >= 2 {
            (ChannelLayoutMask::STEREO, ChannelLayout::STEREO)
        } else {
            (ChannelLayoutMask::MONO, ChannelLayout::MONO)
        };

        let mut src = AudioFrame::new(Sample::F32(SampleType::Packed), nsamples, mask);
        src.set_rate(sample_rate);
        unsafe {
            let data = src.data_mut(0);
            let dst = std::slice::from_raw_parts_mut(
                data.as_mut_ptr() as *mut f32,
                nsamples * channels as usize,
            );
            dst.copy_from_slice(&interleaved[..nsamples * channels as usize]);
        }

        let mut rs = resampling::Context::get2(
            Sample::F32(SampleType::Packed),
            layout,
            sample_rate,
            Sample::F32(SampleType::Packed),
            ChannelLayout::STEREO,
            AUDIO_RATE as u32,
        )
        .map_err(|e| ExportError::Container(format!("create audio resampler: {e}")))?;

        let mut out = Vec::new();
        let mut resampled = AudioFrame::empty();
        if rs.run(&src, &mut resampled).is_ok() && resampled.samples() > 0 {
            append_packed_f32(&resampled, &mut out);
        }
        // Pull the conversion tail so slow-rate sources don't lose samples.
        let mut tail = AudioFrame::empty();
        if rs.flush(&mut tail).is_ok() && tail.samples() > 0 {
            append_packed_f32(&tail, &mut out);
        }
        Ok(out)
    }

    /// Drain full FIFO frames into the AAC encoder; `flush` also pushes the
    /// zero-padded tail.
    fn drain_audio_fifo(&mut self, flush: bool) -> Result<(), ExportError> {
        let Some(audio) = self.audio.as_mut() else { return Ok(()) };

        while audio.fifo.len() >= audio.frame_size || (flush && audio.fifo.len() > 0) {
            let frame = audio.fifo.pop_frame(audio.frame_size, audio.out_sample_idx);
            audio.out_sample_idx += audio.frame_size as i64;

            audio
                .encoder
                .send_frame(&frame)
                .map_err(|e| ExportError::Container(format!("send audio frame: {e}")))?;

            Self::drain_audio_packets(&mut self.octx, audio)?;
        }
        Ok(())
    }

    fn drain_audio_packets(
        octx: &mut ffmpeg::format::context::Output,
        audio: &mut AudioTrackState,
    ) -> Result<(), ExportError> {
        let ost_tb = octx.stream(1).map(|s| s.time_base()).unwrap_or(audio.audio_tb);
        let mut pkt = Packet::empty();
        while audio.encoder.receive_packet(&mut pkt).is_ok() {
            pkt.set_stream(1);
            pkt.rescale_ts(audio.audio_tb, ost_tb);
            pkt.write_interleaved(octx)
                .map_err(|e| ExportError::Container(format!("write audio packet: {e}")))?;
        }
        Ok(())
    }
}

/// Copy the packed f32 samples from `frame` into `out` (all channels are in
/// plane 0 for packed layouts).
fn append_packed_f32(frame: &AudioFrame, out: &mut Vec<f32>) {
    let n = frame.samples() * frame.ch_layout().channels() as usize;
    unsafe {
        let data = frame.data(0);
        let f32s = std::slice::from_raw_parts(data.as_ptr() as *const f32, n);
        out.extend_from_slice(f32s);
    }
}

impl ContainerWriter for Mp4Writer {
    fn add_audio_track(&mut self) -> Result<(), ExportError> {
        if self.header_written {
            return Err(ExportError::Container(
                "audio track must be added before the first video frame".into(),
            ));
        }
        if self.audio.is_some() {
            return Ok(());
        }

        let audio_tb = Rational::new(1, AUDIO_RATE);

        let aac = encoder::find(CodecId::AAC)
            .ok_or_else(|| ExportError::Container("AAC encoder not found".into()))?;

        let mut ost_audio = self
            .octx
            .add_stream(aac)
            .map_err(|e| ExportError::Container(format!("add audio stream: {e}")))?;
        ost_audio.set_time_base(audio_tb);

        let audio_enc_ctx = codec::context::Context::new_with_codec(aac);
        let mut audio_enc = audio_enc_ctx
            .encoder()
            .audio()
            .map_err(|e| ExportError::Container(format!("create audio encoder context: {e}")))?;

        audio_enc.set_rate(AUDIO_RATE);
        audio_enc.set_ch_layout(ChannelLayout::STEREO);
        audio_enc.set_format(Sample::F32(SampleType::Planar));
        audio_enc.set_bit_rate(128_000);

        let encoder = audio_enc
            .open_as_with(aac, ffmpeg::Dictionary::new())
            .map_err(|e| ExportError::Container(format!("open AAC encoder: {e}")))?;

        // Guard against a codec reporting 0 (shouldn't happen with AAC).
        let frame_size = match encoder.frame_size() as usize {
            0 => 1024,
            n => n,
        };

        unsafe {
            let ret = ffmpeg::ffi::avcodec_parameters_from_context(
                (**(*self.octx.as_mut_ptr()).streams.add(1)).codecpar,
                encoder.as_ptr() as *mut ffmpeg::ffi::AVCodecContext,
            );
            if ret < 0 {
                return Err(ExportError::Container(format!(
                    "avcodec_parameters_from_context (audio) failed: {ret}"
                )));
            }
        }

        self.audio = Some(AudioTrackState {
            encoder,
            out_sample_idx: 0,
            frame_size,
            fifo: AudioFifo::new(),
            mix: Vec::new(),
            audio_tb,
        });
        Ok(())
    }

    fn write_video_frame(
        &mut self,
        pixels: &PixelBuffer,
        pts_secs: f64,
        _duration_secs: f64,
    ) -> Result<(), ExportError> {
        if pixels.width != self.width || pixels.height != self.height {
            return Err(ExportError::Container(format!(
                "frame size {}x{} does not match output {}x{}",
                pixels.width, pixels.height, self.width, self.height
            )));
        }
        if !pixels.is_well_formed() {
            return Err(ExportError::Container(format!(
                "frame buffer is {} bytes, expected {}",
                pixels.data.len(),
                pixels.expected_len()
            )));
        }
        if pts_secs <= self.last_pts_secs {
            return Err(ExportError::Container(format!(
                "video pts must be strictly increasing ({pts_secs} after {})",
                self.last_pts_secs
            )));
        }
        self.last_pts_secs = pts_secs;

        self.ensure_header()?;

        // Stage the RGBA bytes into a strided AVFrame.
        let mut rgba = VideoFrame::new(Pixel::RGBA, self.width, self.height);
        {
            let row_bytes = self.width as usize * 4;
            let stride = rgba.stride(0);
            let dst = rgba.data_mut(0);
            for row in 0..self.height as usize {
                dst[row * stride..row * stride + row_bytes]
                    .copy_from_slice(&pixels.data[row * row_bytes..(row + 1) * row_bytes]);
            }
        }

        let mut yuv = VideoFrame::empty();
        self.scaler
            .run(&rgba, &mut yuv)
            .map_err(|e| ExportError::Container(format!("scale video frame: {e}")))?;

        yuv.set_pts(Some(self.next_frame_idx));
        // swscale inherits the source SAR; override to 1:1 so players don't
        // letterbox. No safe setter exists in this ffmpeg-the-third.
        unsafe {
            (*yuv.as_mut_ptr()).sample_aspect_ratio = ffmpeg::ffi::AVRational { num: 1, den: 1 };
        }

        self.video
            .send_frame(&yuv)
            .map_err(|e| ExportError::Container(format!("send video frame: {e}")))?;
        self.drain_video_packets()?;

        self.next_frame_idx += 1;
        Ok(())
    }

    fn write_audio_samples(
        &mut self,
        interleaved: &[f32],
        channels: u16,
        sample_rate: u32,
        pts_secs: f64,
    ) -> Result<(), ExportError> {
        let Some(audio) = self.audio.as_mut() else {
            return Err(ExportError::Container(
                "write_audio_samples without add_audio_track".into(),
            ));
        };
        if channels == 0 || sample_rate == 0 || interleaved.is_empty() {
            return Ok(());
        }
        if pts_secs < 0.0 {
            return Err(ExportError::Container(format!("negative audio pts {pts_secs}")));
        }

        let stereo = Self::to_mix_format(interleaved, channels, sample_rate)?;

        let offset = (pts_secs * AUDIO_RATE as f64).round() as usize * 2;
        let end = offset + stereo.len();
        if audio.mix.len() < end {
            audio.mix.resize(end, 0.0);
        }
        // Overlapping tracks mix by summation, clamped to full scale.
        for (dst, s) in audio.mix[offset..end].iter_mut().zip(&stereo) {
            *dst = (*dst + *s).clamp(-1.0, 1.0);
        }
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<EncodedContainer, ExportError> {
        self.ensure_header()?;

        // ── Flush video ───────────────────────────────────────────────────────
        self.video
            .send_eof()
            .map_err(|e| ExportError::Container(format!("send EOF to video encoder: {e}")))?;
        self.drain_video_packets()?;

        // ── Encode the audio mix, then flush ──────────────────────────────────
        if let Some(audio) = self.audio.as_mut() {
            let mix = std::mem::take(&mut audio.mix);
            audio.fifo.push_interleaved(&mix);
        }
        self.drain_audio_fifo(true)?;
        if let Some(audio) = self.audio.as_mut() {
            audio
                .encoder
                .send_eof()
                .map_err(|e| ExportError::Container(format!("send EOF to audio encoder: {e}")))?;
            Self::drain_audio_packets(&mut self.octx, audio)?;
        }

        self.octx
            .write_trailer()
            .map_err(|e| ExportError::Container(format!("write trailer: {e}")))?;

        // Read the finished container back out of the scratch file.
        let mut bytes = Vec::new();
        let mut file = std::fs::File::open(self.scratch.path())
            .map_err(|e| ExportError::Container(format!("reopen scratch output: {e}")))?;
        file.read_to_end(&mut bytes)
            .map_err(|e| ExportError::Container(format!("read scratch output: {e}")))?;

        log::debug!(
            "mp4 finalized: {} frames, {} bytes",
            self.next_frame_idx,
            bytes.len()
        );
        Ok(EncodedContainer { bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_splits_interleaved_into_planes() {
        let mut fifo = AudioFifo::new();
        fifo.push_interleaved(&[0.1, -0.1, 0.2, -0.2, 0.3, -0.3]);
        assert_eq!(fifo.len(), 3);
        assert_eq!(fifo.left, vec![0.1, 0.2, 0.3]);
        assert_eq!(fifo.right, vec![-0.1, -0.2, -0.3]);
    }

    #[test]
    fn fifo_pop_zero_pads_the_tail() {
        let mut fifo = AudioFifo::new();
        fifo.push_interleaved(&[0.5, 0.5, 0.25, 0.25]);

        let frame = fifo.pop_frame(8, 0);
        assert_eq!(frame.samples(), 8);
        assert_eq!(frame.pts(), Some(0));
        assert_eq!(fifo.len(), 0, "popped samples leave the fifo");

        let left = frame.data(0);
        let l0 = f32::from_ne_bytes(left[0..4].try_into().unwrap());
        let l2 = f32::from_ne_bytes(left[8..12].try_into().unwrap());
        assert_eq!(l0, 0.5);
        assert_eq!(l2, 0.0, "tail is silence");
    }

    #[test]
    fn mono_upmix_duplicates_into_both_channels() {
        // Same rate, mono → stereo: length doubles, pairs match.
        let out = Mp4Writer::to_mix_format(&[0.5, -0.5], 1, AUDIO_RATE as u32).unwrap();
        assert_eq!(out.len(), 4);
        assert!((out[0] - out[1]).abs() < 1e-6);
        assert!((out[2] - out[3]).abs() < 1e-6);
    }

    #[test]
    fn stereo_at_output_rate_passes_through() {
        let samples = [0.1, 0.2, 0.3, 0.4];
        let out = Mp4Writer::to_mix_format(&samples, 2, AUDIO_RATE as u32).unwrap();
        assert_eq!(out, samples);
    }
}
