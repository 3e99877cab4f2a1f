use std::path::{Path, PathBuf};

use crate::output::domain::frame_sink::{FrameSink, SinkError};

/// Encodes RGBA frames into a video file via ffmpeg-next.
///
/// Prefers H.264 and falls back to MPEG-4 Part 2 when no usable H.264
/// encoder is available. Frames are timestamped at a constant rate.
pub struct FfmpegFileSink {
    path: PathBuf,
    width: u32,
    height: u32,
    frame_rate: u32,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    frame_count: i64,
}

// Safety: FfmpegFileSink is only used from a single thread at a time
// (the paced writer keeps it behind a mutex). The raw pointers inside
// ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegFileSink {}

impl FfmpegFileSink {
    pub fn new(path: &Path, width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            width,
            height,
            frame_rate: frame_rate.max(1),
            octx: None,
            encoder: None,
            scaler: None,
            frame_count: 0,
        }
    }

    fn time_base(&self) -> ffmpeg_next::Rational {
        ffmpeg_next::Rational(1, self.frame_rate as i32)
    }

    fn open_encoder(
        &self,
        codec_id: ffmpeg_next::codec::Id,
        global_header: bool,
    ) -> Result<
        (ffmpeg_next::Codec, ffmpeg_next::codec::encoder::video::Encoder),
        Box<dyn std::error::Error>,
    > {
        let codec = ffmpeg_next::encoder::find(codec_id)
            .ok_or_else(|| format!("{codec_id:?} encoder not found"))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;
        encoder_ctx.set_width(self.width);
        encoder_ctx.set_height(self.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(self.time_base());
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(self.frame_rate as i32, 1)));
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        Ok((codec, encoder))
    }

    fn open_inner(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut octx = ffmpeg_next::format::output(&self.path)?;
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let (codec, encoder) = match self.open_encoder(ffmpeg_next::codec::Id::H264, global_header)
        {
            Ok(pair) => pair,
            Err(e) => {
                log::info!("H.264 unavailable ({e}), falling back to MPEG-4");
                self.open_encoder(ffmpeg_next::codec::Id::MPEG4, global_header)?
            }
        };
        log::info!(
            "Encoding {}x{} @ {} fps with {} to {}",
            self.width,
            self.height,
            self.frame_rate,
            codec.name(),
            self.path.display()
        );

        let mut ost = octx.add_stream(Some(codec))?;
        ost.set_parameters(&encoder);
        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGBA,
            self.width,
            self.height,
            ffmpeg_next::format::Pixel::YUV420P,
            self.width,
            self.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;
        Ok(())
    }

    fn write_inner(&mut self, rgba: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let time_base = self.time_base();
        let (Some(encoder), Some(scaler), Some(octx)) = (
            self.encoder.as_mut(),
            self.scaler.as_mut(),
            self.octx.as_mut(),
        ) else {
            return Err("FfmpegFileSink: not opened".into());
        };

        let mut rgba_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGBA,
            self.width,
            self.height,
        );

        let stride = rgba_frame.stride(0);
        let row_bytes = self.width as usize * 4;
        let data = rgba_frame.data_mut(0);

        // Copy pixel data, respecting stride
        for row in 0..self.height as usize {
            let src_start = row * row_bytes;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&rgba[src_start..src_start + row_bytes]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgba_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count));

        encoder.send_frame(&yuv_frame)?;
        drain_packets(encoder, octx, time_base)?;

        self.frame_count += 1;
        Ok(())
    }

    fn close_inner(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let time_base = self.time_base();
        if let (Some(mut encoder), Some(mut octx)) = (self.encoder.take(), self.octx.take()) {
            encoder.send_eof()?;
            drain_packets(&mut encoder, &mut octx, time_base)?;
            octx.write_trailer()?;
            log::info!(
                "Wrote {} frames to {}",
                self.frame_count,
                self.path.display()
            );
        }
        self.scaler = None;
        Ok(())
    }
}

fn drain_packets(
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    time_base: ffmpeg_next::Rational,
) -> Result<(), Box<dyn std::error::Error>> {
    let ost_time_base = octx
        .stream(0)
        .ok_or("output stream missing")?
        .time_base();
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(0);
        encoded.rescale_ts(time_base, ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}

fn backend(e: Box<dyn std::error::Error>) -> SinkError {
    SinkError::Backend(e.to_string())
}

impl FrameSink for FfmpegFileSink {
    fn open(&mut self) -> Result<(), SinkError> {
        self.open_inner().map_err(backend)
    }

    fn write(&mut self, rgba: &[u8]) -> Result<(), SinkError> {
        if self.encoder.is_none() {
            return Err(SinkError::NotOpen);
        }
        if rgba.len() != self.frame_size() {
            return Err(SinkError::FrameSize {
                expected: self.frame_size(),
                actual: rgba.len(),
            });
        }
        self.write_inner(rgba).map_err(backend)
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.close_inner().map_err(backend)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for FfmpegFileSink {
    fn drop(&mut self) {
        if let Err(e) = self.close_inner() {
            log::warn!("Failed to finalize {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_rgba(w: u32, h: u32, value: u8) -> Vec<u8> {
        let mut data = vec![value; (w * h * 4) as usize];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        data
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut sink = FfmpegFileSink::new(&path, 160, 120, 30);
        sink.open().unwrap();
        for _ in 0..3 {
            sink.write(&solid_rgba(160, 120, 128)).unwrap();
        }
        sink.close().unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_written_video_has_correct_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut sink = FfmpegFileSink::new(&path, 160, 120, 30);
        sink.open().unwrap();
        sink.write(&solid_rgba(160, 120, 128)).unwrap();
        sink.close().unwrap();

        ffmpeg_next::init().unwrap();
        let ictx = ffmpeg_next::format::input(&path).unwrap();
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).unwrap();
        let decoder = codec_ctx.decoder().video().unwrap();
        assert_eq!(decoder.width(), 160);
        assert_eq!(decoder.height(), 120);
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FfmpegFileSink::new(&dir.path().join("out.mp4"), 160, 120, 30);
        let result = sink.write(&solid_rgba(160, 120, 128));
        assert!(matches!(result, Err(SinkError::NotOpen)));
    }

    #[test]
    fn test_wrong_frame_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FfmpegFileSink::new(&dir.path().join("out.mp4"), 160, 120, 30);
        sink.open().unwrap();
        let result = sink.write(&solid_rgba(80, 60, 0));
        assert!(matches!(result, Err(SinkError::FrameSize { .. })));
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut sink = FfmpegFileSink::new(&path, 160, 120, 30);
        sink.open().unwrap();
        sink.write(&solid_rgba(160, 120, 128)).unwrap();
        sink.close().unwrap();
        assert!(sink.close().is_ok());
    }
}
