//! Video files decoded frame by frame through the system `ffprobe`/`ffmpeg` binaries.
//!
//! Only available with the `media-ffmpeg` feature; without it probing always fails and the
//! decoder declines every source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::decoder::caps::DecoderCaps;
use crate::decoder::descriptor::{DecodeDescriptor, PixelData};
use crate::decoder::registry::{ImageDecoder, OpenFlags};
use crate::foundation::core::{ColorFormat, ImageHeader};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::foundation::platform::SourceFs;
use crate::source::image_source::ImageSource;

/// Stream facts reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoProbe {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Frame rate numerator.
    pub fps_num: u32,
    /// Frame rate denominator.
    pub fps_den: u32,
    /// Number of frames in the stream (0 when unknown).
    pub frames: u32,
    /// The stream's pixel format carries alpha.
    pub has_alpha: bool,
}

impl VideoProbe {
    /// Whole frames per second, saturated to `u16`.
    pub fn frame_rate(&self) -> u16 {
        if self.fps_den == 0 {
            0
        } else {
            (self.fps_num / self.fps_den).min(u32::from(u16::MAX)) as u16
        }
    }

    /// Delay between frames in milliseconds.
    pub fn frame_delay_ms(&self) -> u32 {
        if self.fps_num == 0 {
            0
        } else {
            ((1000u64 * u64::from(self.fps_den)) / u64::from(self.fps_num)) as u32
        }
    }

    /// Presentation time of frame `index` in seconds.
    pub fn frame_time_sec(&self, index: u32) -> f64 {
        if self.fps_num == 0 {
            0.0
        } else {
            f64::from(index) * f64::from(self.fps_den) / f64::from(self.fps_num)
        }
    }
}

struct VideoStream {
    path: PathBuf,
    probe: VideoProbe,
}

/// Video decoder backed by `ffmpeg`.
///
/// Accepting a source probes it, which spawns `ffprobe`.
pub struct VideoDecoder {
    fs: Arc<dyn SourceFs>,
}

impl VideoDecoder {
    /// Create a video decoder resolving file sources through `fs`.
    pub fn new(fs: Arc<dyn SourceFs>) -> Self {
        Self { fs }
    }

    fn local_path(&self, src: &ImageSource) -> ImgpipeResult<PathBuf> {
        src.path()
            .and_then(|p| self.fs.local_path(p))
            .ok_or_else(|| ImgpipeError::validation(format!("{src} is not a local video file")))
    }
}

impl ImageDecoder for VideoDecoder {
    fn name(&self) -> &str {
        "video"
    }

    fn accept(&self, src: &ImageSource) -> Option<DecoderCaps> {
        let path = self.local_path(src).ok()?;
        let probe = probe_video(&path).ok()?;
        let caps = DecoderCaps::ANIMATED | DecoderCaps::CACHED;
        Some(if probe.has_alpha {
            caps | DecoderCaps::TRANSPARENT
        } else {
            caps
        })
    }

    fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        let have_stream = dsc
            .ctx
            .as_ref()
            .is_some_and(|ctx| ctx.private_ref::<VideoStream>().is_some());
        let fresh = if have_stream {
            None
        } else {
            let path = self.local_path(&dsc.input().source)?;
            let probe = probe_video(&path)?;
            if probe.frames == 0 {
                dsc.error_msg = Some(format!("'{}' reports zero frames", path.display()));
                return Err(ImgpipeError::validation("video stream has no frames"));
            }
            let cf = if probe.has_alpha {
                ColorFormat::NativeAlpha
            } else {
                ColorFormat::Native
            };
            dsc.header = ImageHeader::new(probe.width, probe.height, cf);
            if flags == OpenFlags::MetaOnly {
                return Ok(());
            }
            Some(VideoStream { path, probe })
        };

        let tick = dsc.open_tick_ms();
        let ctx = dsc
            .ctx
            .as_mut()
            .ok_or_else(|| ImgpipeError::misuse("video open without a context"))?;
        let first_open = fresh.is_some();
        if let Some(stream) = fresh {
            ctx.total_frames = stream.probe.frames;
            ctx.frame_rate = stream.probe.frame_rate();
            ctx.frame_delay_ms = stream.probe.frame_delay_ms();
            ctx.last_rendered_frame = None;
            ctx.set_private(stream);
        }

        // A first open past the end shows the last frame so there is something to hold.
        let current = if first_open {
            ctx.current_frame.min(ctx.total_frames - 1)
        } else {
            ctx.current_frame
        };
        if current == 0 {
            tracing::debug!("video seek to stream start");
        }
        if ctx.last_rendered_frame == Some(current) || current >= ctx.total_frames {
            return Ok(());
        }

        let stream = ctx
            .private_ref::<VideoStream>()
            .ok_or_else(|| ImgpipeError::misuse("video stream state missing"))?;
        let bytes = decode_frame_bgra(&stream.path, &stream.probe, current)?;
        ctx.last_rendered_frame = Some(current);
        ctx.last_render_tick = tick;
        dsc.img_data = Some(PixelData::from_vec(bytes));
        Ok(())
    }

    fn close(&self, dsc: &mut DecodeDescriptor) {
        if let Some(ctx) = dsc.ctx.as_mut() {
            ctx.clear_private();
        }
    }
}

/// Probe the first video stream of `path`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(path: &Path) -> ImgpipeResult<VideoProbe> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
        duration: Option<String>,
        pix_fmt: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| ImgpipeError::validation(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ImgpipeError::validation(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ImgpipeError::validation(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ImgpipeError::validation("no video stream found"))?;
    let width = stream
        .width
        .ok_or_else(|| ImgpipeError::validation("missing video width from ffprobe"))?;
    let height = stream
        .height
        .ok_or_else(|| ImgpipeError::validation("missing video height from ffprobe"))?;
    let (fps_num, fps_den) = parse_ff_ratio(stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| ImgpipeError::validation("invalid video r_frame_rate"))?;

    let frames = match stream.nb_frames.as_deref().and_then(|s| s.parse::<u32>().ok()) {
        Some(n) => n,
        None => {
            let duration = stream
                .duration
                .as_deref()
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.0);
            (duration * f64::from(fps_num) / f64::from(fps_den)).round() as u32
        }
    };

    Ok(VideoProbe {
        width,
        height,
        fps_num,
        fps_den,
        frames,
        has_alpha: stream.pix_fmt.as_deref().is_some_and(pix_fmt_has_alpha),
    })
}

/// Pixel formats with an alpha plane, as named by ffmpeg.
#[cfg(feature = "media-ffmpeg")]
fn pix_fmt_has_alpha(fmt: &str) -> bool {
    ["yuva", "rgba", "bgra", "argb", "abgr", "gbrap", "ya8", "ya16", "rgb32", "bgr32"]
        .iter()
        .any(|prefix| fmt.starts_with(prefix))
}

/// Probe a video file. Always fails without the `media-ffmpeg` feature.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_path: &Path) -> ImgpipeResult<VideoProbe> {
    Err(ImgpipeError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn decode_frame_bgra(path: &Path, probe: &VideoProbe, index: u32) -> ImgpipeResult<Vec<u8>> {
    let out = std::process::Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-ss",
            &format!("{:.9}", probe.frame_time_sec(index)),
        ])
        .arg("-i")
        .arg(path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "bgra",
            "pipe:1",
        ])
        .output()
        .map_err(|e| ImgpipeError::validation(format!("failed to run ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(ImgpipeError::validation(format!(
            "ffmpeg frame decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected = probe.width as usize * probe.height as usize * 4;
    if expected == 0 || out.stdout.len() < expected {
        return Err(ImgpipeError::validation(format!(
            "decoded video frame {index} has {} bytes, expected {expected}",
            out.stdout.len()
        )));
    }
    let mut frame = out.stdout;
    frame.truncate(expected);
    Ok(frame)
}

#[cfg(not(feature = "media-ffmpeg"))]
fn decode_frame_bgra(_path: &Path, _probe: &VideoProbe, _index: u32) -> ImgpipeResult<Vec<u8>> {
    Err(ImgpipeError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/decoders/video.rs"]
mod tests;
