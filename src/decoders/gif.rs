use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use image::{AnimationDecoder, ImageDecoder as _};

use crate::decoder::caps::DecoderCaps;
use crate::decoder::descriptor::{DecodeDescriptor, PixelData};
use crate::decoder::registry::{ImageDecoder, OpenFlags};
use crate::decoders::{rgba8_to_colors, source_bytes, source_head};
use crate::foundation::core::{ColorFormat, ImageHeader};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::foundation::platform::SourceFs;
use crate::source::image_source::ImageSource;

/// Animated GIF decoder.
///
/// Frames are decoded in stream order. Advancing forward decodes only the frames in between,
/// frame 0 rewinds the stream, and frames past the end keep the last rendered frame.
pub struct GifDecoder {
    fs: Arc<dyn SourceFs>,
}

struct GifStream {
    bytes: Arc<[u8]>,
    frames: image::Frames<'static>,
    next: u32,
    delays_ms: Vec<u32>,
}

impl GifStream {
    fn new(bytes: Arc<[u8]>) -> ImgpipeResult<Self> {
        let delays_ms = open_frames(&bytes)?
            .map(|frame| frame.map(|f| delay_ms(f.delay())))
            .collect::<Result<Vec<_>, _>>()
            .context("scan gif frames")?;
        let frames = open_frames(&bytes)?;
        Ok(Self {
            bytes,
            frames,
            next: 0,
            delays_ms,
        })
    }

    fn rewind(&mut self) -> ImgpipeResult<()> {
        self.frames = open_frames(&self.bytes)?;
        self.next = 0;
        Ok(())
    }

    /// Decode frame `index`, skipping the frames before it.
    fn frame(&mut self, index: u32) -> ImgpipeResult<image::RgbaImage> {
        if index < self.next {
            self.rewind()?;
        }
        loop {
            let frame = self
                .frames
                .next()
                .ok_or_else(|| ImgpipeError::validation(format!("gif ended before frame {index}")))?
                .context("decode gif frame")?;
            self.next += 1;
            if self.next > index {
                return Ok(frame.into_buffer());
            }
        }
    }

    /// Nominal frame rate, or 0 when delays differ.
    fn frame_rate(&self) -> u16 {
        match self.delays_ms.split_first() {
            Some((&first, rest)) if first > 0 && rest.iter().all(|&d| d == first) => {
                (1000 / first).clamp(1, u32::from(u16::MAX)) as u16
            }
            _ => 0,
        }
    }
}

fn open_frames(bytes: &Arc<[u8]>) -> ImgpipeResult<image::Frames<'static>> {
    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(Arc::clone(bytes)))
        .context("open gif stream")?;
    Ok(decoder.into_frames())
}

fn delay_ms(delay: image::Delay) -> u32 {
    let (num, den) = delay.numer_denom_ms();
    if den == 0 { 0 } else { num / den }
}

fn is_gif(head: &[u8]) -> bool {
    head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a")
}

impl GifDecoder {
    /// Create a GIF decoder reading files through `fs`.
    pub fn new(fs: Arc<dyn SourceFs>) -> Self {
        Self { fs }
    }
}

impl ImageDecoder for GifDecoder {
    fn name(&self) -> &str {
        "gif"
    }

    fn accept(&self, src: &ImageSource) -> Option<DecoderCaps> {
        let head = source_head(self.fs.as_ref(), src)?;
        is_gif(&head).then_some(
            DecoderCaps::ANIMATED
                | DecoderCaps::CACHED
                | DecoderCaps::LOOPING
                | DecoderCaps::TRANSPARENT,
        )
    }

    fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        if flags == OpenFlags::MetaOnly {
            let bytes = source_bytes(self.fs.as_ref(), &dsc.input().source)?;
            let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(&bytes[..]))
                .context("open gif stream")?;
            let (w, h) = decoder.dimensions();
            dsc.header = ImageHeader::new(w, h, ColorFormat::NativeAlpha);
            return Ok(());
        }

        let tick = dsc.open_tick_ms();
        let needs_stream = dsc
            .ctx
            .as_ref()
            .is_none_or(|ctx| ctx.private_ref::<GifStream>().is_none());
        let fresh = if needs_stream {
            let bytes = source_bytes(self.fs.as_ref(), &dsc.input().source)?;
            Some(GifStream::new(bytes)?)
        } else {
            None
        };

        let ctx = dsc
            .ctx
            .as_mut()
            .ok_or_else(|| ImgpipeError::misuse("gif open without a context"))?;
        let first_open = fresh.is_some();
        if let Some(stream) = fresh {
            if stream.delays_ms.is_empty() {
                return Err(ImgpipeError::validation("gif has no frames"));
            }
            ctx.total_frames = stream.delays_ms.len() as u32;
            ctx.frame_rate = stream.frame_rate();
            ctx.last_rendered_frame = None;
            ctx.set_private(stream);
        }

        let total = ctx.total_frames;
        // A first open past the end shows the last frame so there is something to hold.
        let current = if first_open {
            ctx.current_frame.min(total - 1)
        } else {
            ctx.current_frame
        };
        let last = ctx.last_rendered_frame;
        let frame_rate = ctx.frame_rate;
        let stream = ctx
            .private_mut::<GifStream>()
            .ok_or_else(|| ImgpipeError::misuse("gif stream state missing"))?;

        if current == 0 && stream.next != 0 {
            tracing::debug!("gif seek to stream start");
            stream.rewind()?;
        }
        let rendered = if last != Some(current) && current < total {
            let delay = stream.delays_ms[current as usize];
            let frame = stream.frame(current)?;
            Some((frame, delay))
        } else {
            None
        };

        let (w, h) = match &rendered {
            Some((frame, _)) => frame.dimensions(),
            None => (dsc.header.w, dsc.header.h),
        };
        if let Some((frame, delay)) = rendered {
            ctx.last_rendered_frame = Some(current);
            ctx.last_render_tick = tick;
            ctx.frame_delay_ms = delay;
            dsc.img_data = Some(PixelData::from_colors(&rgba8_to_colors(frame.as_raw())));
            tracing::trace!(frame = current, "decoded gif frame");
        }
        dsc.header = ImageHeader::new(w, h, ColorFormat::NativeAlpha);
        if frame_rate == 0 {
            dsc.caps |= DecoderCaps::VARIABLE_FRAME_RATE;
        }
        Ok(())
    }

    fn close(&self, dsc: &mut DecodeDescriptor) {
        if let Some(ctx) = dsc.ctx.as_mut() {
            ctx.clear_private();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decoders/gif.rs"]
mod tests;
