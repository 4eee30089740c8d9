use std::sync::Arc;

use crate::decoder::caps::DecoderCaps;
use crate::decoder::descriptor::{DecodeDescriptor, PixelData};
use crate::decoder::registry::{DecoderFeatures, ImageDecoder, OpenFlags};
use crate::foundation::core::{Color32, ColorFormat, ImageHeader};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::foundation::platform::SourceFs;
use crate::source::blob::{RAW_HEADER_LEN, parse_raw_header};
use crate::source::image_source::ImageSource;

/// Decoder for raw image blobs: in-memory buffers and `.bin` files.
///
/// Buffers open as cached images that alias the source bytes. Files are streamed row by row
/// through [`ImageDecoder::read_line`].
pub struct RawDecoder {
    fs: Arc<dyn SourceFs>,
}

struct RawFile {
    path: String,
    stored: ImageHeader,
}

impl RawDecoder {
    /// Create a raw decoder reading `.bin` files through `fs`.
    pub fn new(fs: Arc<dyn SourceFs>) -> Self {
        Self { fs }
    }

    fn stored_header(&self, src: &ImageSource) -> ImgpipeResult<ImageHeader> {
        match src {
            ImageSource::Buffer(data) => {
                let header = parse_raw_header(data)?;
                let need = RAW_HEADER_LEN + header.byte_len();
                if data.len() < need {
                    return Err(ImgpipeError::validation(format!(
                        "raw blob is {} bytes, header needs {need}",
                        data.len()
                    )));
                }
                Ok(header)
            }
            ImageSource::File { path, .. } if is_bin(src) => {
                let mut word = [0u8; RAW_HEADER_LEN];
                self.fs.read_at(path, 0, &mut word)?;
                parse_raw_header(&word)
            }
            other => Err(ImgpipeError::validation(format!(
                "{other} is not a raw image blob"
            ))),
        }
    }
}

fn is_bin(src: &ImageSource) -> bool {
    src.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"))
}

/// Format produced for a stored format: alpha-only data is tinted into native alpha pixels.
fn output_format(stored: ColorFormat) -> ColorFormat {
    match stored {
        ColorFormat::Alpha8 => ColorFormat::NativeAlpha,
        cf => cf,
    }
}

fn expand_alpha8(alpha: &[u8], color: Color32, out: &mut [Color32]) {
    for (dst, &a) in out.iter_mut().zip(alpha) {
        *dst = color.with_alpha(a);
    }
}

impl ImageDecoder for RawDecoder {
    fn name(&self) -> &str {
        "raw"
    }

    fn features(&self) -> DecoderFeatures {
        DecoderFeatures {
            read_line: true,
            ..DecoderFeatures::default()
        }
    }

    fn accept(&self, src: &ImageSource) -> Option<DecoderCaps> {
        let header = self.stored_header(src).ok()?;
        let mut caps = DecoderCaps::NONE;
        if matches!(src, ImageSource::Buffer(_)) {
            caps |= DecoderCaps::CACHED;
        }
        if header.cf.has_alpha() || header.cf == ColorFormat::NativeChromaKeyed {
            caps |= DecoderCaps::TRANSPARENT;
        }
        Some(caps)
    }

    fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        let src = dsc.input().source.clone();
        let stored = self.stored_header(&src)?;
        let header = ImageHeader::new(stored.w, stored.h, output_format(stored.cf));

        if flags == OpenFlags::MetaOnly {
            dsc.header = header;
            return Ok(());
        }

        match &src {
            ImageSource::Buffer(data) => {
                let pixels = &data[RAW_HEADER_LEN..RAW_HEADER_LEN + stored.byte_len()];
                let img = if stored.cf == ColorFormat::Alpha8 {
                    let mut out = vec![Color32::default(); pixels.len()];
                    expand_alpha8(pixels, dsc.input().color, &mut out);
                    PixelData::from_colors(&out)
                } else {
                    PixelData::slice(
                        Arc::clone(data),
                        RAW_HEADER_LEN..RAW_HEADER_LEN + stored.byte_len(),
                    )?
                };
                dsc.img_data = Some(img);
            }
            ImageSource::File { path, .. } => {
                let file = RawFile {
                    path: path.clone(),
                    stored,
                };
                let ctx = dsc
                    .ctx
                    .as_mut()
                    .ok_or_else(|| ImgpipeError::misuse("raw file open without a context"))?;
                ctx.set_private(file);
                dsc.img_data = None;
            }
            _ => {}
        }
        dsc.header = header;
        Ok(())
    }

    fn read_line(
        &self,
        dsc: &mut DecodeDescriptor,
        x: u32,
        y: u32,
        len: u32,
        buf: &mut [u8],
    ) -> ImgpipeResult<()> {
        let color = dsc.input().color;
        let file = dsc
            .ctx
            .as_ref()
            .and_then(|ctx| ctx.private_ref::<RawFile>())
            .ok_or_else(|| ImgpipeError::read_line("raw source is not a streamed file"))?;

        let bpp = file.stored.cf.bytes_per_pixel();
        let offset = RAW_HEADER_LEN + (y as usize * file.stored.w as usize + x as usize) * bpp;
        let mut row = vec![0u8; len as usize * bpp];
        self.fs.read_at(&file.path, offset as u64, &mut row)?;

        if file.stored.cf == ColorFormat::Alpha8 {
            let out: &mut [Color32] = bytemuck::try_cast_slice_mut(buf)
                .map_err(|e| ImgpipeError::read_line(format!("line buffer layout: {e}")))?;
            expand_alpha8(&row, color, out);
        } else {
            buf[..row.len()].copy_from_slice(&row);
        }
        Ok(())
    }

    fn close(&self, dsc: &mut DecodeDescriptor) {
        if let Some(ctx) = dsc.ctx.as_mut() {
            ctx.clear_private();
        }
    }

    fn is_raw(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decoders/raw.rs"]
mod tests;
