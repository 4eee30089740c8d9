use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use image::ImageDecoder as _;

use crate::decoder::caps::DecoderCaps;
use crate::decoder::descriptor::{DecodeDescriptor, PixelData};
use crate::decoder::registry::{ImageDecoder, OpenFlags};
use crate::decoders::{rgba8_to_colors, source_bytes, source_head};
use crate::foundation::core::{ColorFormat, ImageHeader};
use crate::foundation::error::ImgpipeResult;
use crate::foundation::platform::SourceFs;
use crate::source::image_source::ImageSource;

/// Still raster images (PNG, JPEG, BMP, WebP, ...) decoded with the `image` crate.
///
/// GIF is left to the animated GIF decoder.
pub struct RasterDecoder {
    fs: Arc<dyn SourceFs>,
}

impl RasterDecoder {
    /// Create a raster decoder reading files through `fs`.
    pub fn new(fs: Arc<dyn SourceFs>) -> Self {
        Self { fs }
    }
}

impl ImageDecoder for RasterDecoder {
    fn name(&self) -> &str {
        "raster"
    }

    fn accept(&self, src: &ImageSource) -> Option<DecoderCaps> {
        let head = source_head(self.fs.as_ref(), src)?;
        match image::guess_format(&head).ok()? {
            image::ImageFormat::Gif => None,
            _ => Some(DecoderCaps::CACHED),
        }
    }

    fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        let bytes = source_bytes(self.fs.as_ref(), &dsc.input().source)?;
        let decoder = image::ImageReader::new(Cursor::new(&bytes[..]))
            .with_guessed_format()
            .context("sniff raster format")?
            .into_decoder()
            .context("create raster decoder")?;

        let (w, h) = decoder.dimensions();
        let has_alpha = decoder.color_type().has_alpha();
        let cf = if has_alpha {
            ColorFormat::NativeAlpha
        } else {
            ColorFormat::Native
        };
        dsc.header = ImageHeader::new(w, h, cf);
        if has_alpha {
            dsc.caps |= DecoderCaps::TRANSPARENT;
        }
        if flags == OpenFlags::MetaOnly {
            return Ok(());
        }

        let rgba = image::DynamicImage::from_decoder(decoder)
            .context("decode raster image")?
            .to_rgba8();
        dsc.img_data = Some(PixelData::from_colors(&rgba8_to_colors(rgba.as_raw())));
        tracing::debug!(w, h, ?cf, "decoded raster image");
        Ok(())
    }

    fn close(&self, _dsc: &mut DecodeDescriptor) {}
}

#[cfg(test)]
#[path = "../../tests/unit/decoders/raster.rs"]
mod tests;
