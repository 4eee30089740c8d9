use std::sync::Arc;

use anyhow::Context;

use crate::decoder::caps::DecoderCaps;
use crate::decoder::descriptor::{DecodeDescriptor, PixelData};
use crate::decoder::registry::{ImageDecoder, OpenFlags};
use crate::decoders::{source_bytes, source_head};
use crate::foundation::core::{Color32, ColorFormat, ImageHeader, Point};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::foundation::platform::SourceFs;
use crate::source::image_source::ImageSource;

/// SVG decoder: parses with `usvg` and rasterizes with `resvg`.
///
/// The raster size is the input size hint when given (one zero axis keeps the aspect ratio),
/// otherwise the document's own size.
pub struct SvgDecoder {
    fs: Arc<dyn SourceFs>,
    max_dim: u32,
}

impl SvgDecoder {
    /// Create an SVG decoder with rasters bounded to `max_dim` pixels per side.
    pub fn new(fs: Arc<dyn SourceFs>, max_dim: u32) -> Self {
        Self { fs, max_dim }
    }

    fn raster_size(&self, tree: &usvg::Tree, hint: Option<Point>) -> ImgpipeResult<(u32, u32)> {
        let size = tree.size();
        let (doc_w, doc_h) = (size.width(), size.height());
        if !doc_w.is_finite() || !doc_h.is_finite() || doc_w <= 0.0 || doc_h <= 0.0 {
            return Err(ImgpipeError::validation("svg has invalid width/height"));
        }

        let (w, h) = match hint {
            Some(Point { x, y }) if x > 0 && y > 0 => (x as f32, y as f32),
            Some(Point { x, y }) if x > 0 && y <= 0 => (x as f32, x as f32 * doc_h / doc_w),
            Some(Point { x, y }) if x <= 0 && y > 0 => (y as f32 * doc_w / doc_h, y as f32),
            _ => (doc_w, doc_h),
        };
        let w = (w.ceil() as u32).max(1);
        let h = (h.ceil() as u32).max(1);
        if w > self.max_dim || h > self.max_dim {
            return Err(ImgpipeError::validation(format!(
                "svg raster size too large: {w}x{h} (max {0}x{0})",
                self.max_dim
            )));
        }
        Ok((w, h))
    }
}

fn looks_like_svg(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}

fn rasterize(tree: &usvg::Tree, w: u32, h: u32) -> ImgpipeResult<Vec<Color32>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| ImgpipeError::allocation(format!("svg pixmap {w}x{h}")))?;
    let sx = w as f32 / tree.size().width();
    let sy = h as f32 / tree.size().height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap
        .pixels()
        .iter()
        .map(|px| {
            let c = px.demultiply();
            Color32::rgba(c.red(), c.green(), c.blue(), c.alpha())
        })
        .collect())
}

impl ImageDecoder for SvgDecoder {
    fn name(&self) -> &str {
        "svg"
    }

    fn accept(&self, src: &ImageSource) -> Option<DecoderCaps> {
        let by_ext = src
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        let by_content = || source_head(self.fs.as_ref(), src).is_some_and(|h| looks_like_svg(&h));
        (by_ext || by_content())
            .then_some(DecoderCaps::VECTOR | DecoderCaps::CACHED | DecoderCaps::TRANSPARENT)
    }

    fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        let bytes = source_bytes(self.fs.as_ref(), &dsc.input().source)?;
        let tree = usvg::Tree::from_data(&bytes, &usvg::Options::default())
            .context("parse svg tree")?;
        let (w, h) = self.raster_size(&tree, dsc.input().size_hint)?;
        dsc.header = ImageHeader::new(w, h, ColorFormat::NativeAlpha);
        if flags == OpenFlags::MetaOnly {
            return Ok(());
        }

        let pixels = rasterize(&tree, w, h)?;
        dsc.img_data = Some(PixelData::from_colors(&pixels));
        Ok(())
    }

    fn close(&self, _dsc: &mut DecodeDescriptor) {}
}

#[cfg(test)]
#[path = "../../tests/unit/decoders/svg.rs"]
mod tests;
