//! Built-in decoders and the options that configure them.

use std::path::PathBuf;
use std::sync::Arc;

use crate::decoder::registry::DecoderRegistry;
use crate::foundation::core::Color32;
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::foundation::platform::{
    FixedAdvanceMeasure, MonotonicTicks, SourceFs, StdFs, TextMeasure, TickSource,
};
use crate::source::image_source::ImageSource;

pub(crate) mod gif;
pub(crate) mod raster;
pub(crate) mod raw;
pub(crate) mod svg;
pub(crate) mod symbol;
pub(crate) mod video;

/// Bytes read from the start of a file to sniff its format.
const SNIFF_LEN: usize = 64;

/// Configuration shared by the built-in decoders.
#[derive(Clone)]
pub struct BuiltinDecoderOpts {
    /// File access for path sources.
    pub fs: Arc<dyn SourceFs>,
    /// Text measurement for symbol sources.
    pub measure: Arc<dyn TextMeasure>,
    /// Tick source stamped into descriptors on open.
    pub ticks: Arc<dyn TickSource>,
    /// Largest SVG raster width or height.
    pub svg_max_dim: u32,
}

impl Default for BuiltinDecoderOpts {
    fn default() -> Self {
        Self {
            fs: Arc::new(StdFs::new()),
            measure: Arc::new(FixedAdvanceMeasure::default()),
            ticks: Arc::new(MonotonicTicks::default()),
            svg_max_dim: 4096,
        }
    }
}

impl BuiltinDecoderOpts {
    /// Resolve relative file sources against `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.fs = Arc::new(StdFs::with_root(root));
        self
    }

    /// Use a custom file system.
    pub fn with_fs(mut self, fs: Arc<dyn SourceFs>) -> Self {
        self.fs = fs;
        self
    }

    /// Use a custom text measurement.
    pub fn with_measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// Use a custom tick source.
    pub fn with_ticks(mut self, ticks: Arc<dyn TickSource>) -> Self {
        self.ticks = ticks;
        self
    }

    /// Bound SVG rasters to `max_dim` pixels per side.
    pub fn with_svg_max_dim(mut self, max_dim: u32) -> Self {
        self.svg_max_dim = max_dim;
        self
    }
}

impl DecoderRegistry {
    /// Registry with every built-in decoder, in order: raw, raster, gif, svg, symbol, and video
    /// when the `media-ffmpeg` feature is enabled.
    pub fn with_builtins(opts: BuiltinDecoderOpts) -> Self {
        let mut reg = Self::with_ticks(Arc::clone(&opts.ticks));
        reg.register(Box::new(raw::RawDecoder::new(Arc::clone(&opts.fs))));
        reg.register(Box::new(raster::RasterDecoder::new(Arc::clone(&opts.fs))));
        reg.register(Box::new(gif::GifDecoder::new(Arc::clone(&opts.fs))));
        reg.register(Box::new(svg::SvgDecoder::new(
            Arc::clone(&opts.fs),
            opts.svg_max_dim,
        )));
        reg.register(Box::new(symbol::SymbolDecoder::new(Arc::clone(
            &opts.measure,
        ))));
        #[cfg(feature = "media-ffmpeg")]
        reg.register(Box::new(video::VideoDecoder::new(Arc::clone(&opts.fs))));
        reg
    }
}

/// Leading bytes of a buffer or file source, for format sniffing.
pub(crate) fn source_head(fs: &dyn SourceFs, src: &ImageSource) -> Option<Vec<u8>> {
    match src {
        ImageSource::Buffer(data) => Some(data[..data.len().min(SNIFF_LEN)].to_vec()),
        ImageSource::File { path, .. } => fs.read_prefix(path, SNIFF_LEN).ok(),
        ImageSource::Unknown | ImageSource::Symbol(_) => None,
    }
}

/// Whole contents of a buffer or file source. Buffers are shared, files are read.
pub(crate) fn source_bytes(fs: &dyn SourceFs, src: &ImageSource) -> ImgpipeResult<Arc<[u8]>> {
    match src {
        ImageSource::Buffer(data) => Ok(Arc::clone(data)),
        ImageSource::File { path, .. } => Ok(fs.read_all(path)?.into()),
        other => Err(ImgpipeError::validation(format!(
            "{other} has no image bytes"
        ))),
    }
}

/// Convert straight RGBA8 into native pixels.
pub(crate) fn rgba8_to_colors(rgba: &[u8]) -> Vec<Color32> {
    rgba.chunks_exact(4)
        .map(|px| Color32::rgba(px[0], px[1], px[2], px[3]))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/decoders/mod.rs"]
mod tests;
