//! imgpipe is the image decoding and compositing core of an embedded GUI toolkit.
//!
//! The pipeline has four stages:
//!
//! - Describe an image with an [`ImageSource`] (file path, in-memory buffer or symbol text)
//! - Find a decoder for it in a [`DecoderRegistry`] (first registered, first tried)
//! - Drive a decode session through [`DecoderRegistry::open`] or the RAII [`DecodeSession`],
//!   getting either a fully buffered image or line-by-line reads
//! - Draw the pixels with a [`Compositor`], applying rotation, zoom, recolor, opacity, alpha
//!   and chroma keying
//!
//! [`DecoderRegistry::with_builtins`] registers decoders for raw blobs, common raster formats,
//! animated GIF, SVG, symbols and (with the `media-ffmpeg` feature) video files.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod decoder;
pub(crate) mod decoders;
pub(crate) mod draw;
pub(crate) mod source;

pub use decoder::callback::{AcceptFn, CloseFn, OpenFn, ReadLineFn};
pub use decoder::caps::DecoderCaps;
pub use decoder::context::DecodeContext;
pub use decoder::descriptor::{DecodeDescriptor, DecodeInput, PixelData, SessionState};
pub use decoder::registry::{
    AcceptMode, DecoderFeatures, DecoderId, DecoderRegistry, ImageDecoder, OpenFlags,
};
pub use decoder::session::DecodeSession;
pub use decoders::gif::GifDecoder;
pub use decoders::raster::RasterDecoder;
pub use decoders::raw::RawDecoder;
pub use decoders::svg::SvgDecoder;
pub use decoders::symbol::SymbolDecoder;
pub use decoders::video::{VideoDecoder, VideoProbe, probe_video};
pub use decoders::BuiltinDecoderOpts;
pub use draw::blend::{AlphaMode, ChromaKeyRange};
pub use draw::blit::{BlitEngine, Compositor, SoftwareBlitter};
pub use draw::dsc::{ANGLE_MAX, DrawImageDsc};
pub use draw::scratch::{
    CompositorOpts, DEFAULT_SCRATCH_HEIGHT, DEFAULT_SCRATCH_WIDTH, ScratchBuffer,
};
pub use draw::surface::{PixelBuf, PixelBufMut};
pub use draw::transform::pivot_offset;
pub use foundation::core::{
    Area, Color32, ColorFormat, ImageHeader, OPA_COVER, OPA_MAX, OPA_MIN, OPA_TRANSP, Point,
    ZOOM_NONE,
};
pub use foundation::error::{ImgpipeError, ImgpipeResult};
pub use foundation::platform::{
    FixedAdvanceMeasure, MonotonicTicks, SourceFs, StdFs, TextMeasure, TickSource,
};
pub use source::blob::{
    RAW_HEADER_LEN, RAW_MAX_DIM, encode_raw_blob, encode_raw_header, parse_raw_header,
};
pub use source::image_source::{ImageSource, SourceKind};
pub use source::legacy::{classify, parse_legacy};
