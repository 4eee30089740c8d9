use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use crate::decoder::caps::DecoderCaps;
use crate::decoder::context::DecodeContext;
use crate::decoder::registry::DecoderId;
use crate::foundation::core::{Color32, ImageHeader, Point};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::source::image_source::ImageSource;

/// What to decode and how the caller wants it.
#[derive(Clone, Debug, Default)]
pub struct DecodeInput {
    /// Image source.
    pub source: ImageSource,
    /// Tint applied to alpha-only images.
    pub color: Color32,
    /// Requested raster size for resolution independent sources.
    pub size_hint: Option<Point>,
}

impl DecodeInput {
    /// Input for `source` with a black tint and no size hint.
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            color: Color32::BLACK,
            size_hint: None,
        }
    }
}

/// Decoded pixel bytes: a shared allocation plus the byte range that belongs to the image.
///
/// Buffer sources are usually exposed without copying, so the range skips the blob header.
#[derive(Clone, Debug)]
pub struct PixelData {
    bytes: Arc<[u8]>,
    range: Range<usize>,
}

impl PixelData {
    /// Wrap a whole allocation.
    pub fn new(bytes: Arc<[u8]>) -> Self {
        let range = 0..bytes.len();
        Self { bytes, range }
    }

    /// Wrap `range` of a shared allocation.
    pub fn slice(bytes: Arc<[u8]>, range: Range<usize>) -> ImgpipeResult<Self> {
        if range.start > range.end || range.end > bytes.len() {
            return Err(ImgpipeError::validation(format!(
                "pixel range {range:?} outside {} byte buffer",
                bytes.len()
            )));
        }
        Ok(Self { bytes, range })
    }

    /// Take ownership of decoded bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::new(bytes.into())
    }

    /// Take ownership of decoded native pixels.
    pub fn from_colors(pixels: &[Color32]) -> Self {
        Self::new(Arc::from(bytemuck::cast_slice::<Color32, u8>(pixels)))
    }

    /// Image bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[self.range.clone()]
    }

    /// Image bytes viewed as native pixels.
    pub fn as_colors(&self) -> ImgpipeResult<&[Color32]> {
        bytemuck::try_cast_slice(self.as_bytes()).map_err(|e| {
            ImgpipeError::validation(format!(
                "{} pixel bytes are not whole 32-bit pixels: {e}",
                self.range.len()
            ))
        })
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Return `true` when no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Return `true` when this view points into `bytes`.
    pub fn shares(&self, bytes: &Arc<[u8]>) -> bool {
        Arc::ptr_eq(&self.bytes, bytes)
    }
}

/// Lifecycle state of a decode descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No decoder bound.
    #[default]
    Closed,
    /// Scanning the registry.
    Accepting,
    /// Bound decoder's open is running.
    Opening,
    /// Open with a full pixel buffer in `img_data`.
    Buffered,
    /// Open without a pixel buffer; pixels come from `read_line`.
    Streaming,
}

impl SessionState {
    /// Return `true` in [`SessionState::Buffered`] and [`SessionState::Streaming`].
    pub fn is_open(self) -> bool {
        matches!(self, Self::Buffered | Self::Streaming)
    }
}

/// Session record for one source.
///
/// Decoders fill `header`, `img_data`, `caps` and optionally `error_msg` from their `open`, and
/// keep per-stream state in the [`DecodeContext`].
#[derive(Debug, Default)]
pub struct DecodeDescriptor {
    input: DecodeInput,
    pub(crate) decoder: Option<DecoderId>,
    pub(crate) state: SessionState,
    pub(crate) open_tick_ms: u32,
    /// Wall time spent in the most recent decoder open.
    pub time_to_open: Duration,
    /// Output header.
    pub header: ImageHeader,
    /// Full pixel buffer, `None` for streaming decoders.
    pub img_data: Option<PixelData>,
    /// Capabilities reported for this source.
    pub caps: DecoderCaps,
    /// Human readable message left by a failing decoder.
    pub error_msg: Option<String>,
    /// Animation and streaming state.
    pub ctx: Option<DecodeContext>,
}

impl DecodeDescriptor {
    /// Descriptor for `source` with default input parameters.
    pub fn new(source: ImageSource) -> Self {
        Self::from_input(DecodeInput::new(source))
    }

    /// Descriptor for a fully specified input.
    pub fn from_input(input: DecodeInput) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    /// Set the tint for alpha-only images.
    pub fn with_color(mut self, color: Color32) -> Self {
        self.input.color = color;
        self
    }

    /// Set the raster size hint for vector sources.
    pub fn with_size_hint(mut self, w: i32, h: i32) -> Self {
        self.input.size_hint = Some(Point::new(w, h));
        self
    }

    /// Supply a caller-owned context. The session never drops it.
    pub fn with_context(mut self, ctx: DecodeContext) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Decode input.
    pub fn input(&self) -> &DecodeInput {
        &self.input
    }

    /// Rebind the descriptor to a new input. Only allowed while closed.
    pub fn set_input(&mut self, input: DecodeInput) -> ImgpipeResult<()> {
        if self.state != SessionState::Closed {
            return Err(ImgpipeError::misuse(format!(
                "cannot rebind input while session is {:?}",
                self.state
            )));
        }
        self.input = input;
        self.header = ImageHeader::default();
        self.caps = DecoderCaps::NONE;
        self.error_msg = None;
        Ok(())
    }

    /// Decoder bound by the last successful accept, while open.
    pub fn decoder(&self) -> Option<DecoderId> {
        self.decoder
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Tick at which the current decoder open started.
    pub fn open_tick_ms(&self) -> u32 {
        self.open_tick_ms
    }

    /// Remove the context after a session has closed.
    pub fn take_context(&mut self) -> ImgpipeResult<Option<DecodeContext>> {
        if self.state != SessionState::Closed {
            return Err(ImgpipeError::misuse(
                "cannot take the decode context of an open session",
            ));
        }
        Ok(self.ctx.take())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decoder/descriptor.rs"]
mod tests;
