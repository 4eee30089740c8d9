use std::sync::Arc;

use crate::decoder::caps::DecoderCaps;
use crate::decoder::descriptor::DecodeDescriptor;
use crate::decoder::registry::{ImageDecoder, OpenFlags};
use crate::foundation::core::{ColorFormat, ImageHeader};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::foundation::platform::TextMeasure;
use crate::source::image_source::ImageSource;

/// Symbol sources. Only their size is decoded; the caller draws them as text.
pub struct SymbolDecoder {
    measure: Arc<dyn TextMeasure>,
}

impl SymbolDecoder {
    /// Create a symbol decoder sizing text with `measure`.
    pub fn new(measure: Arc<dyn TextMeasure>) -> Self {
        Self { measure }
    }
}

impl ImageDecoder for SymbolDecoder {
    fn name(&self) -> &str {
        "symbol"
    }

    fn accept(&self, src: &ImageSource) -> Option<DecoderCaps> {
        matches!(src, ImageSource::Symbol(_)).then_some(DecoderCaps::TRANSPARENT)
    }

    fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        let text = dsc
            .input()
            .source
            .text()
            .ok_or_else(|| ImgpipeError::validation("symbol decoder needs a symbol source"))?;
        let (w, h) = self.measure.measure(text);
        dsc.header = ImageHeader::new(w, h, ColorFormat::Alpha8);
        if flags == OpenFlags::MetaOnly {
            return Ok(());
        }
        dsc.error_msg = Some("symbols have no pixel data; draw them as text".to_owned());
        Err(ImgpipeError::validation("symbol has no pixel data"))
    }

    fn close(&self, _dsc: &mut DecodeDescriptor) {}
}

#[cfg(test)]
#[path = "../../tests/unit/decoders/symbol.rs"]
mod tests;
