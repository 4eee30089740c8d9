use crate::decoder::caps::DecoderCaps;
use crate::decoder::descriptor::DecodeDescriptor;
use crate::decoder::registry::{AcceptMode, DecoderFeatures, ImageDecoder, OpenFlags};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::source::image_source::ImageSource;

/// Closure bound as a decoder's accept operation.
pub type AcceptFn = Box<dyn Fn(&ImageSource) -> Option<DecoderCaps>>;
/// Closure bound as a decoder's open operation.
pub type OpenFn = Box<dyn Fn(&mut DecodeDescriptor, OpenFlags) -> ImgpipeResult<()>>;
/// Closure bound as a decoder's read-line operation: `(dsc, x, y, len, buf)`.
pub type ReadLineFn = Box<dyn Fn(&mut DecodeDescriptor, u32, u32, u32, &mut [u8]) -> ImgpipeResult<()>>;
/// Closure bound as a decoder's close operation.
pub type CloseFn = Box<dyn Fn(&mut DecodeDescriptor)>;

/// Decoder assembled from individually bound closures.
///
/// Missing accept means the decoder is only bound when marked with
/// [`DecoderRegistry::accept_always`](crate::DecoderRegistry::accept_always). Missing read-line
/// means open must produce a full buffer.
pub(crate) struct CallbackDecoder {
    name: String,
    pub(crate) accept: Option<AcceptFn>,
    pub(crate) open: Option<OpenFn>,
    pub(crate) read_line: Option<ReadLineFn>,
    pub(crate) close: Option<CloseFn>,
}

impl CallbackDecoder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accept: None,
            open: None,
            read_line: None,
            close: None,
        }
    }
}

impl ImageDecoder for CallbackDecoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> DecoderFeatures {
        DecoderFeatures {
            accept: if self.accept.is_some() {
                AcceptMode::Probe
            } else {
                AcceptMode::Never
            },
            read_line: self.read_line.is_some(),
        }
    }

    fn is_ready(&self) -> bool {
        self.open.is_some() && self.close.is_some()
    }

    fn accept(&self, src: &ImageSource) -> Option<DecoderCaps> {
        self.accept.as_ref().and_then(|f| f(src))
    }

    fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        let f = self.open.as_ref().ok_or_else(|| {
            ImgpipeError::misuse(format!("decoder '{}' has no open callback", self.name))
        })?;
        f(dsc, flags)
    }

    fn read_line(
        &self,
        dsc: &mut DecodeDescriptor,
        x: u32,
        y: u32,
        len: u32,
        buf: &mut [u8],
    ) -> ImgpipeResult<()> {
        let f = self.read_line.as_ref().ok_or_else(|| {
            ImgpipeError::read_line(format!("decoder '{}' has no read_line callback", self.name))
        })?;
        f(dsc, x, y, len, buf)
    }

    fn close(&self, dsc: &mut DecodeDescriptor) {
        if let Some(f) = &self.close {
            f(dsc);
        }
    }
}
