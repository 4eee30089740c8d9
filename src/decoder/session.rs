//! Decode session state machine: accept, open, buffered or streaming access, close.

use std::time::Instant;

use crate::decoder::context::DecodeContext;
use crate::decoder::descriptor::{DecodeDescriptor, PixelData, SessionState};
use crate::decoder::registry::{DecoderRegistry, ImageDecoder, OpenFlags};
use crate::foundation::core::ImageHeader;
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::source::image_source::ImageSource;

impl DecoderRegistry {
    /// Open `dsc` with the first accepting decoder.
    ///
    /// On an already open descriptor this re-runs the bound decoder's open, which is how
    /// animated sources advance: set `ctx.current_frame` first. `MetaOnly` requests fill the
    /// header and leave the descriptor closed.
    #[tracing::instrument(skip(self, dsc), fields(source = %dsc.input().source))]
    pub fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        match dsc.state {
            SessionState::Closed => self.open_fresh(dsc, flags),
            SessionState::Buffered | SessionState::Streaming => {
                if flags == OpenFlags::MetaOnly {
                    return Err(ImgpipeError::misuse(
                        "metadata-only open on a session that is already open",
                    ));
                }
                self.reopen(dsc)
            }
            SessionState::Accepting | SessionState::Opening => Err(ImgpipeError::misuse(
                format!("open re-entered while {:?}", dsc.state),
            )),
        }
    }

    fn open_fresh(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()> {
        dsc.state = SessionState::Accepting;
        let Some((id, caps)) = self.find_accepting(&dsc.input().source) else {
            dsc.state = SessionState::Closed;
            dsc.caps = Default::default();
            return Err(ImgpipeError::no_accepting_decoder(
                dsc.input().source.to_string(),
            ));
        };
        let decoder = self
            .get(id)
            .ok_or_else(|| ImgpipeError::misuse("accepted decoder disappeared"))?;

        dsc.decoder = Some(id);
        dsc.caps = caps;
        dsc.header = ImageHeader::default();
        dsc.img_data = None;
        dsc.error_msg = None;
        dsc.state = SessionState::Opening;
        if dsc.ctx.is_none() {
            dsc.ctx = Some(DecodeContext::session_owned());
        }

        self.run_open(decoder, dsc, flags)?;

        if flags == OpenFlags::MetaOnly {
            self.close(dsc);
            return Ok(());
        }
        self.settle(decoder, dsc)
    }

    fn reopen(&self, dsc: &mut DecodeDescriptor) -> ImgpipeResult<()> {
        let decoder = dsc
            .decoder
            .and_then(|id| self.get(id))
            .ok_or_else(|| ImgpipeError::misuse("bound decoder is no longer registered"))?;
        if let Some(ctx) = &dsc.ctx {
            tracing::trace!(frame = ctx.current_frame, "advancing frame");
        }
        self.run_open(decoder, dsc, OpenFlags::Full)?;
        self.settle(decoder, dsc)
    }

    fn run_open(
        &self,
        decoder: &dyn ImageDecoder,
        dsc: &mut DecodeDescriptor,
        flags: OpenFlags,
    ) -> ImgpipeResult<()> {
        dsc.open_tick_ms = self.ticks.now_ms();
        let started = Instant::now();
        let res = decoder.open(dsc, flags);
        dsc.time_to_open = started.elapsed();

        if let Err(e) = res {
            let message = dsc.error_msg.clone().unwrap_or_else(|| e.to_string());
            tracing::warn!(decoder = decoder.name(), %message, "decoder open failed");
            self.close(dsc);
            return Err(ImgpipeError::open_failed(decoder.name(), message));
        }
        Ok(())
    }

    fn settle(&self, decoder: &dyn ImageDecoder, dsc: &mut DecodeDescriptor) -> ImgpipeResult<()> {
        let fail = |this: &Self, dsc: &mut DecodeDescriptor, message: String| -> ImgpipeResult<()> {
            tracing::warn!(decoder = decoder.name(), %message, "decoder open produced no usable output");
            dsc.error_msg = Some(message.clone());
            this.close(dsc);
            Err(ImgpipeError::open_failed(decoder.name(), message))
        };

        match &dsc.img_data {
            Some(px) => {
                let need = dsc.header.byte_len();
                if px.len() < need {
                    let message = format!(
                        "pixel buffer holds {} bytes, header {}x{} {:?} needs {need}",
                        px.len(),
                        dsc.header.w,
                        dsc.header.h,
                        dsc.header.cf
                    );
                    return fail(self, dsc, message);
                }
                dsc.state = SessionState::Buffered;
            }
            None if decoder.features().read_line => dsc.state = SessionState::Streaming,
            None => {
                return fail(
                    self,
                    dsc,
                    "no pixel buffer and no read_line support".to_owned(),
                );
            }
        }
        Ok(())
    }

    /// Decode `len` pixels of row `y` starting at `x` from a streaming session into `buf`.
    ///
    /// Buffered sessions reject this call: their pixels are in `img_data`.
    pub fn read_line(
        &self,
        dsc: &mut DecodeDescriptor,
        x: u32,
        y: u32,
        len: u32,
        buf: &mut [u8],
    ) -> ImgpipeResult<()> {
        match dsc.state {
            SessionState::Streaming => {}
            SessionState::Buffered => {
                return Err(ImgpipeError::misuse(
                    "read_line on a buffered session; read img_data instead",
                ));
            }
            state => {
                return Err(ImgpipeError::misuse(format!(
                    "read_line on a session that is {state:?}"
                )));
            }
        }

        let h = dsc.header;
        if y >= h.h || u64::from(x) + u64::from(len) > u64::from(h.w) {
            return Err(ImgpipeError::read_line(format!(
                "{len} pixels at ({x}, {y}) outside {}x{} image",
                h.w, h.h
            )));
        }
        let need = len as usize * h.cf.bytes_per_pixel();
        if buf.len() < need {
            return Err(ImgpipeError::read_line(format!(
                "line buffer holds {} bytes, {need} needed",
                buf.len()
            )));
        }

        let decoder = dsc
            .decoder
            .and_then(|id| self.get(id))
            .ok_or_else(|| ImgpipeError::misuse("bound decoder is no longer registered"))?;
        decoder
            .read_line(dsc, x, y, len, &mut buf[..need])
            .map_err(|e| match e {
                ImgpipeError::ReadLineFailed(_) => e,
                other => ImgpipeError::read_line(other.to_string()),
            })
    }

    /// Close `dsc`: run the bound decoder's close once and drop the context if the session
    /// allocated it. Safe to call on a closed descriptor.
    pub fn close(&self, dsc: &mut DecodeDescriptor) {
        if let Some(id) = dsc.decoder {
            match self.get(id) {
                Some(decoder) => decoder.close(dsc),
                None => tracing::warn!(id = id.get(), "closing descriptor of a deleted decoder"),
            }
        }
        dsc.decoder = None;
        if dsc.ctx.as_ref().is_some_and(DecodeContext::is_auto_allocated) {
            dsc.ctx = None;
        }
        dsc.img_data = None;
        dsc.state = SessionState::Closed;
    }

    /// Header of `src`, via a metadata-only open.
    #[tracing::instrument(skip(self, src), fields(source = %src))]
    pub fn get_info(&self, src: &ImageSource) -> ImgpipeResult<ImageHeader> {
        let mut dsc = DecodeDescriptor::new(src.clone());
        self.open(&mut dsc, OpenFlags::MetaOnly)?;
        Ok(dsc.header)
    }
}

/// Open descriptor tied to a registry. Closes on drop.
pub struct DecodeSession<'r> {
    registry: &'r DecoderRegistry,
    dsc: DecodeDescriptor,
}

impl<'r> DecodeSession<'r> {
    /// Fully open `dsc`.
    pub fn open(registry: &'r DecoderRegistry, mut dsc: DecodeDescriptor) -> ImgpipeResult<Self> {
        registry.open(&mut dsc, OpenFlags::Full)?;
        Ok(Self { registry, dsc })
    }

    /// Request frame `frame` of an animated source.
    pub fn advance_to(&mut self, frame: u32) -> ImgpipeResult<()> {
        if !self.dsc.state.is_open() {
            return Err(ImgpipeError::misuse("advance on a closed session"));
        }
        let ctx = self
            .dsc
            .ctx
            .as_mut()
            .ok_or_else(|| ImgpipeError::misuse("open session without a decode context"))?;
        ctx.current_frame = frame;
        self.registry.open(&mut self.dsc, OpenFlags::Full)
    }

    /// See [`DecoderRegistry::read_line`].
    pub fn read_line(&mut self, x: u32, y: u32, len: u32, buf: &mut [u8]) -> ImgpipeResult<()> {
        self.registry.read_line(&mut self.dsc, x, y, len, buf)
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.dsc.state
    }

    /// Output header.
    pub fn header(&self) -> ImageHeader {
        self.dsc.header
    }

    /// Full pixel buffer of a buffered session.
    pub fn pixels(&self) -> Option<&PixelData> {
        self.dsc.img_data.as_ref()
    }

    /// Animation state.
    pub fn context(&self) -> Option<&DecodeContext> {
        self.dsc.ctx.as_ref()
    }

    /// Underlying descriptor.
    pub fn descriptor(&self) -> &DecodeDescriptor {
        &self.dsc
    }

    /// Close and hand the context back (caller-supplied contexts survive close).
    pub fn take_context(&mut self) -> Option<DecodeContext> {
        self.registry.close(&mut self.dsc);
        self.dsc.ctx.take()
    }

    /// Close and return the descriptor for reuse.
    pub fn close(mut self) -> DecodeDescriptor {
        self.registry.close(&mut self.dsc);
        std::mem::take(&mut self.dsc)
    }
}

impl Drop for DecodeSession<'_> {
    fn drop(&mut self) {
        if self.dsc.state != SessionState::Closed {
            self.registry.close(&mut self.dsc);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decoder/session.rs"]
mod tests;
