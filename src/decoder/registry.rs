use std::sync::Arc;

use crate::decoder::callback::{AcceptFn, CallbackDecoder, CloseFn, OpenFn, ReadLineFn};
use crate::decoder::caps::DecoderCaps;
use crate::decoder::descriptor::DecodeDescriptor;
use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::foundation::platform::{MonotonicTicks, TickSource};
use crate::source::image_source::ImageSource;

/// Handle of a registered decoder. Never reused within one registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct DecoderId(u32);

impl DecoderId {
    /// Numeric value, in registration order.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// How the registry treats a decoder while scanning for an accepting one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptMode {
    /// Ask [`ImageDecoder::accept`].
    Probe,
    /// Bind without a successful probe; `accept` only supplies capabilities.
    Always,
    /// Never bound by a registry scan.
    Never,
}

/// Optional operations a decoder provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderFeatures {
    /// Accept behavior during registry scans.
    pub accept: AcceptMode,
    /// Whether [`ImageDecoder::read_line`] is implemented. Without it, open must produce a full
    /// pixel buffer.
    pub read_line: bool,
}

impl Default for DecoderFeatures {
    fn default() -> Self {
        Self {
            accept: AcceptMode::Probe,
            read_line: false,
        }
    }
}

/// What an open request should produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenFlags {
    /// Header plus pixels (or line access).
    #[default]
    Full,
    /// Header only. The session closes right after.
    MetaOnly,
}

/// Decoder plugin contract.
///
/// Decoders are stateless between calls; anything that must survive from `open` to `read_line`
/// or `close` lives in the descriptor's [`DecodeContext`](crate::DecodeContext).
pub trait ImageDecoder {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Optional operations this decoder provides.
    fn features(&self) -> DecoderFeatures {
        DecoderFeatures::default()
    }

    /// Whether the mandatory operations are available.
    fn is_ready(&self) -> bool {
        true
    }

    /// Return the capabilities for `src` if this decoder can handle it. May be costly (e.g. a
    /// file probe) but must not keep state.
    fn accept(&self, src: &ImageSource) -> Option<DecoderCaps>;

    /// Fill `dsc.header` and either `dsc.img_data` or line access. Called again on an open
    /// descriptor to advance animation frames.
    fn open(&self, dsc: &mut DecodeDescriptor, flags: OpenFlags) -> ImgpipeResult<()>;

    /// Decode `len` pixels of row `y` starting at `x` into `buf`, formatted as `dsc.header.cf`.
    fn read_line(
        &self,
        _dsc: &mut DecodeDescriptor,
        _x: u32,
        _y: u32,
        _len: u32,
        _buf: &mut [u8],
    ) -> ImgpipeResult<()> {
        Err(ImgpipeError::read_line(format!(
            "decoder '{}' does not support read_line",
            self.name()
        )))
    }

    /// Release decoder-private state of an open descriptor.
    fn close(&self, dsc: &mut DecodeDescriptor);

    /// Return `true` for the built-in raw blob decoder.
    fn is_raw(&self) -> bool {
        false
    }
}

enum Slot {
    Boxed(Box<dyn ImageDecoder>),
    Callbacks(CallbackDecoder),
}

struct Entry {
    id: DecoderId,
    slot: Slot,
    always: bool,
}

impl Entry {
    fn decoder(&self) -> &dyn ImageDecoder {
        match &self.slot {
            Slot::Boxed(d) => d.as_ref(),
            Slot::Callbacks(d) => d,
        }
    }
}

/// Insertion-ordered decoder collection. Earlier registrations are tried first.
pub struct DecoderRegistry {
    entries: Vec<Entry>,
    next_id: u32,
    pub(crate) ticks: Arc<dyn TickSource>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderRegistry {
    /// Empty registry using [`MonotonicTicks`].
    pub fn new() -> Self {
        Self::with_ticks(Arc::new(MonotonicTicks::default()))
    }

    /// Empty registry using a custom tick source.
    pub fn with_ticks(ticks: Arc<dyn TickSource>) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            ticks,
        }
    }

    fn push(&mut self, slot: Slot) -> DecoderId {
        let id = DecoderId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            slot,
            always: false,
        });
        id
    }

    /// Append a decoder implementation.
    pub fn register(&mut self, decoder: Box<dyn ImageDecoder>) -> DecoderId {
        let id = self.push(Slot::Boxed(decoder));
        tracing::debug!(id = id.0, "registered decoder");
        id
    }

    /// Append an empty closure-based decoder. Bind its operations with the `set_*_cb` methods;
    /// it is skipped until both open and close are set.
    pub fn create(&mut self, name: impl Into<String>) -> DecoderId {
        self.push(Slot::Callbacks(CallbackDecoder::new(name)))
    }

    fn callbacks_mut(&mut self, id: DecoderId) -> ImgpipeResult<&mut CallbackDecoder> {
        match self.entries.iter_mut().find(|e| e.id == id).map(|e| &mut e.slot) {
            Some(Slot::Callbacks(d)) => Ok(d),
            Some(Slot::Boxed(_)) => Err(ImgpipeError::validation(format!(
                "decoder {} was not created with callbacks",
                id.0
            ))),
            None => Err(ImgpipeError::validation(format!("unknown decoder {}", id.0))),
        }
    }

    /// Bind the accept operation of a closure-based decoder.
    pub fn set_accept_cb(&mut self, id: DecoderId, f: AcceptFn) -> ImgpipeResult<()> {
        self.callbacks_mut(id)?.accept = Some(f);
        Ok(())
    }

    /// Bind the open operation of a closure-based decoder.
    pub fn set_open_cb(&mut self, id: DecoderId, f: OpenFn) -> ImgpipeResult<()> {
        self.callbacks_mut(id)?.open = Some(f);
        Ok(())
    }

    /// Bind the read-line operation of a closure-based decoder.
    pub fn set_read_line_cb(&mut self, id: DecoderId, f: ReadLineFn) -> ImgpipeResult<()> {
        self.callbacks_mut(id)?.read_line = Some(f);
        Ok(())
    }

    /// Bind the close operation of a closure-based decoder.
    pub fn set_close_cb(&mut self, id: DecoderId, f: CloseFn) -> ImgpipeResult<()> {
        self.callbacks_mut(id)?.close = Some(f);
        Ok(())
    }

    /// Mark a decoder as always considered during scans, even without a successful probe.
    pub fn accept_always(&mut self, id: DecoderId) -> ImgpipeResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ImgpipeError::validation(format!("unknown decoder {}", id.0)))?;
        entry.always = true;
        Ok(())
    }

    /// Remove a decoder. Descriptors still bound to it close without calling its `close`.
    pub fn delete(&mut self, id: DecoderId) -> ImgpipeResult<()> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| ImgpipeError::validation(format!("unknown decoder {}", id.0)))?;
        self.entries.remove(idx);
        Ok(())
    }

    /// Look up a decoder.
    pub fn get(&self, id: DecoderId) -> Option<&dyn ImageDecoder> {
        self.entries.iter().find(|e| e.id == id).map(Entry::decoder)
    }

    /// Number of registered decoders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return `true` when `id` is the raw blob decoder.
    pub fn is_raw(&self, id: DecoderId) -> bool {
        self.get(id).is_some_and(|d| d.is_raw())
    }

    /// Registered decoder ids, in scan order.
    pub fn ids(&self) -> Vec<DecoderId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Registered decoder names, in scan order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.decoder().name()).collect()
    }

    /// Find the first decoder, in registration order, that accepts `src`.
    #[tracing::instrument(skip(self, src), fields(source = %src))]
    pub fn find_accepting(&self, src: &ImageSource) -> Option<(DecoderId, DecoderCaps)> {
        for entry in &self.entries {
            let decoder = entry.decoder();
            if !decoder.is_ready() {
                continue;
            }
            let mode = if entry.always {
                AcceptMode::Always
            } else {
                decoder.features().accept
            };
            let caps = match mode {
                AcceptMode::Never => continue,
                AcceptMode::Probe => match decoder.accept(src) {
                    Some(caps) => caps,
                    None => continue,
                },
                AcceptMode::Always => decoder.accept(src).unwrap_or_default(),
            };
            tracing::debug!(decoder = decoder.name(), ?caps, "decoder accepted source");
            return Some((entry.id, caps));
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decoder/registry.rs"]
mod tests;
