use std::any::Any;
use std::fmt;

/// Per-session animation and streaming state.
///
/// A context is either supplied by the caller (and then owned by the caller) or allocated by the
/// session on first open, in which case the session also drops it on close. The decoder-private
/// slot belongs to the bound decoder, which clears it in its `close`.
#[derive(Default)]
pub struct DecodeContext {
    /// Frame the caller wants rendered next.
    pub current_frame: u32,
    /// Number of frames in the stream (0 for still images).
    pub total_frames: u32,
    /// Seek target frame.
    pub dest_frame: u32,
    /// Nominal frames per second, 0 when frame delays vary.
    pub frame_rate: u16,
    /// Delay of the current frame in milliseconds.
    pub frame_delay_ms: u32,
    /// Tick of the most recent frame render.
    pub last_render_tick: u32,
    /// Last frame the decoder actually rendered.
    pub last_rendered_frame: Option<u32>,
    auto_allocated: bool,
    private: Option<Box<dyn Any>>,
}

impl DecodeContext {
    /// Empty caller-owned context.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn session_owned() -> Self {
        Self {
            auto_allocated: true,
            ..Self::default()
        }
    }

    /// Return `true` when the session allocated this context and will drop it on close.
    pub fn is_auto_allocated(&self) -> bool {
        self.auto_allocated
    }

    /// Store decoder-private state, replacing any previous value.
    pub fn set_private<T: Any>(&mut self, value: T) {
        self.private = Some(Box::new(value));
    }

    /// Borrow decoder-private state of type `T`.
    pub fn private_ref<T: Any>(&self) -> Option<&T> {
        self.private.as_deref().and_then(|p| p.downcast_ref())
    }

    /// Mutably borrow decoder-private state of type `T`.
    pub fn private_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.private.as_deref_mut().and_then(|p| p.downcast_mut())
    }

    /// Remove decoder-private state.
    pub fn clear_private(&mut self) {
        self.private = None;
    }

    /// Return `true` when a decoder has stored private state.
    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }
}

impl fmt::Debug for DecodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeContext")
            .field("current_frame", &self.current_frame)
            .field("total_frames", &self.total_frames)
            .field("dest_frame", &self.dest_frame)
            .field("frame_rate", &self.frame_rate)
            .field("frame_delay_ms", &self.frame_delay_ms)
            .field("last_render_tick", &self.last_render_tick)
            .field("last_rendered_frame", &self.last_rendered_frame)
            .field("auto_allocated", &self.auto_allocated)
            .field("has_private", &self.private.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decoder/context.rs"]
mod tests;
