use crate::foundation::core::Color32;

/// Default scratch width when no override is set.
pub const DEFAULT_SCRATCH_WIDTH: usize = 800;
/// Default scratch height when no override is set.
pub const DEFAULT_SCRATCH_HEIGHT: usize = 480;

/// Compositor configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositorOpts {
    /// Widest display area the scratch buffer is sized for up front.
    pub max_width: usize,
    /// Tallest display area the scratch buffer is sized for up front.
    pub max_height: usize,
}

impl Default for CompositorOpts {
    /// Defaults, overridable with `IMGPIPE_SCRATCH_WIDTH` and `IMGPIPE_SCRATCH_HEIGHT`.
    fn default() -> Self {
        Self {
            max_width: env_dim("IMGPIPE_SCRATCH_WIDTH").unwrap_or(DEFAULT_SCRATCH_WIDTH),
            max_height: env_dim("IMGPIPE_SCRATCH_HEIGHT").unwrap_or(DEFAULT_SCRATCH_HEIGHT),
        }
    }
}

impl CompositorOpts {
    /// Size the scratch buffer for a `w` x `h` display.
    pub fn with_max_size(mut self, w: usize, h: usize) -> Self {
        self.max_width = w;
        self.max_height = h;
        self
    }

    /// Pixels reserved up front.
    pub fn capacity(&self) -> usize {
        self.max_width.saturating_mul(self.max_height)
    }
}

fn env_dim(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Reusable intermediate buffer for two-pass blits.
///
/// Owned by whoever owns the [`Compositor`](crate::Compositor); one blit at a time may use it.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    pixels: Vec<Color32>,
}

impl ScratchBuffer {
    /// Buffer with room for `capacity` pixels.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pixels: vec![Color32::default(); capacity],
        }
    }

    /// Pixels currently held.
    pub fn capacity(&self) -> usize {
        self.pixels.len()
    }

    /// Borrow `len` pixels, growing the buffer when a request exceeds it.
    pub fn ensure(&mut self, len: usize) -> &mut [Color32] {
        if self.pixels.len() < len {
            tracing::debug!(from = self.pixels.len(), to = len, "growing blit scratch buffer");
            self.pixels.resize(len, Color32::default());
        }
        &mut self.pixels[..len]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/scratch.rs"]
mod tests;
