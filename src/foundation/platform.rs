//! Collaborator interfaces consumed by the decoding core: file access, monotonic ticks and text
//! measurement. The defaults here are thin `std` implementations.

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;

use crate::foundation::error::{ImgpipeError, ImgpipeResult};

/// Path-based byte access for file sources.
pub trait SourceFs {
    /// Read a whole file.
    fn read_all(&self, path: &str) -> ImgpipeResult<Vec<u8>>;

    /// Fill `buf` with bytes starting at `offset`. Short files are an error.
    fn read_at(&self, path: &str, offset: u64, buf: &mut [u8]) -> ImgpipeResult<()>;

    /// Read at most `max` bytes from the start of a file.
    fn read_prefix(&self, path: &str, max: usize) -> ImgpipeResult<Vec<u8>>;

    /// Resolve a source path to a local path for tools that need one (e.g. `ffprobe`).
    fn local_path(&self, path: &str) -> Option<PathBuf>;
}

/// [`SourceFs`] backed by `std::fs`, resolving relative paths against `root`.
#[derive(Clone, Debug, Default)]
pub struct StdFs {
    root: Option<PathBuf>,
}

impl StdFs {
    /// Resolve paths as given.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> ImgpipeResult<PathBuf> {
        if path.is_empty() {
            return Err(ImgpipeError::validation("file path is empty"));
        }
        let p = Path::new(path);
        Ok(match &self.root {
            Some(root) if p.is_relative() => root.join(p),
            _ => p.to_path_buf(),
        })
    }
}

impl SourceFs for StdFs {
    fn read_all(&self, path: &str) -> ImgpipeResult<Vec<u8>> {
        let full = self.resolve(path)?;
        let bytes =
            std::fs::read(&full).with_context(|| format!("read '{}'", full.display()))?;
        Ok(bytes)
    }

    fn read_at(&self, path: &str, offset: u64, buf: &mut [u8]) -> ImgpipeResult<()> {
        let full = self.resolve(path)?;
        let mut f =
            std::fs::File::open(&full).with_context(|| format!("open '{}'", full.display()))?;
        f.seek(SeekFrom::Start(offset))
            .with_context(|| format!("seek '{}' to {offset}", full.display()))?;
        f.read_exact(buf)
            .with_context(|| format!("read {} bytes from '{}'", buf.len(), full.display()))?;
        Ok(())
    }

    fn read_prefix(&self, path: &str, max: usize) -> ImgpipeResult<Vec<u8>> {
        let full = self.resolve(path)?;
        let f =
            std::fs::File::open(&full).with_context(|| format!("open '{}'", full.display()))?;
        let mut out = Vec::with_capacity(max);
        f.take(max as u64)
            .read_to_end(&mut out)
            .with_context(|| format!("read head of '{}'", full.display()))?;
        Ok(out)
    }

    fn local_path(&self, path: &str) -> Option<PathBuf> {
        self.resolve(path).ok()
    }
}

/// Monotonic millisecond tick source used to stamp frame renders.
pub trait TickSource {
    /// Milliseconds since an arbitrary fixed origin. Wraps on overflow.
    fn now_ms(&self) -> u32;
}

/// [`TickSource`] backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicTicks {
    origin: Instant,
}

impl Default for MonotonicTicks {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TickSource for MonotonicTicks {
    fn now_ms(&self) -> u32 {
        self.origin.elapsed().as_millis() as u32
    }
}

/// Text measurement used to size symbol sources.
pub trait TextMeasure {
    /// Return `(width, height)` in pixels of `text` rendered on as many lines as it contains.
    fn measure(&self, text: &str) -> (u32, u32);
}

/// Measures every character with the same advance.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvanceMeasure {
    /// Horizontal advance per character.
    pub advance: u32,
    /// Height of one line.
    pub line_height: u32,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self {
            advance: 8,
            line_height: 16,
        }
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn measure(&self, text: &str) -> (u32, u32) {
        if text.is_empty() {
            return (0, 0);
        }
        let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
        let lines = text.lines().count().max(1) as u32;
        (
            widest.saturating_mul(self.advance),
            lines.saturating_mul(self.line_height),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/platform.rs"]
mod tests;
