use std::fmt;
use std::sync::Arc;

use crate::foundation::error::{ImgpipeError, ImgpipeResult};

/// Which variant an [`ImageSource`] currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Empty descriptor.
    Unknown,
    /// Path to a file.
    File,
    /// Caller-provided in-memory bytes.
    Buffer,
    /// Symbol text drawn with a font.
    Symbol,
}

/// What an image is: a file path, an in-memory buffer, or a symbol string.
///
/// File paths and symbols are owned copies. Buffers are shared references: copying a buffer
/// source aliases the same bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ImageSource {
    /// Empty descriptor. This is the state after [`ImageSource::free`].
    #[default]
    Unknown,
    /// File path with its derived extension (text after the last `.` of the file name).
    File {
        /// Owned path text.
        path: String,
        /// Extension without the dot, if the file name has one.
        ext: Option<String>,
    },
    /// In-memory image bytes. Not copied.
    Buffer(Arc<[u8]>),
    /// Owned symbol text.
    Symbol(String),
}

impl ImageSource {
    /// Build a file source.
    pub fn file(path: &str) -> ImgpipeResult<Self> {
        let mut s = Self::Unknown;
        s.set_file(path)?;
        Ok(s)
    }

    /// Build a buffer source. The bytes are shared, not copied.
    pub fn buffer(data: impl Into<Arc<[u8]>>) -> Self {
        Self::Buffer(data.into())
    }

    /// Build a symbol source.
    pub fn symbol(text: &str) -> ImgpipeResult<Self> {
        let mut s = Self::Unknown;
        s.set_symbol(text)?;
        Ok(s)
    }

    /// Replace the descriptor with an owned copy of `path`.
    ///
    /// Previously owned memory is released first. On allocation failure the descriptor is left
    /// empty.
    pub fn set_file(&mut self, path: &str) -> ImgpipeResult<()> {
        self.free();
        let path = alloc_owned(path)?;
        let ext = derive_extension(&path);
        *self = Self::File { path, ext };
        Ok(())
    }

    /// Replace the descriptor with a shared reference to `data`.
    pub fn set_buffer(&mut self, data: impl Into<Arc<[u8]>>) {
        self.free();
        *self = Self::Buffer(data.into());
    }

    /// Replace the descriptor with an owned copy of `text`.
    pub fn set_symbol(&mut self, text: &str) -> ImgpipeResult<()> {
        self.free();
        let text = alloc_owned(text)?;
        *self = Self::Symbol(text);
        Ok(())
    }

    /// Make `self` a copy of `src`: owned variants are deep-copied (the file extension is derived
    /// again from the copy), buffers are aliased.
    pub fn copy_from(&mut self, src: &ImageSource) -> ImgpipeResult<()> {
        match src {
            Self::Unknown => {
                self.free();
                Ok(())
            }
            Self::File { path, .. } => self.set_file(path),
            Self::Buffer(data) => {
                self.set_buffer(Arc::clone(data));
                Ok(())
            }
            Self::Symbol(text) => self.set_symbol(text),
        }
    }

    /// Release owned memory and reset to [`ImageSource::Unknown`]. Idempotent.
    pub fn free(&mut self) {
        *self = Self::Unknown;
    }

    /// Active variant.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Unknown => SourceKind::Unknown,
            Self::File { .. } => SourceKind::File,
            Self::Buffer(_) => SourceKind::Buffer,
            Self::Symbol(_) => SourceKind::Symbol,
        }
    }

    /// Raw bytes behind the source: path or symbol text, or the buffer itself.
    pub fn uri(&self) -> &[u8] {
        match self {
            Self::Unknown => &[],
            Self::File { path, .. } => path.as_bytes(),
            Self::Buffer(data) => data,
            Self::Symbol(text) => text.as_bytes(),
        }
    }

    /// Length of [`ImageSource::uri`].
    pub fn uri_len(&self) -> usize {
        self.uri().len()
    }

    /// File path, for file sources.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::File { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Derived file extension, for file sources.
    pub fn extension(&self) -> Option<&str> {
        match self {
            Self::File { ext, .. } => ext.as_deref(),
            _ => None,
        }
    }

    /// Shared bytes, for buffer sources.
    pub fn data(&self) -> Option<&Arc<[u8]>> {
        match self {
            Self::Buffer(data) => Some(data),
            _ => None,
        }
    }

    /// Symbol text, for symbol sources.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Symbol(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "<unknown>"),
            Self::File { path, .. } => write!(f, "file '{path}'"),
            Self::Buffer(data) => write!(f, "buffer ({} bytes)", data.len()),
            Self::Symbol(text) => write!(f, "symbol {text:?}"),
        }
    }
}

fn alloc_owned(s: &str) -> ImgpipeResult<String> {
    let mut out = String::new();
    out.try_reserve_exact(s.len()).map_err(|e| {
        ImgpipeError::allocation(format!("copy of {} byte source string: {e}", s.len()))
    })?;
    out.push_str(s);
    Ok(out)
}

fn derive_extension(path: &str) -> Option<String> {
    let name_start = path.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let name = &path[name_start..];
    let dot = name.rfind('.')?;
    let ext = &name[dot + 1..];
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_owned())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/image_source.rs"]
mod tests;
