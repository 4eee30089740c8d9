/// Convenience result type used across imgpipe.
pub type ImgpipeResult<T> = Result<T, ImgpipeError>;

/// Error taxonomy shared by image sources, decoders, sessions and the compositor.
///
/// Nothing here is fatal to the process: the worst outcome of any failure is a blank or
/// placeholder image on screen.
#[derive(thiserror::Error, Debug)]
pub enum ImgpipeError {
    /// A raw source could not be classified into a known source variant.
    #[error("unrecognized image source: {0}")]
    SourceUnrecognized(String),

    /// Every registered decoder declined the source.
    #[error("no decoder accepts source: {0}")]
    NoAcceptingDecoder(String),

    /// The bound decoder failed to open the image. The session has already been closed.
    #[error("decoder '{decoder}' failed to open image: {message}")]
    OpenFailed {
        /// Name of the decoder that failed.
        decoder: String,
        /// Decoder-supplied message (or the underlying error text).
        message: String,
    },

    /// Memory could not be reserved for an owned copy or a decode buffer.
    #[error("allocation failed: {0}")]
    AllocationFailed(String),

    /// A streaming `read_line` request failed. The session stays open.
    #[error("read line failed: {0}")]
    ReadLineFailed(String),

    /// The decode session state machine was driven in an unsupported order.
    #[error("invalid session use: {0}")]
    Misuse(String),

    /// Invalid caller-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImgpipeError {
    /// Build a [`ImgpipeError::SourceUnrecognized`] value.
    pub fn source_unrecognized(msg: impl Into<String>) -> Self {
        Self::SourceUnrecognized(msg.into())
    }

    /// Build a [`ImgpipeError::NoAcceptingDecoder`] value.
    pub fn no_accepting_decoder(msg: impl Into<String>) -> Self {
        Self::NoAcceptingDecoder(msg.into())
    }

    /// Build a [`ImgpipeError::OpenFailed`] value.
    pub fn open_failed(decoder: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OpenFailed {
            decoder: decoder.into(),
            message: message.into(),
        }
    }

    /// Build a [`ImgpipeError::AllocationFailed`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::AllocationFailed(msg.into())
    }

    /// Build a [`ImgpipeError::ReadLineFailed`] value.
    pub fn read_line(msg: impl Into<String>) -> Self {
        Self::ReadLineFailed(msg.into())
    }

    /// Build a [`ImgpipeError::Misuse`] value.
    pub fn misuse(msg: impl Into<String>) -> Self {
        Self::Misuse(msg.into())
    }

    /// Build a [`ImgpipeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
