//! Byte sources feeding the stream driver.

pub mod capture;

pub use capture::{CaptureFileSource, CaptureFormat, ReaderSource};

use thiserror::Error;

/// Yields raw link bytes in chunks of arbitrary size.
pub trait ByteSource {
    /// Next chunk, or `None` once the source is exhausted. Chunks are never empty.
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        (**self).next_chunk()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture error: {0}")]
    Capture(String),
}

impl From<capture::error::CaptureSourceError> for SourceError {
    fn from(value: capture::error::CaptureSourceError) -> Self {
        match value {
            capture::error::CaptureSourceError::Io(err) => SourceError::Io(err),
            other => SourceError::Capture(other.to_string()),
        }
    }
}
