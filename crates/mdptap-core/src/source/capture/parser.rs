use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::source::{ByteSource, SourceError};

use super::error::CaptureSourceError;
use super::reader::{is_hex_path, parse_hex_capture, read_chunk};

/// On-disk encoding of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFormat {
    /// Link bytes as read from the device.
    Raw,
    /// Hex digits, whitespace ignored, `#` comments.
    Hex,
}

impl CaptureFormat {
    /// `Hex` for `.hex`/`.txt` files, `Raw` otherwise.
    pub fn from_path(path: &Path) -> Self {
        if is_hex_path(path) {
            CaptureFormat::Hex
        } else {
            CaptureFormat::Raw
        }
    }
}

/// Reads fixed-size chunks from any reader; the last chunk may be shorter.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, chunk_size: usize) -> Result<Self, SourceError> {
        if chunk_size == 0 {
            return Err(CaptureSourceError::InvalidChunkSize.into());
        }
        Ok(Self { reader, chunk_size })
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let mut chunk = vec![0u8; self.chunk_size];
        let read = read_chunk(&mut self.reader, &mut chunk)?;
        if read == 0 {
            return Ok(None);
        }
        chunk.truncate(read);
        Ok(Some(chunk))
    }
}

/// A capture file replayed in chunks.
pub struct CaptureFileSource {
    format: CaptureFormat,
    inner: CaptureReader,
}

enum CaptureReader {
    Raw(ReaderSource<File>),
    Hex(ReaderSource<Cursor<Vec<u8>>>),
}

impl CaptureFileSource {
    /// Open `path`, picking the format from its extension.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, SourceError> {
        Self::open_with_format(path, CaptureFormat::from_path(path), chunk_size)
    }

    pub fn open_with_format(
        path: &Path,
        format: CaptureFormat,
        chunk_size: usize,
    ) -> Result<Self, SourceError> {
        let inner = create_reader(path, format, chunk_size)?;
        Ok(Self { format, inner })
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }
}

impl ByteSource for CaptureFileSource {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        match &mut self.inner {
            CaptureReader::Raw(source) => source.next_chunk(),
            CaptureReader::Hex(source) => source.next_chunk(),
        }
    }
}

fn create_reader(
    path: &Path,
    format: CaptureFormat,
    chunk_size: usize,
) -> Result<CaptureReader, SourceError> {
    match format {
        CaptureFormat::Raw => {
            let file = File::open(path)?;
            Ok(CaptureReader::Raw(ReaderSource::new(file, chunk_size)?))
        }
        CaptureFormat::Hex => {
            let text = fs::read_to_string(path)?;
            let bytes = parse_hex_capture(&text)?;
            Ok(CaptureReader::Hex(ReaderSource::new(
                Cursor::new(bytes),
                chunk_size,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use super::{CaptureFormat, ReaderSource};
    use crate::source::{ByteSource, SourceError};

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            CaptureFormat::from_path(Path::new("a.hex")),
            CaptureFormat::Hex
        );
        assert_eq!(
            CaptureFormat::from_path(Path::new("a.bin")),
            CaptureFormat::Raw
        );
    }

    #[test]
    fn reader_source_splits_into_chunks() {
        let mut source = ReaderSource::new(Cursor::new(vec![1u8, 2, 3, 4, 5]), 2).unwrap();
        let mut chunks = Vec::new();
        while let Some(chunk) = source.next_chunk().unwrap() {
            chunks.push(chunk);
        }
        assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = ReaderSource::new(Cursor::new(Vec::<u8>::new()), 0).unwrap_err();
        assert!(matches!(err, SourceError::Capture(_)));
    }
}
