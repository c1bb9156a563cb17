use std::io::{ErrorKind, Read};
use std::path::Path;

use super::error::CaptureSourceError;
use super::layout;

/// Whether `path` names a hex text capture, judged by its extension.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use mdptap_core::source::capture::reader::is_hex_path;
/// use std::path::Path;
///
/// assert!(is_hex_path(Path::new("link.HEX")));
/// assert!(!is_hex_path(Path::new("link.bin")));
/// ```
pub fn is_hex_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            layout::HEX_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}

/// Decode a hex text capture.
///
/// Whitespace is ignored and `#` comments run to the end of the line. Each
/// line must hold whole bytes.
///
/// # Errors
/// Returns `CaptureSourceError::Hex` with the 1-based line number of the
/// first malformed line.
pub fn parse_hex_capture(text: &str) -> Result<Vec<u8>, CaptureSourceError> {
    let mut bytes = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let content = match line.find(layout::HEX_COMMENT) {
            Some(comment) => &line[..comment],
            None => line,
        };
        let digits: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.is_empty() {
            continue;
        }
        let decoded = hex::decode(&digits).map_err(|err| CaptureSourceError::Hex {
            line: index + 1,
            message: err.to_string(),
        })?;
        bytes.extend_from_slice(&decoded);
    }
    Ok(bytes)
}

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Returns the number of bytes read; zero means the reader is exhausted.
pub fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, CaptureSourceError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(filled)
}
