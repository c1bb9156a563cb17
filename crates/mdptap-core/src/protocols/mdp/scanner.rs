use tracing::trace;

use super::error::DecodeError;
use super::layout;
use super::parser::{StructuralPacket, decode_packet};
use super::reader::MdpReader;
use super::types::PackKind;
use crate::config::{DecoderConfig, WaveLengthPolicy};

/// One complete frame, borrowed from the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub kind: PackKind,
    /// Total frame length including the header.
    pub declared_length: u8,
    pub payload: &'a [u8],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame<'a> {
    pub frame: Frame<'a>,
    pub packet: StructuralPacket,
}

/// Outcome of a single scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent<'a> {
    /// A frame was found at `offset` and decoded.
    Frame {
        offset: usize,
        decoded: DecodedFrame<'a>,
    },
    /// No marker in the buffer; nothing consumed.
    NoMarker,
    /// A marker at `offset` awaits more bytes; nothing consumed.
    /// `declared_length` is `None` while the length byte itself is missing.
    Incomplete {
        offset: usize,
        declared_length: Option<u8>,
    },
    /// The candidate at `offset` failed to decode; only its marker was consumed.
    Resync { offset: usize, error: DecodeError },
    /// The candidate at `offset` was dropped whole under `WaveLengthPolicy::Skip`.
    Skipped { offset: usize, error: DecodeError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanStep<'a> {
    /// Unconsumed bytes to scan next.
    pub remainder: &'a [u8],
    pub event: ScanEvent<'a>,
}

impl<'a> ScanStep<'a> {
    pub fn frame(&self) -> Option<&Frame<'a>> {
        match &self.event {
            ScanEvent::Frame { decoded, .. } => Some(&decoded.frame),
            _ => None,
        }
    }
}

/// Position of the first frame marker in `buffer`.
pub fn find_marker(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(layout::MAGIC_LEN)
        .position(|window| window == layout::MAGIC)
}

/// Locate and decode the next frame in `buffer`.
///
/// Bytes before a marker are only dropped together with a frame or a
/// resynchronization; while a candidate frame is incomplete the whole buffer
/// is handed back so a later read can complete it in place. A candidate that
/// fails to decode is treated as a coincidental marker and scanning resumes
/// two bytes past it, so an overlapping real frame is still found.
///
/// # Examples
/// ```
/// use mdptap_core::{DecoderConfig, ScanEvent, scan_frame};
///
/// let buffer = [0x5A, 0x5A, 0x03, 0x01, 0x00];
/// let step = scan_frame(&buffer, &DecoderConfig::default());
/// assert!(matches!(step.event, ScanEvent::Resync { offset: 0, .. }));
/// assert_eq!(step.remainder, &[0x03, 0x01, 0x00]);
/// ```
pub fn scan_frame<'a>(buffer: &'a [u8], config: &DecoderConfig) -> ScanStep<'a> {
    let Some(offset) = find_marker(buffer) else {
        return ScanStep {
            remainder: buffer,
            event: ScanEvent::NoMarker,
        };
    };

    let candidate = &buffer[offset..];
    let header = MdpReader::new(candidate);
    let (kind, declared_length) = match (
        header.read_u8(layout::KIND_OFFSET),
        header.read_u8(layout::LENGTH_OFFSET),
    ) {
        (Ok(kind), Ok(length)) => (PackKind::from(kind), length),
        _ => {
            return ScanStep {
                remainder: buffer,
                event: ScanEvent::Incomplete {
                    offset,
                    declared_length: None,
                },
            };
        }
    };

    let frame_len = declared_length as usize;
    if candidate.len() < frame_len {
        return ScanStep {
            remainder: buffer,
            event: ScanEvent::Incomplete {
                offset,
                declared_length: Some(declared_length),
            },
        };
    }

    let payload = candidate
        .get(layout::HEADER_LEN..frame_len)
        .unwrap_or_default();
    match decode_packet(kind, declared_length, payload, config) {
        Ok(packet) => {
            trace!(offset, %kind, declared_length, "decoded frame");
            ScanStep {
                remainder: &candidate[frame_len..],
                event: ScanEvent::Frame {
                    offset,
                    decoded: DecodedFrame {
                        frame: Frame {
                            kind,
                            declared_length,
                            payload,
                        },
                        packet,
                    },
                },
            }
        }
        Err(error)
            if error.is_ambiguous_group_size()
                && config.wave_length_policy == WaveLengthPolicy::Skip =>
        {
            ScanStep {
                remainder: &candidate[frame_len..],
                event: ScanEvent::Skipped { offset, error },
            }
        }
        Err(error) => ScanStep {
            remainder: &candidate[layout::MAGIC_LEN..],
            event: ScanEvent::Resync { offset, error },
        },
    }
}
