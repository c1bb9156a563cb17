//! Stream driver: turns an arbitrarily chunked byte stream into records.

use std::collections::BTreeMap;

use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::DecoderConfig;
use crate::protocols::mdp::{PackKind, ScanEvent, StructuralPacket, scan_frame};
use crate::record::{Record, build_record};

/// Counters describing what the driver saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStats {
    /// Bytes pushed into a `StreamDecoder`; `drain` alone leaves this at zero.
    pub bytes_in: u64,
    /// Frames that decoded, opaque ones included.
    pub frames_decoded: u64,
    /// Candidates dropped by resynchronization.
    pub frames_invalid: u64,
    /// Wave frames whose declared length maps to no group size.
    pub frames_ambiguous: u64,
    pub frames_opaque: u64,
    /// Opaque frames by kind name.
    pub opaque_kinds: BTreeMap<String, u64>,
    pub synthesize_records: u64,
    pub wave_records: u64,
}

impl StreamStats {
    pub fn merge(&mut self, other: &StreamStats) {
        self.bytes_in += other.bytes_in;
        self.frames_decoded += other.frames_decoded;
        self.frames_invalid += other.frames_invalid;
        self.frames_ambiguous += other.frames_ambiguous;
        self.frames_opaque += other.frames_opaque;
        for (kind, count) in &other.opaque_kinds {
            *self.opaque_kinds.entry(kind.clone()).or_insert(0) += count;
        }
        self.synthesize_records += other.synthesize_records;
        self.wave_records += other.wave_records;
    }

    /// Invalid plus ambiguous frames.
    pub fn anomalies(&self) -> u64 {
        self.frames_invalid + self.frames_ambiguous
    }

    pub fn has_anomalies(&self) -> bool {
        self.anomalies() > 0
    }

    fn note_frame(&mut self, kind: PackKind, packet: &StructuralPacket) {
        self.frames_decoded += 1;
        if let StructuralPacket::Opaque { .. } = packet {
            self.frames_opaque += 1;
            *self.opaque_kinds.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    fn note_record(&mut self, record: &Record) {
        match record {
            Record::Synthesize(_) => self.synthesize_records += 1,
            Record::Wave(_) => self.wave_records += 1,
        }
    }
}

/// Result of draining one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Drained<'a> {
    /// Records in encounter order.
    pub records: Vec<Record>,
    /// Unconsumed tail of the input, to be prefixed to the next read.
    pub remainder: &'a [u8],
    pub stats: StreamStats,
}

/// Extract every decodable frame from `buffer`.
///
/// Scanning continues while each step consumes bytes; it stops on an empty
/// buffer, a buffer without a marker, or an incomplete frame. Splitting the
/// input at any point and draining the halves with the remainder carried over
/// yields the same records as draining it whole.
///
/// # Examples
/// ```
/// use mdptap_core::{DecoderConfig, SystemClock, drain};
///
/// let drained = drain(&[0x5A, 0x5A, 0x03, 0x01, 0x00], &DecoderConfig::default(), &SystemClock);
/// assert!(drained.records.is_empty());
/// assert_eq!(drained.remainder, &[0x03, 0x01, 0x00]);
/// assert_eq!(drained.stats.frames_invalid, 1);
/// ```
pub fn drain<'a, C: Clock>(buffer: &'a [u8], config: &DecoderConfig, clock: &C) -> Drained<'a> {
    let mut records = Vec::new();
    let mut stats = StreamStats::default();
    let mut remaining = buffer;

    while !remaining.is_empty() {
        let step = scan_frame(remaining, config);
        let progressed = step.remainder.len() != remaining.len();
        match step.event {
            ScanEvent::Frame { decoded, .. } => {
                stats.note_frame(decoded.frame.kind, &decoded.packet);
                if let Some(record) = build_record(decoded.packet, clock.now()) {
                    stats.note_record(&record);
                    records.push(record);
                }
            }
            ScanEvent::Resync { offset, error } if error.is_ambiguous_group_size() => {
                stats.frames_ambiguous += 1;
                warn!(offset, %error, "wave frame has an unknown length, resynchronizing");
            }
            ScanEvent::Resync { offset, error } => {
                stats.frames_invalid += 1;
                debug!(offset, %error, "dropping spurious frame marker");
            }
            ScanEvent::Skipped { offset, error } => {
                stats.frames_ambiguous += 1;
                warn!(offset, %error, "skipping wave frame with an unknown length");
            }
            ScanEvent::NoMarker | ScanEvent::Incomplete { .. } => {}
        }
        remaining = step.remainder;
        if !progressed {
            break;
        }
    }

    Drained {
        records,
        remainder: remaining,
        stats,
    }
}

/// Stateful decoder owning the bytes carried between reads.
///
/// # Examples
/// ```
/// use mdptap_core::StreamDecoder;
///
/// let mut decoder = StreamDecoder::new();
/// assert!(decoder.push(&[0x00, 0x5A, 0x5A, 0x11]).is_empty());
/// assert_eq!(decoder.pending(), &[0x00, 0x5A, 0x5A, 0x11]);
/// assert_eq!(decoder.stats().bytes_in, 4);
/// ```
#[derive(Debug)]
pub struct StreamDecoder<C = SystemClock> {
    buffer: BytesMut,
    config: DecoderConfig,
    clock: C,
    stats: StreamStats,
}

impl StreamDecoder<SystemClock> {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for StreamDecoder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> StreamDecoder<C> {
    pub fn with_clock(config: DecoderConfig, clock: C) -> Self {
        Self {
            buffer: BytesMut::new(),
            config,
            clock,
            stats: StreamStats::default(),
        }
    }

    /// Append `chunk` and return the records it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Record> {
        self.stats.bytes_in += chunk.len() as u64;
        self.buffer.extend_from_slice(chunk);

        let drained = drain(&self.buffer, &self.config, &self.clock);
        let consumed = self.buffer.len() - drained.remainder.len();
        let Drained { records, stats, .. } = drained;

        self.buffer.advance(consumed);
        self.stats.merge(&stats);
        records
    }

    /// Bytes waiting for more input.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Final counters and the bytes that never completed a frame.
    pub fn finish(self) -> (StreamStats, Vec<u8>) {
        (self.stats, self.buffer.to_vec())
    }
}
