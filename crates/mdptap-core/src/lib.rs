//! mdptap core library: decoding of MDP-M01 power-supply telemetry streams.
//!
//! Bytes arrive from the device link in arbitrary chunks. The frame scanner
//! finds marker-delimited frames (or waits, or skips a spurious marker), the
//! packet decoder turns each frame payload into a structural packet
//! (layout/reader/parser), the record builder scales it into a semantic
//! record, and the stream driver repeats this over a buffer while handing the
//! unconsumed tail back to the caller. Decoding is pure and synchronous; all
//! I/O is isolated in `source` modules and the `replay` driver.
//!
//! Invariants:
//! - Malformed input never aborts a stream; it is skipped and counted.
//! - Splitting a stream at any point yields the same records.
//! - Records keep encounter order and carry the decode time from a `Clock`.
//!
//! Version française (résumé):
//! Cette crate décode le flux binaire du contrôleur MDP-M01 : scanner de
//! trames -> décodeur de paquets (layout/reader/parser) -> enregistrements
//! mis à l'échelle. Les E/S restent dans `source` et `replay`.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use mdptap_core::{ReplayConfig, replay_capture_file};
//!
//! let report = replay_capture_file(Path::new("capture.hex"), &ReplayConfig::default())?;
//! println!("records: {}", report.records.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod clock;
mod config;
mod protocols;
mod record;
mod replay;
pub mod source;
mod stream;
#[cfg(test)]
mod test_support;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DEFAULT_CHUNK_SIZE, DecoderConfig, ReplayConfig, WaveLengthPolicy};
pub use protocols::mdp;
pub use protocols::mdp::{
    ChannelSlot, ChannelStatus, DecodeError, DecodedFrame, Frame, LoadMode, MachineType, PackKind,
    SampleGroup, SampleItem, ScanEvent, ScanStep, StructuralPacket, SupplyMode,
    SynthesizePayload, WavePayload, decode_packet, find_marker, scan_frame,
};
pub use record::{
    ChannelSnapshot, Record, SynthesizeSnapshot, WaveformBurst, WaveformGroup, WaveformSample,
    build_record,
};
pub use replay::{ReplayError, replay_capture_file, replay_source};
pub use source::{ByteSource, CaptureFileSource, CaptureFormat, ReaderSource, SourceError};
pub use stream::{Drained, StreamDecoder, StreamStats, drain};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Timestamp used when the generation time cannot be formatted.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Result of replaying one capture.
///
/// # Examples
/// ```
/// use mdptap_core::make_stub_report;
///
/// let report = make_stub_report("capture.hex", 123);
/// assert_eq!(report.report_version, mdptap_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of report generation.
    pub generated_at: String,
    pub input: InputInfo,
    pub stats: ReplayStats,
    /// Records in stream order.
    pub records: Vec<Record>,
}

impl ReplayReport {
    /// Whether invalid or ambiguous frames were seen.
    pub fn has_anomalies(&self) -> bool {
        self.stats.stream.has_anomalies()
    }
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use mdptap_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "mdptap".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "mdptap");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the replay.
    pub path: String,
    /// Input file size in bytes (hex text counts as text).
    pub bytes: u64,
}

/// Replay counters: stream statistics plus chunking details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayStats {
    /// Chunks read from the source.
    pub chunks: u64,
    /// Bytes buffered in an incomplete frame when the source ended.
    pub bytes_leftover: u64,
    #[serde(flatten)]
    pub stream: StreamStats,
}

/// Build a stub report with base fields filled and no records.
///
/// # Examples
/// ```
/// use mdptap_core::make_stub_report;
///
/// let report = make_stub_report("capture.hex", 123);
/// assert_eq!(report.input.bytes, 123);
/// assert!(report.records.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> ReplayReport {
    ReplayReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "mdptap".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        stats: ReplayStats::default(),
        records: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::{REPORT_VERSION, make_stub_report};

    #[test]
    fn stub_report_serializes_flat_stats() {
        let report = make_stub_report("capture.bin", 7);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["report_version"], REPORT_VERSION);
        assert_eq!(value["tool"]["name"], "mdptap");
        assert_eq!(value["input"]["path"], "capture.bin");
        assert_eq!(value["stats"]["chunks"], 0);
        assert_eq!(value["stats"]["frames_decoded"], 0);
        assert!(value["stats"].get("stream").is_none());
        assert_eq!(value["records"], serde_json::json!([]));
        assert!(!report.has_anomalies());
    }
}
