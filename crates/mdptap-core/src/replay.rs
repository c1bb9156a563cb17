use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::ReplayConfig;
use crate::source::{ByteSource, CaptureFileSource, CaptureFormat, SourceError};
use crate::stream::StreamDecoder;
use crate::{DEFAULT_GENERATED_AT, InputInfo, ReplayReport, ReplayStats, make_stub_report};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Replay a capture file through a fresh decoder.
///
/// The format comes from `config.format`, or from the file extension when
/// unset. Records are stamped with the current time.
pub fn replay_capture_file(path: &Path, config: &ReplayConfig) -> Result<ReplayReport, ReplayError> {
    let format = config
        .format
        .unwrap_or_else(|| CaptureFormat::from_path(path));
    let source = CaptureFileSource::open_with_format(path, format, config.chunk_size)?;
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: path.metadata()?.len(),
    };
    replay_source(input, source, config, SystemClock)
}

/// Drain `source` chunk by chunk and build a report.
///
/// Bytes still buffered when the source ends are reported as
/// `stats.bytes_leftover`; they never produce a record.
pub fn replay_source<S: ByteSource, C: Clock>(
    input: InputInfo,
    mut source: S,
    config: &ReplayConfig,
    clock: C,
) -> Result<ReplayReport, ReplayError> {
    let mut decoder = StreamDecoder::with_clock(config.decoder.clone(), &clock);
    let mut records = Vec::new();
    let mut chunks = 0u64;

    while let Some(chunk) = source.next_chunk()? {
        chunks += 1;
        let produced = decoder.push(&chunk);
        debug!(
            chunk = chunks,
            bytes = chunk.len(),
            records = produced.len(),
            pending = decoder.pending().len(),
            "replayed chunk"
        );
        records.extend(produced);
    }

    let (stream, leftover) = decoder.finish();
    if !leftover.is_empty() {
        debug!(bytes = leftover.len(), "capture ended inside an incomplete frame");
    }

    let mut report = make_stub_report(&input.path, input.bytes);
    report.generated_at = format_rfc3339(clock.now());
    report.stats = ReplayStats {
        chunks,
        bytes_leftover: leftover.len() as u64,
        stream,
    };
    report.records = records;
    Ok(report)
}

fn format_rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use time::OffsetDateTime;

    use super::replay_source;
    use crate::clock::FixedClock;
    use crate::config::ReplayConfig;
    use crate::protocols::mdp::types::{PackKind, SupplyMode};
    use crate::record::Record;
    use crate::source::ReaderSource;
    use crate::test_support::{SlotSpec, frame, synthesize_payload};
    use crate::InputInfo;

    fn input(bytes: usize) -> InputInfo {
        InputInfo {
            path: "memory".to_string(),
            bytes: bytes as u64,
        }
    }

    #[test]
    fn replays_chunks_and_reports_leftover() {
        let mut capture = frame(
            PackKind::Synthesize,
            &synthesize_payload(2, &[SlotSpec::supply(5000, 1000, 250, SupplyMode::Cv)]),
        );
        capture.extend_from_slice(&[0x5A, 0x5A, 0x11]);
        let config = ReplayConfig {
            chunk_size: 10,
            ..ReplayConfig::default()
        };
        let source = ReaderSource::new(Cursor::new(capture.clone()), config.chunk_size).unwrap();
        let clock = FixedClock::new(OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap());

        let report = replay_source(input(capture.len()), source, &config, clock).unwrap();

        assert_eq!(report.generated_at, "2023-11-14T22:13:20Z");
        assert_eq!(report.input.bytes, capture.len() as u64);
        assert_eq!(report.stats.chunks, 16);
        assert_eq!(report.stats.bytes_leftover, 3);
        assert_eq!(report.stats.stream.bytes_in, capture.len() as u64);
        assert_eq!(report.stats.stream.synthesize_records, 1);
        assert_eq!(report.records.len(), 1);
        let Record::Synthesize(snapshot) = &report.records[0] else {
            panic!("expected synthesize record");
        };
        assert_eq!(snapshot.active_channel, 2);
    }

    #[test]
    fn empty_source_yields_empty_report() {
        let source = ReaderSource::new(Cursor::new(Vec::new()), 8).unwrap();
        let clock = FixedClock::new(OffsetDateTime::UNIX_EPOCH);
        let report = replay_source(input(0), source, &ReplayConfig::default(), clock).unwrap();
        assert_eq!(report.generated_at, "1970-01-01T00:00:00Z");
        assert_eq!(report.stats.chunks, 0);
        assert!(report.records.is_empty());
    }
}
