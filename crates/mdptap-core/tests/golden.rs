use std::fs;
use std::path::{Path, PathBuf};

use mdptap_core::{
    CaptureFileSource, FixedClock, InputInfo, Record, ReplayConfig, ReplayReport, replay_source,
};
use time::OffsetDateTime;

const GOLDEN_CHUNK_SIZE: usize = 16;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn load_expected_report(dir: &str) -> ReplayReport {
    let expected_path = repo_root().join(dir).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn replay_golden_input(input: &Path) -> ReplayReport {
    let config = ReplayConfig {
        chunk_size: GOLDEN_CHUNK_SIZE,
        ..ReplayConfig::default()
    };
    let source = CaptureFileSource::open(input, config.chunk_size).expect("open capture");
    let info = InputInfo {
        path: input.display().to_string(),
        bytes: fs::metadata(input).expect("input metadata").len(),
    };
    replay_source(
        info,
        source,
        &config,
        FixedClock::new(OffsetDateTime::UNIX_EPOCH),
    )
    .expect("replay capture")
}

fn run_golden(dir: &str, input: &str) {
    let expected = load_expected_report(dir);
    let mut actual = replay_golden_input(&repo_root().join(dir).join(input));
    actual.generated_at = expected.generated_at.clone();
    actual.input.path = expected.input.path.clone();

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
}

#[test]
fn golden_synthesize() {
    run_golden("tests/golden/synthesize", "input.hex");
}

#[test]
fn golden_wave() {
    run_golden("tests/golden/wave", "input.hex");
}

#[test]
fn golden_mixed() {
    run_golden("tests/golden/mixed", "input.hex");
}

#[test]
fn golden_mixed_raw() {
    run_golden("tests/golden/mixed_raw", "input.bin");
}

#[test]
fn golden_synthesize_has_two_channels() {
    let report = load_expected_report("tests/golden/synthesize");
    let Record::Synthesize(snapshot) = &report.records[0] else {
        panic!("expected synthesize record");
    };
    let indices: Vec<_> = snapshot.channels.iter().map(|c| c.channel_index).collect();
    assert_eq!(indices, vec![0, 1]);
    assert_eq!(snapshot.channels[0].out_voltage, 5.0);
    assert_eq!(snapshot.channels[0].temperature, 25.0);
    assert!(snapshot.channels[1].has_error());
}

#[test]
fn golden_mixed_counts_anomalies() {
    let report = load_expected_report("tests/golden/mixed");
    assert_eq!(report.stats.stream.frames_invalid, 1);
    assert_eq!(report.stats.stream.frames_ambiguous, 1);
    assert_eq!(report.stats.stream.frames_opaque, 1);
    assert_eq!(report.stats.bytes_leftover, 13);
    assert!(report.has_anomalies());
}

#[test]
fn golden_hex_and_raw_captures_agree() {
    let hex = load_expected_report("tests/golden/mixed");
    let raw = load_expected_report("tests/golden/mixed_raw");
    assert_eq!(hex.records, raw.records);
    assert_eq!(hex.stats, raw.stats);
}
