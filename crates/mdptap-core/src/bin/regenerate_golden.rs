use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mdptap_core::{
    CaptureFileSource, FixedClock, InputInfo, ReplayConfig, replay_source,
};
use time::OffsetDateTime;

const GOLDEN_CHUNK_SIZE: usize = 16;

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(input) = ["input.hex", "input.bin"]
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.exists())
        else {
            continue;
        };
        let output = path.join("expected_report.json");
        regenerate_one(&input, &output)?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let config = ReplayConfig {
        chunk_size: GOLDEN_CHUNK_SIZE,
        ..ReplayConfig::default()
    };
    let source = CaptureFileSource::open(input, config.chunk_size)
        .map_err(|err| format!("failed to open {}: {}", input.display(), err))?;
    let bytes = fs::metadata(input)
        .map_err(|err| format!("failed to stat {}: {}", input.display(), err))?
        .len();
    let info = InputInfo {
        path: input.display().to_string(),
        bytes,
    };
    let report = replay_source(info, source, &config, FixedClock::new(OffsetDateTime::UNIX_EPOCH))
        .map_err(|err| format!("replay failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
