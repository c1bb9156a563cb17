use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use mdptap_core::{
    CaptureFileSource, CaptureFormat, DEFAULT_CHUNK_SIZE, DecoderConfig, FixedClock, InputInfo,
    ReplayConfig, ReplayError, ReplayReport, WaveLengthPolicy, replay_capture_file, replay_source,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

mod logging;

use logging::{LogFormat, LogLevel, init_logging};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("MDPTAP_BUILD_COMMIT"),
    ", built ",
    env!("MDPTAP_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  mdptap decode link.hex -o report.json\n  mdptap replay link.bin --stdout --pretty\n  mdptap capture decode link.bin --report report.json --strict";

#[derive(Parser, Debug)]
#[command(name = "mdptap")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline decoder for MDP-M01 power-supply telemetry captures.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Log verbosity on stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on recorded link captures (raw binary or hex text).
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
    /// Shortcut for `capture decode`.
    #[command(alias = "replay", after_help = EXAMPLES)]
    Decode(DecodeArgs),
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Replay a capture through the stream decoder and write a JSON report.
    #[command(alias = "replay", after_help = EXAMPLES)]
    Decode(DecodeArgs),
}

impl Commands {
    fn decode_args(&self) -> &DecodeArgs {
        match self {
            Commands::Capture {
                command: CaptureCommands::Decode(args),
            }
            | Commands::Decode(args) => args,
        }
    }
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Path (or glob pattern) of a capture file
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if invalid or ambiguous frames were seen
    #[arg(long)]
    strict: bool,

    /// List stream anomalies after decoding
    #[arg(long)]
    list_anomalies: bool,

    /// Bytes fed to the decoder per read
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Reject synthesize and wave frames whose XOR checksum does not match
    #[arg(long)]
    verify_checksum: bool,

    /// Consume wave frames of unknown length instead of resynchronizing inside them
    #[arg(long)]
    skip_ambiguous_wave: bool,

    /// Capture encoding
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    input_format: InputFormat,

    /// Stamp records and the report with this RFC3339 time instead of the clock
    #[arg(long, value_name = "RFC3339", value_parser = parse_rfc3339)]
    fixed_time: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// `.hex`/`.txt` as hex text, anything else as raw bytes
    Auto,
    Raw,
    Hex,
}

impl InputFormat {
    fn capture_format(self) -> Option<CaptureFormat> {
        match self {
            InputFormat::Auto => None,
            InputFormat::Raw => Some(CaptureFormat::Raw),
            InputFormat::Hex => Some(CaptureFormat::Hex),
        }
    }
}

fn parse_rfc3339(value: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.command.decode_args().quiet {
        LogLevel::Error
    } else {
        cli.log_level
    };
    init_logging(cli.log_format, level);

    let result = match cli.command {
        Commands::Capture {
            command: CaptureCommands::Decode(args),
        }
        | Commands::Decode(args) => cmd_capture_decode(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_capture_decode(args: DecodeArgs) -> Result<(), CliError> {
    if args.chunk_size == 0 {
        return Err(CliError::new(
            "chunk size must be greater than zero",
            Some("use --chunk-size 1 or larger".to_string()),
        ));
    }

    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report_path = if args.stdout {
        None
    } else {
        Some(args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };
    if let Some(report_path) = report_path.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let config = ReplayConfig {
        chunk_size: args.chunk_size,
        format: args.input_format.capture_format(),
        decoder: DecoderConfig {
            verify_checksum: args.verify_checksum,
            wave_length_policy: if args.skip_ambiguous_wave {
                WaveLengthPolicy::Skip
            } else {
                WaveLengthPolicy::Reject
            },
        },
    };
    let rep = match args.fixed_time {
        Some(at) => replay_at(&resolved_input, &config, at),
        None => replay_capture_file(&resolved_input, &config),
    }
    .context("capture replay failed")?;
    info!(
        records = rep.records.len(),
        frames = rep.stats.stream.frames_decoded,
        anomalies = rep.stats.stream.anomalies(),
        "capture replayed"
    );
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if args.list_anomalies && !args.quiet {
        print_anomalies(&rep);
    }
    if args.strict && rep.has_anomalies() {
        return Err(CliError::new(
            "stream anomalies detected",
            Some("use --list-anomalies to inspect".to_string()),
        ));
    }
    Ok(())
}

fn replay_at(
    path: &Path,
    config: &ReplayConfig,
    at: OffsetDateTime,
) -> Result<ReplayReport, ReplayError> {
    let format = config
        .format
        .unwrap_or_else(|| CaptureFormat::from_path(path));
    let source = CaptureFileSource::open_with_format(path, format, config.chunk_size)?;
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: fs::metadata(path)?.len(),
    };
    replay_source(input, source, config, FixedClock::new(at))
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory is created later, so it cannot hold the input.
    let Ok(report_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &ReplayReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_anomalies(rep: &ReplayReport) {
    let stats = &rep.stats;
    eprintln!("Stream anomalies:");
    eprintln!("  frames_invalid {}", stats.stream.frames_invalid);
    eprintln!("  frames_ambiguous {}", stats.stream.frames_ambiguous);
    eprintln!("  bytes_leftover {}", stats.bytes_leftover);
    for (kind, count) in &stats.stream.opaque_kinds {
        eprintln!("  opaque {} {}", kind, count);
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a raw capture or a .hex text capture".to_string()),
        ));
    }
    let meta = fs::metadata(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a raw capture or a .hex text capture".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
