use std::env;
use std::process::Command;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let commit = env::var("GITHUB_SHA")
        .ok()
        .filter(|sha| !sha.is_empty())
        .or_else(|| git(&["rev-parse", "HEAD"]));
    let commit_short = commit
        .as_deref()
        .map(|sha| sha.chars().take(7).collect::<String>())
        .unwrap_or_else(|| UNKNOWN.to_string());

    println!("cargo:rustc-env=MDPTAP_BUILD_COMMIT={commit_short}");
    println!(
        "cargo:rustc-env=MDPTAP_BUILD_COMMIT_FULL={}",
        commit.as_deref().unwrap_or(UNKNOWN)
    );
    println!("cargo:rustc-env=MDPTAP_BUILD_DATE={}", build_date());
}

/// Commit date when building from git, else `SOURCE_DATE_EPOCH`, else unknown.
fn build_date() -> String {
    if let Some(date) = git(&["log", "-1", "--format=%cI"]) {
        return date;
    }
    env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}
