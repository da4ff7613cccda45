//! Console output for `gobuild`.
//!
//! The status line and build summary go to stdout, warnings and errors to
//! stderr. Colors are applied only when the stream supports them.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use gobuild_lib::BuildOutcome;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

mod symbols {
  pub const BUILT: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const STATUS: &str = "→";
}

/// Render an exit code, or the reason there is none.
pub fn exit_code_label(code: Option<i32>) -> String {
  match code {
    Some(code) => code.to_string(),
    None => "none".to_string(),
  }
}

/// Artifact size, in the units `ls -lh` would pick.
pub fn format_size(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;

  if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{} B", bytes)
  }
}

/// Wall-clock time of a build: milliseconds for cache hits, seconds otherwise.
pub fn format_elapsed(elapsed: Duration) -> String {
  let secs = elapsed.as_secs();
  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, elapsed.subsec_millis() / 10)
  } else {
    format!("{}ms", elapsed.subsec_millis())
  }
}

/// Labelled rows printed under a successful build.
///
/// `size` is the artifact's size on disk, when it could be read.
pub fn summary_rows(outcome: &BuildOutcome, size: Option<u64>) -> Vec<(&'static str, String)> {
  let mut rows = vec![
    ("Module", outcome.module.clone()),
    ("Platform", outcome.platform.to_string()),
  ];
  if let Some(size) = size {
    rows.push(("Size", format_size(size)));
  }
  rows.push(("Duration", format_elapsed(outcome.elapsed())));
  rows
}

/// Message for a failed build whose exit status was ignored.
pub fn ignored_failure_message(outcome: &BuildOutcome) -> String {
  format!(
    "Build of {} failed (exit code {}); exit status ignored",
    outcome.artifact.display(),
    exit_code_label(outcome.status_code)
  )
}

/// The line announced before the platform is resolved.
pub fn print_status(line: &str) {
  println!(
    "{} {}",
    symbols::STATUS.if_supports_color(Stream::Stdout, |s| s.cyan()),
    line
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

/// Human-readable summary of a finished build.
pub fn print_outcome(outcome: &BuildOutcome) {
  if !outcome.success {
    print_warning(&ignored_failure_message(outcome));
    return;
  }

  println!();
  println!(
    "{} Built {}",
    symbols::BUILT.if_supports_color(Stream::Stdout, |s| s.green()),
    outcome.artifact.display()
  );
  for (label, value) in summary_rows(outcome, artifact_size(&outcome.artifact)) {
    println!(
      "  {}: {}",
      label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      value
    );
  }
}

pub fn print_outcome_json(outcome: &BuildOutcome) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(outcome).context("Failed to serialize build outcome")?;
  println!("{}", json);
  Ok(())
}

fn artifact_size(path: &Path) -> Option<u64> {
  std::fs::metadata(path).ok().map(|meta| meta.len())
}
