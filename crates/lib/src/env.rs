//! Toolchain environment report parsing.
//!
//! `go env` prints one variable per line, but the shape depends on the host:
//!
//! ```text
//! GOOS='linux'            # unix, go >= 1.21
//! GOOS="linux"            # unix, older releases
//! set GOOS=windows        # cmd.exe hosts
//! $env:GOOS = "windows"   # PowerShell hosts
//! ```
//!
//! All of them parse to the same [`EnvironmentMapping`].

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::BuildError;
use crate::toolchain::Toolchain;

/// Snapshot of the toolchain's environment, rebuilt on every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentMapping(BTreeMap<String, String>);

impl EnvironmentMapping {
  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Parse the textual output of `go env` into a mapping.
///
/// Lines that match none of the accepted shapes are skipped. Later
/// assignments to the same key win.
pub fn parse_env_report(report: &str) -> EnvironmentMapping {
  let mut env = EnvironmentMapping::default();
  for line in report.lines() {
    if let Some((key, value)) = parse_line(line) {
      env.insert(key, value);
    }
  }
  env
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
  let line = line.trim();
  let assignment = strip_prefix_ignore_case(line, "$env:")
    .or_else(|| strip_set_prefix(line))
    .unwrap_or(line);

  let (key, value) = assignment.split_once('=')?;
  let key = key.trim();
  if key.is_empty() || key.contains(char::is_whitespace) {
    return None;
  }

  Some((key, unquote(value.trim())))
}

/// Strip a leading `set` keyword followed by whitespace, in any case.
fn strip_set_prefix(line: &str) -> Option<&str> {
  let rest = strip_prefix_ignore_case(line, "set")?;
  if rest.starts_with(char::is_whitespace) {
    Some(rest.trim_start())
  } else {
    None
  }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
  let head = line.get(..prefix.len())?;
  if head.eq_ignore_ascii_case(prefix) {
    Some(&line[prefix.len()..])
  } else {
    None
  }
}

/// Remove one pair of matching single or double quotes.
fn unquote(value: &str) -> &str {
  for quote in ['\'', '"'] {
    if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
      return &value[1..value.len() - 1];
    }
  }
  value
}

/// Run `go env` and parse its report.
///
/// A toolchain that cannot be started is an error. A toolchain that starts
/// but exits non-zero is reported and whatever it printed is still parsed,
/// so an empty report yields an empty mapping and the caller decides
/// whether the missing keys matter.
pub async fn query_environment(toolchain: &Toolchain) -> Result<EnvironmentMapping, BuildError> {
  const ARGS: [&str; 1] = ["env"];

  debug!(toolchain = %toolchain, "querying toolchain environment");

  let output = toolchain
    .command(ARGS)
    .output()
    .await
    .map_err(|e| BuildError::ToolchainQuery {
      command: toolchain.describe(&ARGS),
      message: e.to_string(),
    })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    warn!(
      command = %toolchain.describe(&ARGS),
      code = ?output.status.code(),
      stderr = %stderr.trim(),
      "toolchain environment report exited unsuccessfully"
    );
  }

  let env = parse_env_report(&String::from_utf8_lossy(&output.stdout));
  debug!(variables = env.len(), "parsed toolchain environment");
  Ok(env)
}
