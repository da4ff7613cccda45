//! Handle on the external toolchain binary.
//!
//! Every subprocess this crate spawns (`go env`, `go list`, `go build`) is
//! created through [`Toolchain::command`], so tests can substitute a fake
//! program via `GOBUILD_TOOLCHAIN`.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::consts::{DEFAULT_TOOLCHAIN, TOOLCHAIN_ENV};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
  program: PathBuf,
}

impl Toolchain {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  /// Resolve the toolchain program, honoring `GOBUILD_TOOLCHAIN` when set and non-empty.
  pub fn from_env() -> Self {
    match std::env::var_os(TOOLCHAIN_ENV) {
      Some(program) if !program.is_empty() => Self::new(program),
      _ => Self::default(),
    }
  }

  pub fn program(&self) -> &Path {
    &self.program
  }

  /// Build a command for the toolchain with the given arguments.
  ///
  /// stdin is closed; stdout and stderr are left to the caller.
  pub fn command<I, S>(&self, args: I) -> Command
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    let mut command = Command::new(&self.program);
    command.args(args).stdin(Stdio::null()).kill_on_drop(true);
    command
  }

  /// Human-readable rendering of an invocation, used in errors and logs.
  pub fn describe<S: AsRef<str>>(&self, args: &[S]) -> String {
    let mut rendered = self.program.display().to_string();
    for arg in args {
      rendered.push(' ');
      rendered.push_str(arg.as_ref());
    }
    rendered
  }
}

impl Default for Toolchain {
  fn default() -> Self {
    Self::new(DEFAULT_TOOLCHAIN)
  }
}

impl fmt::Display for Toolchain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())
  }
}
