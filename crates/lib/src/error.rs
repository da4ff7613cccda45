//! Error types for build orchestration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of a [`BuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Invalid or contradictory options, or a gap in the resolved platform.
  Configuration,
  /// A toolchain query (`go env`, `go list`) could not be run or failed.
  ToolchainQuery,
  /// The request was accepted but the behavior it asks for does not exist.
  NotImplemented,
  /// The build subprocess failed to start or exited unsuccessfully.
  Build,
  /// Local I/O failure.
  Io,
}

/// Errors that can occur while resolving and running a build.
#[derive(Debug, Error)]
pub enum BuildError {
  /// Invalid flag combination or missing platform information.
  #[error("{0}")]
  Configuration(String),

  /// A toolchain query subprocess could not be run or exited abnormally.
  #[error("failed to run '{command}': {message}")]
  ToolchainQuery { command: String, message: String },

  /// Accepted syntactically but not implemented.
  #[error("{0} is not implemented")]
  NotImplemented(&'static str),

  /// The build subprocess could not be started.
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The build subprocess exited with a non-zero status.
  #[error("build of {} failed with exit code {}", artifact.display(), display_code(*code))]
  BuildFailed { artifact: PathBuf, code: Option<i32> },

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

impl BuildError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      BuildError::Configuration(_) => ErrorKind::Configuration,
      BuildError::ToolchainQuery { .. } => ErrorKind::ToolchainQuery,
      BuildError::NotImplemented(_) => ErrorKind::NotImplemented,
      BuildError::Spawn { .. } | BuildError::BuildFailed { .. } => ErrorKind::Build,
      BuildError::Io(_) => ErrorKind::Io,
    }
  }
}

fn display_code(code: Option<i32>) -> String {
  match code {
    Some(code) => code.to_string(),
    // Terminated by a signal
    None => "none".to_string(),
  }
}
