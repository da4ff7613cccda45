//! Implementation of the `gobuild build` command.
//!
//! Validates the platform options, announces what is being built, then
//! resolves the target and runs `go build`, echoing its diagnostics.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::debug;

use gobuild_lib::{BuildOptions, BuildRequest, ExitStatusPolicy, StreamMode, Toolchain, run_build};

use crate::output::{OutputFormat, print_outcome, print_outcome_json, print_status};

#[derive(Args, Debug)]
pub struct BuildArgs {
  /// Module or package to build (default: the package in the current directory)
  pub module: Option<String>,

  /// Build for all platforms
  #[arg(short, long)]
  pub all: bool,

  /// Target operating system, requires --goarch
  #[arg(long, value_name = "PLATFORM")]
  pub goos: Option<String>,

  /// Target architecture, requires --goos
  #[arg(long, value_name = "ARCHITECTURE")]
  pub goarch: Option<String>,

  /// Write the artifact into this directory instead of the current one (e.g. "bin")
  #[arg(long, value_name = "DIR")]
  pub out_dir: Option<PathBuf>,

  /// How diagnostics from the toolchain are split when echoed
  #[arg(long, value_enum, default_value = "lines")]
  pub stream: StreamArg,

  /// Report success even if the build subprocess fails
  #[arg(long)]
  pub ignore_exit_status: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StreamArg {
  Lines,
  Words,
}

impl From<StreamArg> for StreamMode {
  fn from(arg: StreamArg) -> Self {
    match arg {
      StreamArg::Lines => StreamMode::Lines,
      StreamArg::Words => StreamMode::Words,
    }
  }
}

impl BuildArgs {
  fn options(&self) -> BuildOptions {
    BuildOptions {
      stream: self.stream.into(),
      out_dir: self.out_dir.clone(),
      exit_status: if self.ignore_exit_status {
        ExitStatusPolicy::Ignore
      } else {
        ExitStatusPolicy::Propagate
      },
    }
  }
}

/// Execute the build command.
///
/// Errors from option validation and toolchain queries are returned. Whether
/// a failing `go build` is returned depends on `--ignore-exit-status`.
pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let options = args.options();
  let output = args.output;
  let request = BuildRequest::new(args.module, args.goos, args.goarch, args.all)?;

  if !output.is_json() {
    print_status(&request.status_line());
  }

  let toolchain = Toolchain::from_env();
  let cwd = std::env::current_dir().context("Failed to determine working directory")?;
  debug!(toolchain = %toolchain, cwd = %cwd.display(), "starting build");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = if output.is_json() {
    // Keep stdout parseable
    rt.block_on(run_build(&toolchain, &request, &options, &cwd, &mut std::io::stderr()))?
  } else {
    rt.block_on(run_build(&toolchain, &request, &options, &cwd, &mut std::io::stdout()))?
  };

  if output.is_json() {
    print_outcome_json(&outcome)?;
  } else {
    print_outcome(&outcome);
  }

  Ok(())
}
