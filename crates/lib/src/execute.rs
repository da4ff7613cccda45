//! Build subprocess execution.
//!
//! Runs `go build -o <artifact> <module>` with `GOOS`/`GOARCH` set for the
//! resolved platform and echoes the subprocess's stderr while it runs.

use std::io::Write;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::artifact::{artifact_name, artifact_path};
use crate::consts::{GOARCH, GOOS};
use crate::error::BuildError;
use crate::platform::ResolvedPlatform;
use crate::toolchain::Toolchain;

/// How the diagnostic stream is split before echoing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamMode {
  /// One output line per diagnostic line.
  #[default]
  Lines,
  /// One output line per whitespace-delimited token.
  Words,
}

/// What to do when the build subprocess fails to start or exits non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitStatusPolicy {
  /// Return [`BuildError::Spawn`] or [`BuildError::BuildFailed`].
  #[default]
  Propagate,
  /// Log a warning and report an unsuccessful [`BuildOutcome`] as `Ok`.
  Ignore,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub stream: StreamMode,
  /// Directory artifacts are written to, relative to the working directory.
  pub out_dir: Option<PathBuf>,
  pub exit_status: ExitStatusPolicy,
}

/// A fully resolved build, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
  pub module: String,
  pub platform: ResolvedPlatform,
  /// Artifact path, relative to `work_dir` unless absolute.
  pub artifact: PathBuf,
  /// Directory the build runs in. Defaults to the process's working directory.
  pub work_dir: Option<PathBuf>,
}

impl BuildPlan {
  pub fn new(module: impl Into<String>, platform: ResolvedPlatform, options: &BuildOptions) -> Self {
    let module = module.into();
    let name = artifact_name(&module, &platform);
    let artifact = artifact_path(&name, options.out_dir.as_deref());
    Self {
      module,
      platform,
      artifact,
      work_dir: None,
    }
  }

  pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.work_dir = Some(dir.into());
    self
  }

  /// Arguments passed to the toolchain: `build -o <artifact> <module>`.
  pub fn args(&self) -> Vec<String> {
    vec![
      "build".to_string(),
      "-o".to_string(),
      self.artifact.display().to_string(),
      self.module.clone(),
    ]
  }
}

/// Result of running the build subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
  pub module: String,
  pub platform: ResolvedPlatform,
  pub artifact: PathBuf,
  pub success: bool,
  /// `None` when the subprocess never started or was killed by a signal.
  pub status_code: Option<i32>,
  /// Number of lines or tokens echoed from the diagnostic stream.
  pub diagnostics: usize,
  pub elapsed_ms: u64,
}

impl BuildOutcome {
  pub fn elapsed(&self) -> Duration {
    Duration::from_millis(self.elapsed_ms)
  }
}

/// Run the build described by `plan`, echoing diagnostics to `out`.
///
/// Blocks until the diagnostic stream is exhausted and the subprocess has
/// exited. With [`ExitStatusPolicy::Ignore`] a failed or unstartable build
/// still returns `Ok`; the failure is visible only in the echoed diagnostics
/// and in [`BuildOutcome::success`].
pub async fn execute_build<W: Write>(
  toolchain: &Toolchain,
  plan: &BuildPlan,
  options: &BuildOptions,
  out: &mut W,
) -> Result<BuildOutcome, BuildError> {
  if let Some(dir) = &options.out_dir {
    let dir = match &plan.work_dir {
      Some(work_dir) => work_dir.join(dir),
      None => dir.clone(),
    };
    tokio::fs::create_dir_all(&dir).await?;
  }

  let args = plan.args();
  info!(
    module = %plan.module,
    platform = %plan.platform,
    artifact = %plan.artifact.display(),
    "building"
  );
  debug!(command = %toolchain.describe(&args), "spawning build");

  let start = Instant::now();
  let outcome = |status_code: Option<i32>, success: bool, diagnostics: usize| BuildOutcome {
    module: plan.module.clone(),
    platform: plan.platform.clone(),
    artifact: plan.artifact.clone(),
    success,
    status_code,
    diagnostics,
    elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
  };

  let mut command = toolchain.command(&args);
  command
    .env(GOOS, &plan.platform.os)
    .env(GOARCH, &plan.platform.arch)
    .stdout(Stdio::null())
    .stderr(Stdio::piped());
  if let Some(dir) = &plan.work_dir {
    command.current_dir(dir);
  }

  let mut child = match command.spawn() {
    Ok(child) => child,
    Err(source) => {
      return match options.exit_status {
        ExitStatusPolicy::Propagate => Err(BuildError::Spawn {
          program: toolchain.to_string(),
          source,
        }),
        ExitStatusPolicy::Ignore => {
          warn!(program = %toolchain, error = %source, "failed to start build; ignoring");
          Ok(outcome(None, false, 0))
        }
      };
    }
  };

  let diagnostics = match child.stderr.take() {
    Some(stderr) => stream_diagnostics(stderr, options.stream, out).await?,
    None => 0,
  };

  let status = match child.wait().await {
    Ok(status) => status,
    Err(e) => {
      return match options.exit_status {
        ExitStatusPolicy::Propagate => Err(e.into()),
        ExitStatusPolicy::Ignore => {
          warn!(error = %e, "failed to wait for build; ignoring");
          Ok(outcome(None, false, diagnostics))
        }
      };
    }
  };

  finish(status, plan, options, outcome(status.code(), status.success(), diagnostics))
}

fn finish(
  status: ExitStatus,
  plan: &BuildPlan,
  options: &BuildOptions,
  outcome: BuildOutcome,
) -> Result<BuildOutcome, BuildError> {
  if status.success() {
    debug!(elapsed_ms = outcome.elapsed_ms, "build finished");
    return Ok(outcome);
  }

  match options.exit_status {
    ExitStatusPolicy::Propagate => Err(BuildError::BuildFailed {
      artifact: plan.artifact.clone(),
      code: status.code(),
    }),
    ExitStatusPolicy::Ignore => {
      warn!(
        artifact = %plan.artifact.display(),
        code = ?status.code(),
        "build exited unsuccessfully; ignoring"
      );
      Ok(outcome)
    }
  }
}

/// Drain `reader`, writing each line or token to `out` as soon as it is complete.
///
/// Returns the number of chunks written. Invalid UTF-8 is replaced rather
/// than treated as an error.
pub async fn stream_diagnostics<R, W>(reader: R, mode: StreamMode, out: &mut W) -> std::io::Result<usize>
where
  R: AsyncRead + Unpin,
  W: Write,
{
  match mode {
    StreamMode::Lines => stream_lines(reader, out).await,
    StreamMode::Words => stream_words(reader, out).await,
  }
}

async fn stream_lines<R, W>(reader: R, out: &mut W) -> std::io::Result<usize>
where
  R: AsyncRead + Unpin,
  W: Write,
{
  let mut reader = BufReader::new(reader);
  let mut buf = Vec::new();
  let mut count = 0;

  loop {
    buf.clear();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
      break;
    }
    let line = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    writeln!(out, "{}", String::from_utf8_lossy(line))?;
    out.flush()?;
    count += 1;
  }

  Ok(count)
}

async fn stream_words<R, W>(mut reader: R, out: &mut W) -> std::io::Result<usize>
where
  R: AsyncRead + Unpin,
  W: Write,
{
  let mut chunk = [0u8; 4096];
  let mut splitter = WordSplitter::default();

  loop {
    let n = reader.read(&mut chunk).await?;
    if n == 0 {
      break;
    }
    splitter.feed(&chunk[..n], false, out)?;
    out.flush()?;
  }

  splitter.feed(&[], true, out)?;
  out.flush()?;
  Ok(splitter.count)
}

/// Incremental whitespace tokenizer over a UTF-8 byte stream.
///
/// Separators are every `char::is_whitespace` code point, so `\x0B`,
/// U+0085 and U+00A0 split tokens too. A code point cut by a read boundary
/// is held back until the next chunk; invalid bytes become U+FFFD.
#[derive(Default)]
struct WordSplitter {
  pending: Vec<u8>,
  token: String,
  count: usize,
}

impl WordSplitter {
  fn feed<W: Write>(&mut self, bytes: &[u8], eof: bool, out: &mut W) -> std::io::Result<()> {
    self.pending.extend_from_slice(bytes);
    let mut consumed = 0;

    while consumed < self.pending.len() {
      let rest = &self.pending[consumed..];
      let (valid, skip) = match std::str::from_utf8(rest) {
        Ok(text) => (text, 0),
        Err(e) => {
          let valid = std::str::from_utf8(&rest[..e.valid_up_to()]).unwrap_or_default();
          match e.error_len() {
            Some(len) => (valid, len),
            None if eof => (valid, rest.len() - e.valid_up_to()),
            // Truncated code point: wait for more input
            None => (valid, 0),
          }
        }
      };

      let valid_len = valid.len();
      for c in valid.chars() {
        if c.is_whitespace() {
          if !self.token.is_empty() {
            writeln!(out, "{}", self.token)?;
            self.token.clear();
            self.count += 1;
          }
        } else {
          self.token.push(c);
        }
      }

      consumed += valid_len;
      if skip == 0 {
        break;
      }
      self.token.push(char::REPLACEMENT_CHARACTER);
      consumed += skip;
    }

    self.pending.drain(..consumed);

    if eof && !self.token.is_empty() {
      writeln!(out, "{}", self.token)?;
      self.token.clear();
      self.count += 1;
    }
    Ok(())
  }
}
