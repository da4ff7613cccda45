//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Fake `go` that answers `env`, `list` and `build`.
///
/// `build` records its target environment and arguments in `invocation`
/// next to the script, echoes a diagnostic and writes the artifact. A module
/// named `example.com/broken` makes it fail with exit code 2.
pub const FAKE_GO: &str = r##"#!/bin/sh
case "$1" in
  env)
    echo "GOOS='linux'"
    echo "GOARCH='amd64'"
    echo "GOPATH='/home/gopher/go'"
    ;;
  list)
    echo "example.com/hello"
    ;;
  build)
    echo "$GOOS $GOARCH $*" > "$(dirname "$0")/invocation"
    if [ "$4" = "example.com/broken" ]; then
      echo "./main.go:3:2: undefined: fmt" >&2
      exit 2
    fi
    echo "# $4" >&2
    printf 'artifact' > "$3"
    ;;
  *)
    exit 64
    ;;
esac
"##;

/// Isolated test environment.
///
/// Each test gets a temporary working directory and its own fake toolchain.
pub struct TestEnv {
  pub temp: TempDir,
  pub toolchain: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    Self::with_toolchain(FAKE_GO)
  }

  /// Create an environment whose toolchain is the given script.
  pub fn with_toolchain(script: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let tools = temp.path().join("tools");
    std::fs::create_dir_all(&tools).unwrap();
    let toolchain = tools.join("go");
    std::fs::write(&toolchain, script).unwrap();
    std::fs::set_permissions(&toolchain, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::create_dir_all(temp.path().join("work")).unwrap();
    Self { temp, toolchain }
  }

  /// Working directory the command runs in.
  pub fn work_dir(&self) -> PathBuf {
    self.temp.path().join("work")
  }

  /// Contents of the fake toolchain's last `build` invocation.
  pub fn invocation(&self) -> Option<String> {
    let path = self.toolchain.parent().unwrap_or(Path::new(".")).join("invocation");
    std::fs::read_to_string(path).ok()
  }

  /// A `gobuild` command wired to this environment.
  pub fn cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("gobuild");
    cmd
      .current_dir(self.work_dir())
      .env("GOBUILD_TOOLCHAIN", &self.toolchain)
      .env("NO_COLOR", "1")
      .env_remove("RUST_LOG");
    cmd
  }
}
