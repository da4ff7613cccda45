//! End-to-end build orchestration.
//!
//! Ties the pieces together for a single invocation:
//! platform resolution, module discovery, planning and execution.

use std::io::Write;
use std::path::Path;

use crate::env::query_environment;
use crate::error::BuildError;
use crate::execute::{BuildOptions, BuildOutcome, BuildPlan, execute_build};
use crate::module::locate_module;
use crate::platform::resolve_platform;
use crate::request::BuildRequest;
use crate::toolchain::Toolchain;

/// Resolve and run a validated build request.
///
/// The platform is resolved before the module is located, so requests that
/// cannot be satisfied (such as building for all platforms) fail without
/// spawning any toolchain query. Every subprocess runs in `cwd`.
pub async fn run_build<W: Write>(
  toolchain: &Toolchain,
  request: &BuildRequest,
  options: &BuildOptions,
  cwd: &Path,
  out: &mut W,
) -> Result<BuildOutcome, BuildError> {
  let platform = resolve_platform(request, || query_environment(toolchain)).await?;

  let module = if request.uses_default_module() {
    locate_module(toolchain, cwd).await?
  } else {
    request.module().to_string()
  };

  let plan = BuildPlan::new(module, platform, options).with_work_dir(cwd);
  execute_build(toolchain, &plan, options, out).await
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::error::ErrorKind;
  use crate::execute::ExitStatusPolicy;
  use crate::platform::ResolvedPlatform;
  use crate::util::testutil::fake_toolchain;
  use std::path::PathBuf;
  use tempfile::TempDir;

  /// Fake toolchain that answers `env`, `list` and `build` like `go` would.
  const FAKE_GO: &str = r#"
case "$1" in
  env)
    echo "GOOS='freebsd'"
    echo "GOARCH='amd64'"
    ;;
  list)
    echo "example.com/hello"
    ;;
  build)
    echo "building $4 for $GOOS/$GOARCH" >&2
    [ "$4" = "example.com/broken" ] && exit 1
    echo "binary" > "$3"
    ;;
esac
"#;

  fn request(module: Option<&str>, goos: Option<&str>, goarch: Option<&str>, all: bool) -> BuildRequest {
    BuildRequest::new(
      module.map(String::from),
      goos.map(String::from),
      goarch.map(String::from),
      all,
    )
    .unwrap()
  }

  fn bin_options() -> BuildOptions {
    BuildOptions {
      out_dir: Some(PathBuf::from("bin")),
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn default_module_and_host_platform_are_discovered() {
    let dir = TempDir::new().unwrap();
    let toolchain = fake_toolchain(&dir, FAKE_GO);
    let mut out = Vec::new();

    let outcome = run_build(&toolchain, &request(None, None, None, false), &bin_options(), dir.path(), &mut out)
      .await
      .unwrap();

    assert_eq!(outcome.module, "example.com/hello");
    assert_eq!(outcome.platform, ResolvedPlatform::new("freebsd", "amd64"));
    assert_eq!(outcome.artifact, Path::new("bin").join("hello-freebsd-amd64"));
    assert!(dir.path().join(&outcome.artifact).exists());
    assert_eq!(String::from_utf8(out).unwrap(), "building example.com/hello for freebsd/amd64\n");
  }

  #[tokio::test]
  async fn explicit_module_and_platform_are_used_verbatim() {
    let dir = TempDir::new().unwrap();
    let toolchain = fake_toolchain(&dir, FAKE_GO);

    let outcome = run_build(
      &toolchain,
      &request(Some("example.com/foo"), Some("windows"), Some("amd64"), false),
      &bin_options(),
      dir.path(),
      &mut Vec::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.artifact, Path::new("bin").join("foo-windows-amd64.exe"));
    assert!(dir.path().join(&outcome.artifact).exists());
    assert!(outcome.success);
  }

  #[tokio::test]
  async fn all_platforms_fails_before_any_query() {
    let dir = TempDir::new().unwrap();
    let toolchain = Toolchain::new(dir.path().join("never-run"));

    let err = run_build(&toolchain, &request(None, None, None, true), &bin_options(), dir.path(), &mut Vec::new())
      .await
      .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotImplemented);
  }

  #[tokio::test]
  async fn failing_build_surfaces_or_not_by_policy() {
    let dir = TempDir::new().unwrap();
    let toolchain = fake_toolchain(&dir, FAKE_GO);
    let req = request(Some("example.com/broken"), Some("linux"), Some("amd64"), false);

    let err = run_build(&toolchain, &req, &bin_options(), dir.path(), &mut Vec::new())
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Build);

    let mut options = bin_options();
    options.exit_status = ExitStatusPolicy::Ignore;
    let outcome = run_build(&toolchain, &req, &options, dir.path(), &mut Vec::new())
      .await
      .unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.status_code, Some(1));
  }
}
