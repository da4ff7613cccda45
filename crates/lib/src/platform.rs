//! Target platform resolution.

use std::fmt;
use std::future::Future;

use serde::Serialize;
use tracing::debug;

use crate::consts::{GOARCH, GOOS};
use crate::env::EnvironmentMapping;
use crate::error::BuildError;
use crate::request::{BuildRequest, PlatformSelection};

/// Concrete (operating system, architecture) pair a build targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedPlatform {
  pub os: String,
  pub arch: String,
}

impl ResolvedPlatform {
  pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
    Self {
      os: os.into(),
      arch: arch.into(),
    }
  }

  /// Read the host platform from a toolchain environment report.
  ///
  /// A missing or empty `GOOS`/`GOARCH` is a configuration error rather than
  /// a silent default.
  pub fn from_environment(env: &EnvironmentMapping) -> Result<Self, BuildError> {
    let lookup = |key: &str| {
      env
        .get(key)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BuildError::Configuration(format!("toolchain environment does not define {}", key)))
    };

    Ok(Self {
      os: lookup(GOOS)?,
      arch: lookup(GOARCH)?,
    })
  }

  pub fn is_windows(&self) -> bool {
    self.os == "windows"
  }
}

impl fmt::Display for ResolvedPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.os, self.arch)
  }
}

/// Combine a validated request with the host environment.
///
/// `query_env` is only awaited when the request does not name a platform.
/// Explicit pairs are not checked against the toolchain's supported list;
/// an unsupported pair fails in the build subprocess instead.
pub async fn resolve_platform<F, Fut>(request: &BuildRequest, query_env: F) -> Result<ResolvedPlatform, BuildError>
where
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<EnvironmentMapping, BuildError>>,
{
  let platform = match request.selection() {
    PlatformSelection::Explicit { os, arch } => ResolvedPlatform::new(os.as_str(), arch.as_str()),
    PlatformSelection::Host => ResolvedPlatform::from_environment(&query_env().await?)?,
    PlatformSelection::All => return Err(BuildError::NotImplemented("building for all platforms")),
  };

  debug!(platform = %platform, "resolved target platform");
  Ok(platform)
}
