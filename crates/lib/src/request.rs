//! Validated build requests.
//!
//! A [`BuildRequest`] is built once from parsed command-line options and is
//! immutable afterwards. The platform half of the request is stored as a
//! [`PlatformSelection`], so a half-specified target cannot be represented.

use std::fmt;

use crate::consts::DEFAULT_MODULE;
use crate::error::BuildError;

/// How the target platform is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformSelection {
  /// Use the toolchain's own `GOOS`/`GOARCH`.
  Host,
  /// Use the given pair verbatim.
  Explicit { os: String, arch: String },
  /// Every supported platform.
  All,
}

impl fmt::Display for PlatformSelection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PlatformSelection::Host => write!(f, "for current platform"),
      PlatformSelection::Explicit { os, arch } => write!(f, "for {}/{}", os, arch),
      PlatformSelection::All => write!(f, "for all platforms"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  module: String,
  selection: PlatformSelection,
}

impl BuildRequest {
  /// Validate raw option values.
  ///
  /// Empty strings count as absent. Rules, checked in order:
  /// 1. `goarch` without `goos` is rejected.
  /// 2. `goos` without `goarch` is rejected.
  /// 3. an explicit pair together with `all` is rejected.
  pub fn new(
    module: Option<String>,
    goos: Option<String>,
    goarch: Option<String>,
    all: bool,
  ) -> Result<Self, BuildError> {
    let goos = goos.filter(|s| !s.is_empty());
    let goarch = goarch.filter(|s| !s.is_empty());

    let selection = match (goos, goarch) {
      (None, Some(_)) => {
        return Err(BuildError::Configuration(
          "use of --goarch also requires --goos".to_string(),
        ));
      }
      (Some(_), None) => {
        return Err(BuildError::Configuration(
          "use of --goos also requires --goarch".to_string(),
        ));
      }
      (Some(_), Some(_)) if all => {
        return Err(BuildError::Configuration(
          "cannot use --all with --goos and --goarch".to_string(),
        ));
      }
      (Some(os), Some(arch)) => PlatformSelection::Explicit { os, arch },
      (None, None) if all => PlatformSelection::All,
      (None, None) => PlatformSelection::Host,
    };

    let module = module
      .filter(|m| !m.is_empty())
      .unwrap_or_else(|| DEFAULT_MODULE.to_string());

    Ok(Self { module, selection })
  }

  pub fn module(&self) -> &str {
    &self.module
  }

  pub fn selection(&self) -> &PlatformSelection {
    &self.selection
  }

  /// True when the module should be discovered from the working directory.
  pub fn uses_default_module(&self) -> bool {
    self.module == DEFAULT_MODULE
  }

  /// The line announced before resolution starts.
  pub fn status_line(&self) -> String {
    format!("Building '{}' {}", self.module, self.selection)
  }
}
