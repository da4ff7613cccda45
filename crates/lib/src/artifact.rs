//! Platform-qualified artifact names.

use std::path::{Path, PathBuf};

use crate::consts::WINDOWS_EXE_SUFFIX;
use crate::platform::ResolvedPlatform;

fn is_separator(c: char) -> bool {
  c == '/' || c == '\\'
}

/// Last element of a module or package path.
///
/// Trailing separators are ignored. An empty path yields `.` and a path made
/// only of separators yields `/`.
pub fn module_base_name(module: &str) -> &str {
  if module.is_empty() {
    return ".";
  }

  let trimmed = module.trim_end_matches(is_separator);
  if trimmed.is_empty() {
    return "/";
  }

  match trimmed.rfind(is_separator) {
    Some(idx) => &trimmed[idx + 1..],
    None => trimmed,
  }
}

/// `<base>-<os>-<arch>`, plus `.exe` when targeting Windows.
pub fn artifact_name(module: &str, platform: &ResolvedPlatform) -> String {
  let mut name = format!("{}-{}-{}", module_base_name(module), platform.os, platform.arch);
  if platform.is_windows() {
    name.push_str(WINDOWS_EXE_SUFFIX);
  }
  name
}

/// Place an artifact under an optional output directory.
pub fn artifact_path(name: &str, out_dir: Option<&Path>) -> PathBuf {
  match out_dir {
    Some(dir) => dir.join(name),
    None => PathBuf::from(name),
  }
}
