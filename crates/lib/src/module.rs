//! Discovery of the package to build when none is given explicitly.

use std::path::Path;

use tracing::debug;

use crate::error::BuildError;
use crate::toolchain::Toolchain;

const LIST_ARGS: [&str; 2] = ["list", "./..."];

/// Ask the toolchain which package lives under `dir`.
///
/// Runs `go list ./...` in `dir` and returns its output. Exactly one package
/// must be listed; the build subprocess takes a single package argument.
pub async fn locate_module(toolchain: &Toolchain, dir: &Path) -> Result<String, BuildError> {
  debug!(dir = %dir.display(), "locating module");

  let query_error = |message: String| BuildError::ToolchainQuery {
    command: toolchain.describe(&LIST_ARGS),
    message,
  };

  let output = toolchain
    .command(LIST_ARGS)
    .current_dir(dir)
    .output()
    .await
    .map_err(|e| query_error(e.to_string()))?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let message = if stderr.is_empty() {
      match output.status.code() {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
      }
    } else {
      stderr
    };
    return Err(query_error(message));
  }

  select_package(&String::from_utf8_lossy(&output.stdout), dir)
}

fn select_package(listing: &str, dir: &Path) -> Result<String, BuildError> {
  let packages: Vec<&str> = listing.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

  match packages.as_slice() {
    [] => Err(BuildError::Configuration(format!(
      "no packages found in {}",
      dir.display()
    ))),
    [package] => {
      debug!(package, "located module");
      Ok(package.to_string())
    }
    many => Err(BuildError::Configuration(format!(
      "found {} packages in {} ({}); specify one explicitly",
      many.len(),
      dir.display(),
      many.join(", ")
    ))),
  }
}
