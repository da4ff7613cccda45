//! Test utilities for gobuild-lib.
//!
//! Subprocess tests run against a fake toolchain: a shell script written into
//! a temporary directory and handed to [`Toolchain::new`].

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::toolchain::Toolchain;

/// Write an executable `go` script containing `body` into `dir`.
pub fn fake_toolchain(dir: &TempDir, body: &str) -> Toolchain {
  let path: PathBuf = dir.path().join("go");
  std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  Toolchain::new(path)
}
