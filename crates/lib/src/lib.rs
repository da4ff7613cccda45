//! gobuild-lib: build orchestration for the Go toolchain.
//!
//! Turns a validated [`BuildRequest`] into a `go build` invocation:
//! - `env`: parses the toolchain's environment report for the host platform
//! - `module`: discovers the package in the working directory
//! - `platform`: combines explicit flags with the host defaults
//! - `artifact`: names the output `<module>-<os>-<arch>[.exe]`
//! - `execute`: runs the build and streams its diagnostics

pub mod artifact;
pub mod build;
pub mod consts;
pub mod env;
pub mod error;
pub mod execute;
pub mod module;
pub mod platform;
pub mod request;
pub mod toolchain;

#[cfg(test)]
mod util;

pub use build::run_build;
pub use env::{EnvironmentMapping, parse_env_report, query_environment};
pub use error::{BuildError, ErrorKind};
pub use execute::{BuildOptions, BuildOutcome, BuildPlan, ExitStatusPolicy, StreamMode, execute_build};
pub use platform::{ResolvedPlatform, resolve_platform};
pub use request::{BuildRequest, PlatformSelection};
pub use toolchain::Toolchain;
