/// Program invoked when no toolchain override is configured.
pub const DEFAULT_TOOLCHAIN: &str = "go";

/// Environment variable that overrides the toolchain program.
pub const TOOLCHAIN_ENV: &str = "GOBUILD_TOOLCHAIN";

/// Environment keys naming the host platform in the toolchain's environment report.
pub const GOOS: &str = "GOOS";
pub const GOARCH: &str = "GOARCH";

/// Module path sentinel meaning "whatever lives in the working directory".
pub const DEFAULT_MODULE: &str = ".";

/// Suffix appended to artifacts built for Windows.
pub const WINDOWS_EXE_SUFFIX: &str = ".exe";
