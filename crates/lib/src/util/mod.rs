//! Shared utilities.

#[cfg(unix)]
pub mod testutil;
