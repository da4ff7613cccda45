//! Integration tests that drive `gobuild build` against a fake toolchain.

#![cfg(unix)]

mod build_tests;
mod common;
