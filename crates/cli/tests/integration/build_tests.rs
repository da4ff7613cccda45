use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn builds_discovered_module_for_host_platform() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("Building '.' for current platform"))
    .stdout(predicate::str::contains("# example.com/hello"))
    .stdout(predicate::str::contains("Built hello-linux-amd64"));

  assert!(env.work_dir().join("hello-linux-amd64").exists());
  assert_eq!(
    env.invocation().unwrap(),
    "linux amd64 build -o hello-linux-amd64 example.com/hello\n"
  );
}

#[test]
fn explicit_windows_target_gets_exe_suffix() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "--goos", "windows", "--goarch", "amd64", "foo"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Building 'foo' for windows/amd64"));

  assert!(env.work_dir().join("foo-windows-amd64.exe").exists());
  assert_eq!(
    env.invocation().unwrap(),
    "windows amd64 build -o foo-windows-amd64.exe foo\n"
  );
}

#[test]
fn explicit_linux_target_has_no_suffix() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "--goos=linux", "--goarch=arm64", "foo"])
    .assert()
    .success();

  assert!(env.work_dir().join("foo-linux-arm64").exists());
}

#[test]
fn out_dir_relocates_artifact() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "--out-dir", "bin", "./cmd/tool"])
    .assert()
    .success();

  assert!(env.work_dir().join("bin").join("tool-linux-amd64").exists());
}

#[test]
fn failing_build_exits_non_zero() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "example.com/broken"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("./main.go:3:2: undefined: fmt"))
    .stderr(predicate::str::contains("failed with exit code 2"));
}

#[test]
fn failing_build_succeeds_when_exit_status_ignored() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["build", "--ignore-exit-status", "--stream", "words", "example.com/broken"])
    .assert()
    .success()
    .stdout(predicate::str::contains("undefined:\nfmt\n"))
    .stderr(predicate::str::contains("exit status ignored"));
}

#[test]
fn json_output_reports_outcome() {
  let env = TestEnv::new();

  let output = env
    .cmd()
    .args(["build", "-o", "json", "--goos", "darwin", "--goarch", "arm64", "foo"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(outcome["artifact"], "foo-darwin-arm64");
  assert_eq!(outcome["platform"]["os"], "darwin");
  assert_eq!(outcome["platform"]["arch"], "arm64");
  assert_eq!(outcome["success"], true);
  assert_eq!(outcome["status_code"], 0);
  assert!(String::from_utf8_lossy(&output.stderr).contains("# foo"));
}

#[test]
fn missing_host_platform_is_configuration_error() {
  let env = TestEnv::with_toolchain("#!/bin/sh\n[ \"$1\" = env ] && echo \"GOOS='linux'\"\nexit 0\n");

  env
    .cmd()
    .args(["build", "foo"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("does not define GOARCH"));

  assert!(env.invocation().is_none());
}

#[test]
fn module_listing_failure_is_reported() {
  let env = TestEnv::with_toolchain("#!/bin/sh\necho \"GOOS=linux\"\necho \"GOARCH=amd64\"\n[ \"$1\" = list ] && echo 'go: go.mod file not found' >&2 && exit 1\nexit 0\n");

  env
    .cmd()
    .arg("build")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("go.mod file not found"));
}
