//! # carchive Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! declares `mod common;` and picks what it needs.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DESCRIPTOR_YAML: &str = r#"meta:
  schemaVersion: v2
component:
  name: github.com/acme/my-comp
  version: 1.0.0
  provider: internal
  resources:
    - name: values
      version: 1.0.0
      type: helm.values
      relation: local
      access:
        type: localFilesystemBlob
        filename: values.yaml
"#;

/// Returns an `assert_cmd::Command` for the compiled `carchive` binary.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn carchive_cmd() -> Command {
    Command::cargo_bin("carchive").expect("Failed to find carchive binary for testing")
}

/// A scratch workspace with its own configuration, isolated from the
/// developer's user and project config files.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        // Stops the project config search here.
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
        fs::create_dir(dir.path().join("home")).expect("Failed to create fake home");
        fs::write(dir.path().join("carchive.toml"), "").expect("Failed to write config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.path().join("carchive.toml"), content).expect("Failed to write config");
    }

    /// Lays out a component source directory with a descriptor and one blob.
    pub fn source_dir(&self) -> PathBuf {
        let source = self.path().join("source");
        fs::create_dir_all(&source).expect("Failed to create source dir");
        fs::write(source.join("component-descriptor.yaml"), DESCRIPTOR_YAML)
            .expect("Failed to write descriptor");
        fs::write(source.join("values.yaml"), "replicas: 3\n").expect("Failed to write blob");
        source
    }

    /// `carchive` running inside the workspace with isolated configuration.
    pub fn cmd(&self) -> Command {
        let mut cmd = carchive_cmd();
        cmd.current_dir(self.path())
            .env("CARCHIVE_CONFIG", self.path().join("carchive.toml"))
            .env("HOME", self.path().join("home"))
            .env("XDG_CONFIG_HOME", self.path().join("home").join(".config"))
            .env_remove("RUST_LOG");
        cmd
    }
}
