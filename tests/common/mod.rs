//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_config(configs::FLEET)
//!         .with_overlay_file("all/etc/motd._all", "hello");
//!     fixture.command().arg("ls").arg("-n").arg("n1").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// A small fleet: two web nodes, a database node, and a compound group.
    pub const FLEET: &str = r#"
require_extension: true
ignore: [".git", "*.swp"]
groups:
  web: [debian]
nodes:
  web1:
    groups: [web]
  web2:
    groups: [web]
    address: 10.0.0.12
  db1:
    groups: [debian, db]
"#;

    /// Same fleet, but untagged overlay files are accepted.
    pub const LENIENT: &str = r#"
require_extension: false
groups:
  web: [debian]
nodes:
  web1:
    groups: [web]
  db1:
    groups: [debian, db]
"#;

    /// Compound groups that refer to each other.
    pub const CYCLE: &str = r#"
groups:
  a: [b]
  b: [a]
nodes:
  n1:
    groups: [a]
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "nodes: [unclosed";

    /// A field the configuration does not know about.
    pub const UNKNOWN_FIELD: &str = "masterdirectory: /srv\n";
}

/// A master directory with `fleetsync.yaml` and an overlay tree.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `fleetsync.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("fleetsync.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file below `overlay/`.
    pub fn with_overlay_file(self, path: &str, content: &str) -> Self {
        self.with_file(&format!("overlay/{path}"), content)
    }

    /// Add a file below `delete/`.
    #[allow(dead_code)]
    pub fn with_delete_file(self, path: &str) -> Self {
        self.with_file(&format!("delete/{path}"), "")
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("fleetsync.yaml")
    }

    /// Create a command running in this fixture's directory, so that the
    /// default `fleetsync.yaml` is found.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fleetsync");
        cmd.current_dir(self.path())
            .env_remove("FLEETSYNC_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_layout() {
        let fixture = TestFixture::new()
            .with_config(configs::FLEET)
            .with_overlay_file("all/etc/motd._all", "hi");
        assert!(fixture.config_path().exists());
        assert!(fixture.path().join("overlay/all/etc/motd._all").exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [configs::FLEET, configs::LENIENT, configs::CYCLE] {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
        assert!(serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML).is_err());
    }
}
