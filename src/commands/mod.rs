//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `fleetsync` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the shared [`Context`] and the parsed
//!   `Args`, calls into the `fleetsync` library, and returns the exit status.

pub mod completions;
pub mod find;
pub mod list;
pub mod ls;
pub mod run;

use std::path::PathBuf;

use anyhow::Result;
use fleetsync::config::{self, Config};
use fleetsync::defaults;
use fleetsync::error::Error;
use fleetsync::groups::GroupModel;
use fleetsync::output::OutputConfig;
use fleetsync::overlay::WalkOptions;
use fleetsync::suggestions;

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: PathBuf,
    pub output: OutputConfig,
}

impl Context {
    /// Load and validate the configuration file.
    pub fn load_config(&self) -> Result<Config> {
        let path = &self.config_path;
        if !path.exists() {
            return Err(suggestions::config_not_found(path));
        }

        config::from_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e)
        })
    }
}

/// The precedence model of `node`, or of this host when no node is given.
pub fn node_model(config: &Config, node: Option<&str>) -> Result<(String, GroupModel)> {
    let node = node.map_or_else(defaults::local_nodename, str::to_string);
    match GroupModel::for_node(config, &node) {
        Ok(model) => Ok((node, model)),
        Err(Error::UnknownNode { node }) => {
            let known: Vec<&str> = config.nodes.keys().map(String::as_str).collect();
            Err(suggestions::unknown_node(&node, &known))
        }
        Err(Error::CycleDetected { cycle }) => Err(suggestions::cycle_detected(&cycle)),
        Err(err) => Err(err.into()),
    }
}

/// Walk options from the configuration, naming the bad ignore pattern if
/// one does not compile.
pub fn walk_options(config: &Config) -> Result<WalkOptions> {
    config.walk_options().map_err(|err| {
        let bad = config
            .ignore
            .iter()
            .find_map(|entry| glob::Pattern::new(entry).err().map(|e| (entry, e)));
        match bad {
            Some((entry, e)) => suggestions::invalid_glob(entry, &e),
            None => err.into(),
        }
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::Context;
    use fleetsync::output::OutputConfig;

    pub const CONFIG: &str = r#"
require_extension: true
groups:
  web: [debian]
nodes:
  n1:
    groups: [web]
  n2:
    groups: [debian]
    address: 10.0.0.2
"#;

    /// A master directory holding `fleetsync.yaml` and an overlay tree.
    pub fn master(config: &str, files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("fleetsync.yaml"), config).unwrap();
        for rel in files {
            let path = temp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, *rel).unwrap();
        }
        temp
    }

    pub fn context(master: &Path) -> Context {
        Context {
            config_path: master.join("fleetsync.yaml"),
            output: OutputConfig::without_color(),
        }
    }
}
