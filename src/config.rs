//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the `fleetsync.yaml`
//! configuration file and the logic for loading and validating it.
//!
//! ## Example
//!
//! ```yaml
//! masterdir: /var/lib/fleetsync
//! num_proc: 8
//! require_extension: true
//! ignore: [".git", "*.swp", "*~"]
//! groups:
//!   web: [frontend, debian]
//! nodes:
//!   n1:
//!     groups: [web]
//!   n2:
//!     groups: [debian]
//!     address: 10.0.0.2
//! ignore_groups: [retired]
//! ```
//!
//! The configuration only *describes* nodes and groups. The ordered list of
//! groups that applies to one node is built by
//! [`GroupModel::for_node`](crate::groups::GroupModel::for_node).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::overlay::{IgnoreRules, WalkOptions};

/// Group implicitly applied to every node, always the least specific one.
pub const GROUP_ALL: &str = "all";

/// Group that is always ignored; tagging a file with it disables the file.
pub const GROUP_NONE: &str = "none";

/// A node definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDef {
    /// Groups this node is a member of, most specific first.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Address used to reach the node, if it differs from its name.
    #[serde(default)]
    pub address: Option<String>,
}

/// The complete `fleetsync.yaml` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the master repository.
    #[serde(default = "default_masterdir")]
    pub masterdir: PathBuf,
    /// Overlay tree, relative to `masterdir` unless absolute.
    #[serde(default = "default_overlay_dir")]
    pub overlay_dir: PathBuf,
    /// Delete tree, relative to `masterdir` unless absolute.
    #[serde(default = "default_delete_dir")]
    pub delete_dir: PathBuf,
    /// Destination root that resolved paths are placed under.
    #[serde(default = "default_dest_root")]
    pub dest_root: PathBuf,
    /// Maximum number of parallel worker processes.
    #[serde(default = "default_num_proc")]
    pub num_proc: usize,
    /// Seconds to sleep between work items. Non-zero forces a single worker.
    #[serde(default)]
    pub sleep_time: u64,
    #[serde(default)]
    pub ignore_dotfiles: bool,
    #[serde(default)]
    pub ignore_dotdirs: bool,
    /// Every overlay file must carry a group tag.
    #[serde(default = "default_require_extension")]
    pub require_extension: bool,
    /// Names to ignore in the overlay tree. Entries with glob metacharacters
    /// are matched as patterns.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Compound groups: group name to member groups.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeDef>,
    /// Groups (or nodes) excluded everywhere.
    #[serde(default)]
    pub ignore_groups: Vec<String>,
}

fn default_masterdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_overlay_dir() -> PathBuf {
    PathBuf::from(defaults::OVERLAY_DIRNAME)
}

fn default_delete_dir() -> PathBuf {
    PathBuf::from(defaults::DELETE_DIRNAME)
}

fn default_dest_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_num_proc() -> usize {
    defaults::NUM_PROC
}

fn default_require_extension() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            masterdir: default_masterdir(),
            overlay_dir: default_overlay_dir(),
            delete_dir: default_delete_dir(),
            dest_root: default_dest_root(),
            num_proc: default_num_proc(),
            sleep_time: 0,
            ignore_dotfiles: false,
            ignore_dotdirs: false,
            require_extension: default_require_extension(),
            ignore: Vec::new(),
            groups: BTreeMap::new(),
            nodes: BTreeMap::new(),
            ignore_groups: Vec::new(),
        }
    }
}

impl Config {
    /// Full path of the overlay tree
    pub fn overlay_path(&self) -> PathBuf {
        self.masterdir.join(&self.overlay_dir)
    }

    /// Full path of the delete tree
    pub fn delete_path(&self) -> PathBuf {
        self.masterdir.join(&self.delete_dir)
    }

    pub fn sleep_duration(&self) -> Duration {
        Duration::from_secs(self.sleep_time)
    }

    /// Compile the `ignore` list into exact names and wildcard patterns.
    pub fn ignore_rules(&self) -> Result<IgnoreRules> {
        IgnoreRules::from_entries(&self.ignore)
    }

    /// Walk options for resolving the overlay tree under this configuration.
    pub fn walk_options(&self) -> Result<WalkOptions> {
        Ok(WalkOptions {
            ignore: self.ignore_rules()?,
            ignore_dotfiles: self.ignore_dotfiles,
            ignore_dotdirs: self.ignore_dotdirs,
            require_extension: self.require_extension,
            dest_root: self.dest_root.clone(),
            masterdir: Some(self.masterdir.clone()),
        })
    }

    /// Every group name known to the fleet: node names, declared compound
    /// groups, every referenced member group, plus `all` and `none`.
    pub fn all_groups(&self) -> BTreeSet<String> {
        let mut all: BTreeSet<String> = self.nodes.keys().cloned().collect();
        for (group, members) in &self.groups {
            all.insert(group.clone());
            all.extend(members.iter().cloned());
        }
        for node in self.nodes.values() {
            all.extend(node.groups.iter().cloned());
        }
        all.extend(self.ignore_groups.iter().cloned());
        all.insert(GROUP_ALL.to_string());
        all.insert(GROUP_NONE.to_string());
        all
    }

    /// Check whether a node or group has been excluded by `ignore_groups`
    pub fn is_ignored(&self, name: &str) -> bool {
        name == GROUP_NONE || self.ignore_groups.iter().any(|g| g == name)
    }

    /// Check names and cross references.
    pub fn validate(&self) -> Result<()> {
        let valid_name = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$")?;

        let check = |kind: &str, name: &str| -> Result<()> {
            if valid_name.is_match(name) {
                Ok(())
            } else {
                Err(Error::ConfigParse {
                    message: format!("invalid {} name '{}'", kind, name),
                    hint: Some(
                        "Names may contain letters, digits, '-' and '_' only; \
                         a '.' would clash with the group extension syntax"
                            .to_string(),
                    ),
                })
            }
        };

        for (node, def) in &self.nodes {
            check("node", node)?;
            if self.groups.contains_key(node) {
                return Err(Error::ConfigParse {
                    message: format!("{} is defined both as a node and as a group", node),
                    hint: None,
                });
            }
            for group in &def.groups {
                check("group", group)?;
                if self.nodes.contains_key(group) {
                    return Err(Error::ConfigParse {
                        message: format!(
                            "node {} lists {} as a group, but it is a node",
                            node, group
                        ),
                        hint: Some("A group list can not contain node names".to_string()),
                    });
                }
            }
        }

        for (group, members) in &self.groups {
            check("group", group)?;
            if members.is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("compound group {} has no members", group),
                    hint: None,
                });
            }
            for member in members {
                check("group", member)?;
                if self.nodes.contains_key(member) {
                    return Err(Error::ConfigParse {
                        message: format!("compound group {} contains node {}", group, member),
                        hint: Some("Compound groups can not contain node names".to_string()),
                    });
                }
            }
        }

        if self.num_proc == 0 {
            return Err(Error::ConfigParse {
                message: "num_proc must be at least 1".to_string(),
                hint: None,
            });
        }

        Ok(())
    }
}

/// Parse and validate a YAML configuration string.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let config: Config = if yaml_content.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(yaml_content)?
    };
    config.validate()?;
    Ok(config)
}

/// Load a configuration file.
///
/// A relative `masterdir` is taken relative to the directory holding the
/// configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let mut config = parse(&content)?;

    if config.masterdir.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.masterdir = base.join(&config.masterdir);
    }

    Ok(config)
}
