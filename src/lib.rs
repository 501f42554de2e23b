//! # fleetsync
//!
//! This library holds the core of the `fleetsync` tool, which distributes
//! configuration files from a master repository to a fleet of hosts.
//!
//! ## Quick Example
//!
//! ```
//! use fleetsync::groups::GroupModel;
//! use fleetsync::overlay::{Resolver, WalkOptions};
//!
//! let overlay = tempfile::tempdir().unwrap();
//! std::fs::create_dir_all(overlay.path().join("all/etc")).unwrap();
//! std::fs::write(overlay.path().join("all/etc/motd._all"), "generic").unwrap();
//! std::fs::write(overlay.path().join("all/etc/motd._web"), "web").unwrap();
//!
//! let groups = GroupModel::new(["n1", "web", "all"], ["n2"]);
//! let options = WalkOptions::default();
//! let mut resolver = Resolver::new(&groups, &options);
//!
//! let motd = resolver
//!     .find(overlay.path(), std::path::Path::new("/etc/motd"))
//!     .unwrap()
//!     .unwrap();
//! assert!(motd.src_path.ends_with("all/etc/motd._web"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the `fleetsync.yaml` schema: master
//!   directory, ignore lists, nodes and (compound) groups.
//! - **Groups (`groups`)**: the ordered group list of one node. A group's
//!   position is its rank; rank 0 is the node itself.
//! - **Overlay (`overlay`)**: resolves the overlay tree to one source per
//!   destination, along with the post-apply scripts of each directory.
//! - **Parallel (`parallel`)**: runs a unit of work per item across a bounded
//!   number of forked worker processes.
//!
//! ## Execution Flow
//!
//! 1. Load the configuration and build the node's [`groups::GroupModel`].
//! 2. Walk the overlay tree with an [`overlay::Resolver`], handing every
//!    winning entry to a visitor.
//! 3. Turn the result into units of work and fan them out with a
//!    [`parallel::Distributor`].

pub mod config;
pub mod defaults;
pub mod error;
pub mod groups;
pub mod output;
pub mod overlay;
pub mod parallel;
pub mod path;
pub mod suggestions;

#[cfg(test)]
mod overlay_proptest;
