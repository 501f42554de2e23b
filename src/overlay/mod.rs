//! # Overlay Tree Resolution
//!
//! The overlay tree is where the master repository keeps the files it
//! distributes. Its top level holds one directory per group; below that, file
//! and directory names carry group tags as pseudo-extensions:
//!
//! ```text
//! overlay/
//!   all/etc/ntp.conf._all         every node
//!   all/etc/ntp.conf._web         members of group "web"
//!   all/etc/ntp.conf.post         runs after /etc/ntp.conf changed
//!   n1/etc/motd._n1               node n1 only
//! ```
//!
//! For each destination the resolver picks exactly one source, the most
//! specific one it meets first, and hands it to a [`Visitor`] together with
//! the post-apply scripts registered for the current directory level.
//!
//! ## Modules
//!
//! - [`extension`]: turns an entry name into destination name, rank and role.
//! - [`ignore`]: exact and wildcard ignore lists.
//! - [`object`]: the resolved [`SyncObject`] and its lazy metadata.
//! - [`walk`]: the depth-first [`Resolver`].
//! - [`lookup`]: point lookups and terse (suffix) lookups.

pub mod extension;
pub mod ignore;
pub mod lookup;
pub mod object;
pub mod walk;

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub use ignore::{IgnoreMatch, IgnoreRules};
pub use lookup::Lookup;
pub use object::{FileStat, SyncObject};
pub use walk::Resolver;

/// Options controlling one walk of the overlay tree
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub ignore: IgnoreRules,
    pub ignore_dotfiles: bool,
    pub ignore_dotdirs: bool,
    /// Report untagged files as defects instead of using them
    pub require_extension: bool,
    /// Destination paths are resolved below this directory
    pub dest_root: PathBuf,
    /// Used to abbreviate paths in diagnostics
    pub masterdir: Option<PathBuf>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            ignore: IgnoreRules::new(),
            ignore_dotfiles: false,
            ignore_dotdirs: false,
            require_extension: false,
            dest_root: PathBuf::from("/"),
            masterdir: None,
        }
    }
}

/// A configuration mistake found in the overlay tree.
///
/// Defects are reported and the offending entry is skipped; the walk itself
/// carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    #[error("unknown group on {}", path.display())]
    UnknownGroup { path: PathBuf },

    #[error("no group extension on {}", path.display())]
    MissingGroupTag { path: PathBuf },
}

/// Post-apply scripts of one directory level, keyed by destination path.
#[derive(Debug, Clone, Default)]
pub struct PostScripts {
    scripts: HashMap<PathBuf, PathBuf>,
}

impl PostScripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `script` for `dest` unless a script was registered first.
    ///
    /// Returns false if the destination already had one.
    pub fn register(&mut self, dest: PathBuf, script: PathBuf) -> bool {
        if self.scripts.contains_key(&dest) {
            return false;
        }
        self.scripts.insert(dest, script);
        true
    }

    pub fn get(&self, dest: &Path) -> Option<&Path> {
        self.scripts.get(dest).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Receives every winning entry of a walk.
///
/// Returning `ControlFlow::Break` stops the whole walk at once.
pub trait Visitor {
    fn visit(&mut self, obj: &SyncObject, post: &PostScripts) -> ControlFlow<()>;
}

impl<F> Visitor for F
where
    F: FnMut(&SyncObject, &PostScripts) -> ControlFlow<()>,
{
    fn visit(&mut self, obj: &SyncObject, post: &PostScripts) -> ControlFlow<()> {
        self(obj, post)
    }
}

/// A resolved entry paired with its post-apply script
#[derive(Debug, Clone)]
pub struct Resolved {
    pub object: SyncObject,
    pub post_script: Option<PathBuf>,
}

/// Serializable summary of a [`Resolved`] entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord {
    pub dest: PathBuf,
    pub src: PathBuf,
    pub is_dir: bool,
    pub rank: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_script: Option<PathBuf>,
}

impl From<&Resolved> for ResolvedRecord {
    fn from(resolved: &Resolved) -> Self {
        Self {
            dest: resolved.object.dest_path.clone(),
            src: resolved.object.src_path.clone(),
            is_dir: resolved.object.is_dir(),
            rank: resolved.object.rank,
            post_script: resolved.post_script.clone(),
        }
    }
}

impl Resolver<'_> {
    /// Walk the whole tree and return every winning entry in visiting order.
    pub fn collect(&mut self, overlay: &Path) -> crate::error::Result<Vec<Resolved>> {
        let mut resolved = Vec::new();
        self.visit(overlay, &mut |obj: &SyncObject, post: &PostScripts| {
            resolved.push(Resolved {
                object: obj.clone(),
                post_script: post.get(&obj.dest_path).map(Path::to_path_buf),
            });
            ControlFlow::Continue(())
        })?;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_scripts_first_registration_wins() {
        let mut post = PostScripts::new();
        assert!(post.register(PathBuf::from("/etc/motd"), PathBuf::from("a.post._n1")));
        assert!(!post.register(PathBuf::from("/etc/motd"), PathBuf::from("a.post")));
        assert_eq!(post.get(Path::new("/etc/motd")), Some(Path::new("a.post._n1")));
        assert_eq!(post.get(Path::new("/etc/hosts")), None);
        assert_eq!(post.len(), 1);
    }

    #[test]
    fn test_defect_display() {
        let defect = Defect::MissingGroupTag {
            path: PathBuf::from("/m/overlay/all/motd"),
        };
        assert_eq!(defect.to_string(), "no group extension on /m/overlay/all/motd");
    }

    #[test]
    fn test_closure_is_visitor() {
        let mut count = 0;
        let mut visitor = |_: &SyncObject, _: &PostScripts| {
            count += 1;
            ControlFlow::Continue(())
        };
        let obj = SyncObject::make(
            extension::Candidate {
                src_name: "motd._all".to_string(),
                dest_name: "motd".to_string(),
                rank: 0,
                is_post: false,
                tagged: true,
            },
            Path::new("/m"),
            Path::new("/"),
        );
        assert!(Visitor::visit(&mut visitor, &obj, &PostScripts::new()).is_continue());
        assert_eq!(count, 1);
    }
}
