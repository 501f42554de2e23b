//! Depth-first resolution of the overlay tree.
//!
//! The overlay directory holds one subdirectory per group. Those roots are
//! visited most specific first, and inside every directory the entries are
//! ordered post-scripts first, then by rank. The first entry to claim a
//! destination wins; the claim set is shared by the whole walk, across
//! subdirectories and across roots.
//!
//! Same-rank duplicates that live in different directories are therefore
//! decided by traversal order alone. Given
//!
//! ```text
//! overlay/all/etc._n1/ntp.conf._n1
//! overlay/n1/etc/ntp.conf._n1
//! ```
//!
//! the `n1` root is walked first and its entry wins, even though both have
//! rank 0. Existing trees depend on this, so it is kept as is.

use std::collections::HashSet;
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use log::{debug, error};

use super::extension::{classify, Classification};
use super::object::SyncObject;
use super::{Defect, IgnoreMatch, PostScripts, Visitor, WalkOptions};
use crate::error::Result;
use crate::groups::GroupModel;
use crate::path::prettypath;

/// A resolver session: one group model, one set of walk options, and the
/// claimed-destination set of the walk in progress.
#[derive(Debug)]
pub struct Resolver<'a> {
    groups: &'a GroupModel,
    options: &'a WalkOptions,
    claimed: HashSet<PathBuf>,
    defects: Vec<Defect>,
}

impl<'a> Resolver<'a> {
    pub fn new(groups: &'a GroupModel, options: &'a WalkOptions) -> Self {
        Self {
            groups,
            options,
            claimed: HashSet::new(),
            defects: Vec::new(),
        }
    }

    pub fn groups(&self) -> &GroupModel {
        self.groups
    }

    pub fn options(&self) -> &WalkOptions {
        self.options
    }

    /// Configuration defects reported so far, in the order they were found.
    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    pub fn has_defects(&self) -> bool {
        !self.defects.is_empty()
    }

    fn pretty(&self, path: &Path) -> String {
        prettypath(self.options.masterdir.as_deref(), path)
    }

    /// The group roots under `overlay` that apply to this node, most
    /// specific first. Directories not named after one of the node's groups
    /// are skipped.
    pub fn roots(&self, overlay: &Path) -> Result<Vec<PathBuf>> {
        let mut roots = Vec::new();
        for entry in fs::read_dir(overlay)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name();
            let rank = name.to_str().and_then(|n| self.groups.rank(n));
            match rank {
                Some(rank) if path.is_dir() => roots.push((rank, path)),
                Some(_) => debug!("{} is not a directory, skipping", self.pretty(&path)),
                None => debug!("{}/ is not one of my groups, skipping", self.pretty(&path)),
            }
        }
        roots.sort_by_key(|(rank, _)| *rank);
        Ok(roots.into_iter().map(|(_, path)| path).collect())
    }

    /// Visit every winning entry of the overlay tree.
    ///
    /// The claimed-destination set is reset once, then shared across all
    /// roots. Defects found along the way are recorded and the walk goes on.
    pub fn visit<V: Visitor + ?Sized>(&mut self, overlay: &Path, visitor: &mut V) -> Result<()> {
        self.claimed.clear();
        let dest_root = self.options.dest_root.clone();
        for root in self.roots(overlay)? {
            if self.walk_subtree(&root, &dest_root, visitor)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Classify the entries of one directory and sort them post-first, then
    /// by rank. Listing order is by name so that equal keys stay stable.
    fn scan(&mut self, src_dir: &Path, dest_dir: &Path) -> Result<Vec<SyncObject>> {
        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(src_dir)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => error!(
                    "skipping {}: name is not valid UTF-8",
                    self.pretty(&src_dir.join(name))
                ),
            }
        }
        names.sort();

        let mut objects = Vec::with_capacity(names.len());
        for name in names {
            match self.options.ignore.matches(&name) {
                Some(IgnoreMatch::Exact) => {
                    debug!("ignoring {}", self.pretty(&src_dir.join(&name)));
                    continue;
                }
                Some(IgnoreMatch::Pattern(pattern)) => {
                    debug!(
                        "ignoring {} (pattern match {})",
                        self.pretty(&src_dir.join(&name)),
                        pattern
                    );
                    continue;
                }
                None => {}
            }

            match classify(&name, self.groups) {
                Classification::Entry(candidate) => {
                    objects.push(SyncObject::make(candidate, src_dir, dest_dir));
                }
                Classification::NotMine { .. } => {
                    debug!(
                        "skipping {}, it is not one of my groups",
                        self.pretty(&src_dir.join(&name))
                    );
                }
                Classification::UnknownGroup { .. } => {
                    self.report(Defect::UnknownGroup {
                        path: src_dir.join(&name),
                    });
                }
            }
        }

        objects.sort_by_key(|obj| (!obj.is_post, obj.rank));
        Ok(objects)
    }

    fn report(&mut self, defect: Defect) {
        match &defect {
            Defect::UnknownGroup { path } => {
                error!("unknown group on {}, skipped", self.pretty(path));
            }
            Defect::MissingGroupTag { path } => {
                error!("no group extension on {}, skipped", self.pretty(path));
            }
        }
        self.defects.push(defect);
    }

    fn walk_subtree<V: Visitor + ?Sized>(
        &mut self,
        src_dir: &Path,
        dest_dir: &Path,
        visitor: &mut V,
    ) -> Result<ControlFlow<()>> {
        let objects = self.scan(src_dir, dest_dir)?;
        let mut post = PostScripts::new();

        for obj in objects {
            if obj.is_post {
                post.register(obj.dest_path, obj.src_path);
                continue;
            }

            if obj.is_dir() {
                if self.options.ignore_dotdirs && obj.src_name().starts_with('.') {
                    debug!("ignoring dotdir {}", self.pretty_src(&obj));
                    continue;
                }

                if self
                    .walk_subtree(&obj.src_path, &obj.dest_path, visitor)?
                    .is_break()
                {
                    return Ok(ControlFlow::Break(()));
                }

                // the directory itself, after its contents
                if visitor.visit(&obj, &post).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
                continue;
            }

            if self.options.ignore_dotfiles && obj.src_name().starts_with('.') {
                debug!("ignoring dotfile {}", self.pretty_src(&obj));
                continue;
            }

            if self.options.require_extension && !obj.tagged {
                self.report(Defect::MissingGroupTag {
                    path: obj.src_path.clone(),
                });
                continue;
            }

            if !self.claimed.insert(obj.dest_path.clone()) {
                // an earlier entry already won this destination
                continue;
            }

            if visitor.visit(&obj, &post).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn pretty_src(&self, obj: &SyncObject) -> String {
        obj.print_src(self.options.masterdir.as_deref())
    }
}
