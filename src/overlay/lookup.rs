//! Point lookups in the overlay tree.
//!
//! [`Resolver::find`] stops the walk at the first entry whose destination
//! equals the target. A *terse* path such as `.../ntp.conf` names a
//! destination by its ending instead; [`Resolver::find_by_suffix`] walks the
//! whole tree and refuses to guess when more than one destination matches.

use std::ops::ControlFlow;
use std::path::Path;

use super::{PostScripts, Resolver, SyncObject};
use crate::error::Result;
use crate::path::{ends_with_suffix, terse_suffix};

/// Result of a lookup
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(SyncObject),
    NotFound,
    /// Every matching entry, in discovery order
    Ambiguous(Vec<SyncObject>),
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<SyncObject> {
        match self {
            Lookup::Found(obj) => Some(obj),
            _ => None,
        }
    }
}

impl Resolver<'_> {
    /// Find the winning entry for exactly `dest`.
    pub fn find(&mut self, overlay: &Path, dest: &Path) -> Result<Option<SyncObject>> {
        let mut found = None;
        self.visit(overlay, &mut |obj: &SyncObject, _: &PostScripts| {
            if obj.dest_path == dest {
                found = Some(obj.clone());
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        Ok(found)
    }

    /// Find the unique entry whose destination ends with `suffix` and is
    /// longer than it.
    pub fn find_by_suffix(&mut self, overlay: &Path, suffix: &str) -> Result<Lookup> {
        let mut matches: Vec<SyncObject> = Vec::new();
        for resolved in self.collect(overlay)? {
            let is_match = ends_with_suffix(&resolved.object.dest_path.to_string_lossy(), suffix);
            if is_match {
                matches.push(resolved.object);
            }
        }

        Ok(match matches.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matches.remove(0)),
            _ => Lookup::Ambiguous(matches),
        })
    }

    /// Resolve a destination given either in full or in terse form.
    ///
    /// Text after the `...` marker is matched as a suffix; a path without
    /// the marker is looked up exactly.
    pub fn find_terse(&mut self, overlay: &Path, path: &str) -> Result<Lookup> {
        match terse_suffix(path) {
            Some(suffix) => self.find_by_suffix(overlay, suffix),
            None => Ok(match self.find(overlay, Path::new(path))? {
                Some(obj) => Lookup::Found(obj),
                None => Lookup::NotFound,
            }),
        }
    }
}
