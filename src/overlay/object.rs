//! Resolved overlay entries and their file metadata.

use std::cell::OnceCell;
use std::fs::{self, Metadata};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::extension::Candidate;
use crate::groups::Rank;
use crate::path::prettypath;

/// Metadata of a path taken without following symlinks.
///
/// A path that does not exist yields a `FileStat` for which
/// [`exists`](Self::exists) is false.
#[derive(Debug, Clone)]
pub struct FileStat {
    meta: Option<Metadata>,
}

impl FileStat {
    pub fn lstat(path: &Path) -> Self {
        Self {
            meta: fs::symlink_metadata(path).ok(),
        }
    }

    pub fn exists(&self) -> bool {
        self.meta.is_some()
    }

    pub fn is_dir(&self) -> bool {
        self.meta.as_ref().is_some_and(Metadata::is_dir)
    }

    pub fn is_file(&self) -> bool {
        self.meta.as_ref().is_some_and(Metadata::is_file)
    }

    pub fn is_link(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| m.file_type().is_symlink())
    }

    /// Permission bits, without the file type
    pub fn mode(&self) -> Option<u32> {
        self.meta.as_ref().map(|m| m.mode() & 0o7777)
    }

    pub fn uid(&self) -> Option<u32> {
        self.meta.as_ref().map(MetadataExt::uid)
    }

    pub fn gid(&self) -> Option<u32> {
        self.meta.as_ref().map(MetadataExt::gid)
    }

    pub fn size(&self) -> Option<u64> {
        self.meta.as_ref().map(Metadata::len)
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.meta.as_ref().and_then(|m| m.modified().ok())
    }
}

/// One winning entry of the overlay tree: where it comes from and where it
/// goes. Metadata for both sides is fetched on first use.
#[derive(Debug, Clone)]
pub struct SyncObject {
    pub src_path: PathBuf,
    pub dest_path: PathBuf,
    pub rank: Rank,
    pub is_post: bool,
    pub tagged: bool,
    src_stat: OnceCell<FileStat>,
    dest_stat: OnceCell<FileStat>,
}

impl SyncObject {
    /// Place a classified candidate under its source and destination directories.
    pub fn make(candidate: Candidate, src_dir: &Path, dest_dir: &Path) -> Self {
        Self {
            src_path: src_dir.join(&candidate.src_name),
            dest_path: dest_dir.join(&candidate.dest_name),
            rank: candidate.rank,
            is_post: candidate.is_post,
            tagged: candidate.tagged,
            src_stat: OnceCell::new(),
            dest_stat: OnceCell::new(),
        }
    }

    pub fn src_stat(&self) -> &FileStat {
        self.src_stat.get_or_init(|| FileStat::lstat(&self.src_path))
    }

    pub fn dest_stat(&self) -> &FileStat {
        self.dest_stat.get_or_init(|| FileStat::lstat(&self.dest_path))
    }

    pub fn is_dir(&self) -> bool {
        self.src_stat().is_dir()
    }

    /// Base name of the source entry as it appears on disk
    pub fn src_name(&self) -> &str {
        self.src_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Source path for display; directories get a trailing separator.
    pub fn print_src(&self, masterdir: Option<&Path>) -> String {
        let pretty = prettypath(masterdir, &self.src_path);
        if self.is_dir() {
            format!("{}/", pretty)
        } else {
            pretty
        }
    }
}
