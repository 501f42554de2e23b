//! Classification of overlay entry names.
//!
//! An overlay entry name carries its group as a pseudo-extension:
//! `ntp.conf._web` is `ntp.conf` for members of group `web`. A `.post`
//! extension marks a script that runs after its destination was updated,
//! either generic (`ntp.conf.post`) or group-specific (`ntp.conf.post._web`,
//! equivalently `ntp.conf._web.post`).

use crate::groups::{GroupModel, Rank};

/// Two-character prefix that turns an extension into a group tag.
pub const TAG_MARKER: &str = "._";

/// Extension marking a post-apply script.
pub const POST_EXT: &str = ".post";

/// A classified entry name that is relevant for this node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Entry name as found on disk
    pub src_name: String,
    /// Name at the destination, without tag or `.post`
    pub dest_name: String,
    pub rank: Rank,
    pub is_post: bool,
    /// False when the name had no recognized group tag
    pub tagged: bool,
}

/// Outcome of classifying one entry name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Entry(Candidate),
    /// Tagged with a real group this node is not a member of
    NotMine { group: String },
    /// Tagged with a group that exists nowhere in the fleet
    UnknownGroup { group: String },
}

/// Split a name into base and extension the way `splitext` does.
///
/// The extension starts at the last `.`; leading dots belong to the base,
/// so `.bashrc` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if !name[..idx].bytes().all(|b| b == b'.') => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// The group named by a tag extension, if the extension is a non-empty tag.
fn tag_of(ext: &str) -> Option<&str> {
    ext.strip_prefix(TAG_MARKER).filter(|tag| !tag.is_empty())
}

/// Classify a bare directory-entry name against the node's groups.
pub fn classify(name: &str, groups: &GroupModel) -> Classification {
    let (base, ext) = split_extension(name);

    if ext.is_empty() {
        return untagged(name, name, groups);
    }

    if ext == POST_EXT {
        // name._group.post is the same script as name.post._group
        let (inner, inner_ext) = split_extension(base);
        if let Some(tag) = tag_of(inner_ext) {
            return tagged(name, inner, tag, true, groups);
        }
        return Classification::Entry(Candidate {
            src_name: name.to_string(),
            dest_name: base.to_string(),
            rank: groups.generic(),
            is_post: true,
            tagged: false,
        });
    }

    match tag_of(ext) {
        Some(tag) => {
            let (inner, inner_ext) = split_extension(base);
            if inner_ext == POST_EXT {
                tagged(name, inner, tag, true, groups)
            } else {
                tagged(name, base, tag, false, groups)
            }
        }
        None => untagged(name, name, groups),
    }
}

fn untagged(src: &str, dest: &str, groups: &GroupModel) -> Classification {
    Classification::Entry(Candidate {
        src_name: src.to_string(),
        dest_name: dest.to_string(),
        rank: groups.generic(),
        is_post: false,
        tagged: false,
    })
}

fn tagged(src: &str, dest: &str, tag: &str, is_post: bool, groups: &GroupModel) -> Classification {
    match groups.rank(tag) {
        Some(rank) => Classification::Entry(Candidate {
            src_name: src.to_string(),
            dest_name: dest.to_string(),
            rank,
            is_post,
            tagged: true,
        }),
        None if groups.is_known(tag) => Classification::NotMine {
            group: tag.to_string(),
        },
        None => Classification::UnknownGroup {
            group: tag.to_string(),
        },
    }
}
