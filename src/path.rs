//! Path manipulation utilities for fleetsync

use std::path::Path;

/// Marker separating the ignored prefix of a terse path from its suffix.
pub const TERSE_MARKER: &str = "...";

/// Render `path` for diagnostics, abbreviating the master directory.
///
/// `/var/lib/fleetsync/overlay/all/etc` becomes `$masterdir/overlay/all/etc`
/// when the master directory is `/var/lib/fleetsync`.
pub fn prettypath(masterdir: Option<&Path>, path: &Path) -> String {
    match masterdir.and_then(|master| path.strip_prefix(master).ok()) {
        Some(rel) if rel.as_os_str().is_empty() => "$masterdir".to_string(),
        Some(rel) => format!("$masterdir/{}", rel.display()),
        None => path.display().to_string(),
    }
}

/// Split a terse path at its marker.
///
/// Returns the suffix to match, or `None` if `path` is not terse.
pub fn terse_suffix(path: &str) -> Option<&str> {
    path.find(TERSE_MARKER)
        .map(|idx| &path[idx + TERSE_MARKER.len()..])
}

/// Check whether `dest` ends with `suffix` and is strictly longer than it.
///
/// The last character is compared first; most candidates fail there.
pub fn ends_with_suffix(dest: &str, suffix: &str) -> bool {
    if dest.len() <= suffix.len() {
        return false;
    }
    match (dest.as_bytes().last(), suffix.as_bytes().last()) {
        (Some(a), Some(b)) if a != b => false,
        _ => dest.ends_with(suffix),
    }
}
