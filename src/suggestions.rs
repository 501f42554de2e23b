//! # Error Suggestions
//!
//! Helpers that build error messages with hints. An error should tell the
//! user what went wrong and how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fleetsync::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::fmt::Write as _;
use std::path::Path;

use crate::overlay::SyncObject;

/// Generate an error for when the configuration file is not found.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a fleetsync.yaml file in your master directory\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set FLEETSYNC_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for a node the configuration does not define.
///
/// Suggests a close match from the known nodes, if there is one.
pub fn unknown_node(node: &str, known: &[&str]) -> anyhow::Error {
    let did_you_mean = find_similar(node, known)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "No such node: {node}{did_you_mean}\n\n\
         hint: Run 'fleetsync list nodes' to see the configured nodes\n\
         hint: Add the node under 'nodes:' in fleetsync.yaml"
    )
}

/// Generate an error for an unknown group given on the command line.
pub fn unknown_group(group: &str, known: &[&str]) -> anyhow::Error {
    let did_you_mean = find_similar(group, known)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "No such group: {group}{did_you_mean}\n\n\
         hint: Run 'fleetsync list groups' to see the known groups"
    )
}

/// Generate an error for an invalid glob pattern.
pub fn invalid_glob(pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid ignore pattern: {pattern}\n\
         error: {error}\n\n\
         hint: Use * and ? as wildcards, [abc] for character classes\n\
         hint: Entries without wildcards are matched as exact names"
    )
}

/// Generate an error for a group cycle in the configuration.
pub fn cycle_detected(cycle: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Cycle detected in group definitions: {cycle}\n\n\
         hint: Remove one of the member groups to break the cycle"
    )
}

/// Generate an error for a terse path that matches several destinations.
///
/// Candidates are numbered in discovery order.
pub fn ambiguous_terse(path: &str, candidates: &[SyncObject]) -> anyhow::Error {
    let mut listing = String::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(listing, "  {}. {}", i + 1, candidate.dest_path.display());
    }

    anyhow::anyhow!(
        "Ambiguous path: {path} matches {count} destinations\n\
         {listing}\n\
         hint: Use a longer suffix after '...' to narrow the match\n\
         hint: Run from an interactive terminal to choose one",
        count = candidates.len()
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a_len][b_len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::extension::Candidate;

    #[test]
    fn test_config_not_found_includes_hints() {
        let path = Path::new("/srv/master/fleetsync.yaml");
        let message = config_not_found(path).to_string();

        assert!(message.contains("Configuration file not found"));
        assert!(message.contains("/srv/master/fleetsync.yaml"));
        assert!(message.contains("-c/--config"));
        assert!(message.contains("FLEETSYNC_CONFIG"));
    }

    #[test]
    fn test_unknown_node_suggests_similar() {
        let message = unknown_node("web01", &["web1", "db1"]).to_string();
        assert!(message.contains("No such node: web01"));
        assert!(message.contains("Did you mean 'web1'?"));

        let message = unknown_node("mailhost", &["web1", "db1"]).to_string();
        assert!(!message.contains("Did you mean"));
    }

    #[test]
    fn test_unknown_group_lists_hint() {
        let message = unknown_group("debain", &["debian", "web"]).to_string();
        assert!(message.contains("Did you mean 'debian'?"));
        assert!(message.contains("fleetsync list groups"));
    }

    #[test]
    fn test_cycle_detected_includes_hints() {
        let message = cycle_detected("a -> b -> a").to_string();
        assert!(message.contains("a -> b -> a"));
        assert!(message.contains("break the cycle"));
    }

    #[test]
    fn test_ambiguous_terse_numbers_candidates() {
        let make = |dir: &str| {
            SyncObject::make(
                Candidate {
                    src_name: "ntp.conf._all".to_string(),
                    dest_name: "ntp.conf".to_string(),
                    rank: 1,
                    is_post: false,
                    tagged: true,
                },
                Path::new("/m/overlay/all"),
                Path::new(dir),
            )
        };
        let candidates = vec![make("/etc"), make("/usr/local/etc")];
        let message = ambiguous_terse(".../etc/ntp.conf", &candidates).to_string();

        assert!(message.contains("matches 2 destinations"));
        assert!(message.contains("  1. /etc/ntp.conf"));
        assert!(message.contains("  2. /usr/local/etc/ntp.conf"));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("web1", "web1"), 0);
        assert_eq!(edit_distance("web01", "web1"), 1);
        assert_eq!(edit_distance("debain", "debian"), 2);
        assert_eq!(edit_distance("", "abc"), 3);
    }
}
