//! # Group Precedence Model
//!
//! A node is a member of an ordered list of groups, most specific first: the
//! node's own name, then the groups it was given in the configuration (with
//! compound groups expanded in place), then `all`. A group's position in that
//! list is its *rank*. Rank 0 wins over everything else.
//!
//! [`GroupModel::generic`] is the sentinel rank assigned to overlay entries
//! that carry no group tag. It equals the number of ranked groups, so it is
//! always less specific than any real group.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::{Config, GROUP_ALL};
use crate::error::{Error, Result};

/// Precedence rank of a group; lower is more specific.
pub type Rank = usize;

/// Ordered groups for one node plus the universe of valid group names.
#[derive(Debug, Clone)]
pub struct GroupModel {
    ranked: Vec<String>,
    index: HashMap<String, Rank>,
    universe: HashSet<String>,
}

impl GroupModel {
    /// Build a model from an ordered group list and the fleet-wide universe.
    ///
    /// Ranked groups are always part of the universe. Duplicates in `ranked`
    /// keep their first (most specific) position.
    pub fn new<I, J, S, T>(ranked: I, universe: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        let mut index = HashMap::new();
        for group in ranked {
            let group = group.into();
            if !index.contains_key(&group) {
                index.insert(group.clone(), list.len());
                list.push(group);
            }
        }

        let mut universe: HashSet<String> = universe.into_iter().map(Into::into).collect();
        universe.extend(list.iter().cloned());

        Self {
            ranked: list,
            index,
            universe,
        }
    }

    /// Build the precedence model for `node` from the configuration.
    pub fn for_node(config: &Config, node: &str) -> Result<Self> {
        let def = config.nodes.get(node).ok_or_else(|| Error::UnknownNode {
            node: node.to_string(),
        })?;

        let mut ordered = vec![node.to_string()];
        for group in &def.groups {
            expand_group(config, group, &mut Vec::new(), &mut ordered)?;
        }
        ordered.push(GROUP_ALL.to_string());
        ordered.retain(|g| !config.is_ignored(g));

        Ok(Self::new(ordered, config.all_groups()))
    }

    /// Rank of `group` for this node, if the node is a member of it.
    pub fn rank(&self, group: &str) -> Option<Rank> {
        self.index.get(group).copied()
    }

    /// Sentinel rank for untagged entries, least specific of all.
    pub fn generic(&self) -> Rank {
        self.ranked.len()
    }

    /// Whether `group` exists anywhere in the fleet
    pub fn is_known(&self, group: &str) -> bool {
        self.universe.contains(group)
    }

    /// The ranked groups, most specific first.
    pub fn groups(&self) -> &[String] {
        &self.ranked
    }

    /// The universe of valid group names, sorted.
    pub fn universe(&self) -> BTreeSet<&str> {
        self.universe.iter().map(String::as_str).collect()
    }
}

/// Expand a (possibly compound) group into `out`, preorder, skipping
/// groups already present.
fn expand_group(
    config: &Config,
    group: &str,
    stack: &mut Vec<String>,
    out: &mut Vec<String>,
) -> Result<()> {
    if stack.iter().any(|g| g == group) {
        let mut cycle = stack.clone();
        cycle.push(group.to_string());
        return Err(Error::CycleDetected {
            cycle: cycle.join(" -> "),
        });
    }

    if !out.iter().any(|g| g == group) {
        out.push(group.to_string());
    }

    if let Some(members) = config.groups.get(group) {
        stack.push(group.to_string());
        for member in members {
            expand_group(config, member, stack, out)?;
        }
        stack.pop();
    }

    Ok(())
}

/// Nodes that are members of any of `groups`, sorted by name.
///
/// A node name counts as a group containing just that node.
pub fn nodes_in_groups(config: &Config, groups: &[String]) -> Result<Vec<String>> {
    let mut nodes = Vec::new();
    for node in config.nodes.keys() {
        if config.is_ignored(node) {
            continue;
        }
        let model = GroupModel::for_node(config, node)?;
        if groups.iter().any(|g| model.rank(g).is_some()) {
            nodes.push(node.clone());
        }
    }
    Ok(nodes)
}
