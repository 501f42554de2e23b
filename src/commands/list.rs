//! # List Command Implementation
//!
//! Queries against the node and group definitions in `fleetsync.yaml`:
//!
//! - `list nodes`: every configured node, with its address if it has one
//! - `list groups`: the universe of group names known to the fleet
//! - `list node-groups NODE`: the node's groups, most specific first
//! - `list group-nodes GROUP`: the nodes that are members of a group

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Subcommand};

use fleetsync::config::Config;
use fleetsync::groups::nodes_in_groups;
use fleetsync::suggestions;

use super::{node_model, Context};

/// Query nodes and groups in the configuration
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(subcommand)]
    pub what: ListCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    /// List all nodes
    Nodes,
    /// List all known groups
    Groups,
    /// List the groups of a node, most specific first
    NodeGroups {
        /// Node name
        node: String,
    },
    /// List the nodes in a group
    GroupNodes {
        /// Group name
        group: String,
    },
}

/// Execute the `list` command.
pub fn execute(ctx: &Context, args: ListArgs) -> Result<ExitCode> {
    let config = ctx.load_config()?;
    for line in query(&config, &args.what)? {
        println!("{}", line);
    }
    Ok(ExitCode::SUCCESS)
}

fn query(config: &Config, what: &ListCommand) -> Result<Vec<String>> {
    let lines = match what {
        ListCommand::Nodes => config
            .nodes
            .iter()
            .map(|(name, def)| match &def.address {
                Some(address) => format!("{}\t{}", name, address),
                None => name.clone(),
            })
            .collect(),
        ListCommand::Groups => config.all_groups().into_iter().collect(),
        ListCommand::NodeGroups { node } => {
            let (_, model) = node_model(config, Some(node))?;
            model.groups().to_vec()
        }
        ListCommand::GroupNodes { group } => {
            let known = config.all_groups();
            if !known.contains(group) {
                let known: Vec<&str> = known.iter().map(String::as_str).collect();
                return Err(suggestions::unknown_group(group, &known));
            }
            nodes_in_groups(config, std::slice::from_ref(group))?
        }
    };
    Ok(lines)
}
