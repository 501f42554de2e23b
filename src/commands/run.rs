//! # Run Command Implementation
//!
//! This module implements the `run` subcommand, which runs one command per
//! selected node through the parallel [`Distributor`]. Every worker is a
//! separate process by default, so a command that hangs or crashes only
//! holds up its own share of the nodes.
//!
//! In the command, `{}` and `{node}` are replaced by the node name and
//! `{addr}` by the node's address (its name when it has none). Output lines
//! are prefixed with `node: ` so that interleaved output stays readable.
//!
//! ## Example
//!
//! ```bash
//! fleetsync run -g web -p 4 -- ssh {addr} uptime
//! ```

use std::collections::HashSet;
use std::io::{self, Write};
use std::process::{Command, ExitCode};
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use log::info;

use fleetsync::config::Config;
use fleetsync::groups::nodes_in_groups;
use fleetsync::output::emoji;
use fleetsync::parallel::{Distributor, Strategy};
use fleetsync::suggestions;

use super::Context;

/// Run a command once per node, in parallel
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Nodes to run on (comma separated, repeatable)
    #[arg(short = 'n', long = "node", value_name = "NODE", value_delimiter = ',')]
    pub nodes: Vec<String>,

    /// Run on every node in these groups (comma separated, repeatable)
    #[arg(short = 'g', long = "group", value_name = "GROUP", value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Maximum number of parallel workers. Defaults to `num_proc`.
    #[arg(short = 'p', long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Seconds to sleep between nodes. Forces a single worker.
    #[arg(long, value_name = "SECS")]
    pub sleep: Option<u64>,

    /// Use threads instead of worker processes
    #[arg(long)]
    pub threads: bool,

    /// The command to run, after `--`
    #[arg(last = true, required = true, value_name = "CMD")]
    pub command: Vec<String>,
}

/// A node and the address used to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    node: String,
    address: String,
}

/// Execute the `run` command.
pub fn execute(ctx: &Context, args: RunArgs) -> Result<ExitCode> {
    let config = ctx.load_config()?;
    let targets = select_targets(&config, &args.nodes, &args.groups)?;
    if targets.is_empty() {
        eprintln!("No nodes selected.");
        return Ok(ExitCode::SUCCESS);
    }

    let strategy = if args.threads {
        Strategy::Threads
    } else {
        Strategy::Process
    };
    let distributor = Distributor::new(args.parallel.unwrap_or(config.num_proc))
        .with_delay(
            args.sleep
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.sleep_duration()),
        )
        .with_strategy(strategy);

    info!(
        "running {:?} on {} node(s) with {} worker(s)",
        args.command,
        targets.len(),
        distributor.worker_count(targets.len())
    );

    let report = distributor.run(&targets, |target| run_one(&args.command, target))?;

    if report.success() {
        info!(
            "{} {} worker(s) finished",
            emoji(&ctx.output, "✅", "[OK]"),
            report.workers
        );
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{}",
            ctx.output.problem(&format!(
                "{} of {} worker(s) reported failures",
                report.failed.len(),
                report.workers
            ))
        );
        Ok(ExitCode::FAILURE)
    }
}

/// Nodes named explicitly, then members of the named groups, without
/// duplicates. Nothing named means every node that is not ignored.
fn select_targets(config: &Config, nodes: &[String], groups: &[String]) -> Result<Vec<Target>> {
    let mut names: Vec<String> = Vec::new();

    if nodes.is_empty() && groups.is_empty() {
        names.extend(
            config
                .nodes
                .keys()
                .filter(|node| !config.is_ignored(node))
                .cloned(),
        );
    } else {
        for node in nodes {
            if !config.nodes.contains_key(node) {
                let known: Vec<&str> = config.nodes.keys().map(String::as_str).collect();
                return Err(suggestions::unknown_node(node, &known));
            }
            names.push(node.clone());
        }

        if !groups.is_empty() {
            let known = config.all_groups();
            if let Some(group) = groups.iter().find(|g| !known.contains(*g)) {
                let known: Vec<&str> = known.iter().map(String::as_str).collect();
                return Err(suggestions::unknown_group(group, &known));
            }
            names.extend(nodes_in_groups(config, groups)?);
        }
    }

    let mut seen = HashSet::new();
    names.retain(|name| seen.insert(name.clone()));

    Ok(names
        .into_iter()
        .map(|node| {
            let address = config
                .nodes
                .get(&node)
                .and_then(|def| def.address.clone())
                .unwrap_or_else(|| node.clone());
            Target { node, address }
        })
        .collect())
}

/// Replace the node placeholders in every argument.
fn substitute(command: &[String], target: &Target) -> Vec<String> {
    command
        .iter()
        .map(|arg| {
            arg.replace("{node}", &target.node)
                .replace("{addr}", &target.address)
                .replace("{}", &target.node)
        })
        .collect()
}

/// Prefix every line of `output` with the node name.
fn prefix_lines(node: &str, output: &[u8]) -> String {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| format!("{}: {}\n", node, line))
        .collect()
}

fn run_one(command: &[String], target: &Target) -> Result<()> {
    let argv = substitute(command, target);
    let (program, rest) = argv
        .split_first()
        .context("empty command")?;

    let output = Command::new(program)
        .args(rest)
        .output()
        .with_context(|| format!("{}: failed to run {}", target.node, program))?;

    // one write per stream keeps a node's lines together
    io::stdout()
        .lock()
        .write_all(prefix_lines(&target.node, &output.stdout).as_bytes())?;
    io::stderr()
        .lock()
        .write_all(prefix_lines(&target.node, &output.stderr).as_bytes())?;

    if output.status.success() {
        Ok(())
    } else {
        anyhow::bail!("{}: {} exited with {}", target.node, program, output.status)
    }
}
