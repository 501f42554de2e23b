//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which shows how the overlay
//! tree resolves for one node: every destination, the source that wins it,
//! and the post-apply script registered for it.
//!
//! With `--delete` the delete tree is listed instead. It is laid out and
//! resolved exactly like the overlay tree.
//!
//! This command is read-only. It exits with status 1 when the walk reported
//! configuration defects, after listing everything that did resolve.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::debug;
use serde::Serialize;

use fleetsync::overlay::{Resolved, ResolvedRecord, Resolver};
use fleetsync::path::prettypath;

use super::{node_model, walk_options, Context};

/// List the resolved overlay tree of a node
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Node to resolve for. Defaults to this host's short name.
    #[arg(short, long, value_name = "NODE")]
    pub node: Option<String>,

    /// List the delete tree instead of the overlay tree.
    #[arg(long)]
    pub delete: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Output formats for the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// One `dest <- source` line per entry
    #[default]
    Text,
    /// A single JSON document
    Json,
}

#[derive(Debug, Serialize)]
struct LsReport<'a> {
    node: &'a str,
    tree: &'a Path,
    entries: Vec<ResolvedRecord>,
    defects: Vec<String>,
}

/// Execute the `ls` command.
pub fn execute(ctx: &Context, args: LsArgs) -> Result<ExitCode> {
    let config = ctx.load_config()?;
    let (node, groups) = node_model(&config, args.node.as_deref())?;
    let options = walk_options(&config)?;

    let tree: PathBuf = if args.delete {
        config.delete_path()
    } else {
        config.overlay_path()
    };

    let mut resolver = Resolver::new(&groups, &options);
    let resolved = if tree.is_dir() {
        resolver.collect(&tree)?
    } else if args.delete {
        debug!("{} does not exist, nothing to delete", tree.display());
        Vec::new()
    } else {
        anyhow::bail!(
            "Overlay tree not found: {}\n\n\
             hint: Set 'overlay_dir' (or 'masterdir') in {}",
            tree.display(),
            ctx.config_path.display()
        );
    };

    let defects: Vec<String> = resolver.defects().iter().map(ToString::to_string).collect();

    match args.format {
        OutputFormat::Text => {
            for line in render_text(ctx, &resolved, options.masterdir.as_deref()) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let report = LsReport {
                node: &node,
                tree: &tree,
                entries: resolved.iter().map(ResolvedRecord::from).collect(),
                defects: defects.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if defects.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{}",
            ctx.output
                .problem(&format!("{} configuration defect(s) found", defects.len()))
        );
        Ok(ExitCode::FAILURE)
    }
}

fn render_text(ctx: &Context, resolved: &[Resolved], masterdir: Option<&Path>) -> Vec<String> {
    resolved
        .iter()
        .map(|entry| {
            let obj = &entry.object;
            let mut line = format!(
                "{} <- {}",
                ctx.output.dest(&obj.dest_path.display().to_string()),
                ctx.output.src(&obj.print_src(masterdir))
            );
            if let Some(script) = &entry.post_script {
                line.push_str(&format!("  (post: {})", prettypath(masterdir, script)));
            }
            line
        })
        .collect()
}
