//! # Find Command Implementation
//!
//! This module implements the `find` subcommand, which answers "where does
//! this file come from?" for one node.
//!
//! A full destination path such as `/etc/ntp.conf` is looked up exactly. A
//! terse path such as `.../ntp.conf` or `/usr/.../ntp.conf` names the
//! destination by whatever follows the `...` marker. If that suffix matches
//! more than one destination, the candidates are listed and, on an
//! interactive terminal, the user picks one.

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Select};

use fleetsync::overlay::{Lookup, Resolver, SyncObject};
use fleetsync::path::prettypath;
use fleetsync::suggestions;

use super::{node_model, walk_options, Context};

/// Look up the source of a destination path
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Node to resolve for. Defaults to this host's short name.
    #[arg(short, long, value_name = "NODE")]
    pub node: Option<String>,

    /// Also show metadata of the source and the destination.
    #[arg(short, long)]
    pub long: bool,

    /// Destination path, full or terse (containing `...`).
    #[arg(value_name = "PATH")]
    pub path: String,
}

/// Execute the `find` command.
pub fn execute(ctx: &Context, args: FindArgs) -> Result<ExitCode> {
    let config = ctx.load_config()?;
    let (node, groups) = node_model(&config, args.node.as_deref())?;
    let options = walk_options(&config)?;
    let overlay = config.overlay_path();

    let mut resolver = Resolver::new(&groups, &options);
    let lookup = resolver.find_terse(&overlay, &args.path)?;

    let found = match lookup {
        Lookup::Found(obj) => obj,
        Lookup::NotFound => anyhow::bail!(
            "{}: no source in the overlay tree for node {}",
            args.path,
            node
        ),
        Lookup::Ambiguous(candidates) => match choose(&args.path, &candidates)? {
            Some(idx) => candidates[idx].clone(),
            None => return Err(suggestions::ambiguous_terse(&args.path, &candidates)),
        },
    };

    for line in describe(ctx, &found, options.masterdir.as_deref(), args.long) {
        println!("{}", line);
    }

    if resolver.has_defects() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Let the user pick one of several candidates. Returns `None` when no
/// terminal is attached or the prompt was cancelled.
fn choose(path: &str, candidates: &[SyncObject]) -> Result<Option<usize>> {
    if !std::io::stdin().is_terminal() || !console::user_attended_stderr() {
        return Ok(None);
    }

    let items: Vec<String> = candidates
        .iter()
        .map(|c| c.dest_path.display().to_string())
        .collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} matches several destinations", path))
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(choice)
}

fn describe(ctx: &Context, obj: &SyncObject, masterdir: Option<&Path>, long: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "{} <- {}",
        ctx.output.dest(&obj.dest_path.display().to_string()),
        ctx.output.src(&obj.print_src(masterdir))
    )];
    if !long {
        return lines;
    }

    let src = obj.src_stat();
    lines.push(format!(
        "  source: {} mode {:04o} uid {} gid {} size {}",
        prettypath(masterdir, &obj.src_path),
        src.mode().unwrap_or(0),
        src.uid().unwrap_or(0),
        src.gid().unwrap_or(0),
        src.size().unwrap_or(0)
    ));

    let dest = obj.dest_stat();
    if dest.exists() {
        lines.push(format!(
            "  destination: mode {:04o} uid {} gid {} size {}",
            dest.mode().unwrap_or(0),
            dest.uid().unwrap_or(0),
            dest.gid().unwrap_or(0),
            dest.size().unwrap_or(0)
        ));
    } else {
        lines.push("  destination: missing".to_string());
    }
    lines
}
