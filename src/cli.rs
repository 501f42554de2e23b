//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use fleetsync::defaults;
use fleetsync::output::OutputConfig;

use crate::commands::{self, Context};

/// fleetsync - Distribute configuration files to a fleet of hosts
#[derive(Parser, Debug)]
#[command(name = "fleetsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the fleetsync.yaml configuration file
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        env = "FLEETSYNC_CONFIG"
    )]
    config: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: LevelFilter,

    /// Show debug diagnostics (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the resolved overlay (or delete) tree of a node
    Ls(commands::ls::LsArgs),

    /// Look up the source of a destination path
    Find(commands::find::FindArgs),

    /// Query nodes and groups in the configuration
    List(commands::list::ListArgs),

    /// Run a command once per node, in parallel
    Run(commands::run::RunArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        init_logging(self.effective_level());

        let ctx = Context {
            config_path: self
                .config
                .unwrap_or_else(defaults::default_config_path),
            output: OutputConfig::from_env_and_flag(&self.color),
        };

        match self.command {
            Commands::Ls(args) => commands::ls::execute(&ctx, args),
            Commands::Find(args) => commands::find::execute(&ctx, args),
            Commands::List(args) => commands::list::execute(&ctx, args),
            Commands::Run(args) => commands::run::execute(&ctx, args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    fn effective_level(&self) -> LevelFilter {
        if self.verbose {
            self.log_level.max(LevelFilter::Debug)
        } else {
            self.log_level
        }
    }
}

/// Log to stderr at `level`. `RUST_LOG` still takes precedence.
fn init_logging(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .try_init();
}
