//! Filefilter CLI - filefilter command

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::logging;
use cli_lib::query::Query;
use ff_core::config::CONFIG_FILENAME;
use journal::history::DEFAULT_LOG_DIR;
use std::path::PathBuf;

mod cmd;

/// Filefilter - back up a hot directory and delete files on schedule
#[derive(Parser)]
#[command(name = "filefilter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to watch (remembered in the config file)
    #[arg(long, global = true)]
    hot: Option<PathBuf>,

    /// Directory receiving .bak copies (default: .backup)
    #[arg(long, global = true)]
    backup: Option<PathBuf>,

    /// Config file remembering the last hot/backup pair
    #[arg(long, global = true, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Directory holding the history log
    #[arg(long, global = true, default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Also write diagnostics to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Verbose diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the hot directory (the default)
    Watch,
    /// Print the history log and exit
    Log {
        /// Only lines whose path matches this regular expression
        #[arg(long)]
        name: Option<String>,
        /// Only lines stamped at or after this time (default: now)
        #[arg(long)]
        from: Option<String>,
        /// Only lines stamped at or before this time (default: now)
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => {
            cmd::watch::run(cli.hot, cli.backup, &cli.config, &cli.log_dir).await
        }
        Commands::Log { name, from, to } => {
            cmd::log::run(&cli.log_dir, Query::from_flags(name, from, to))
        }
    }
}
