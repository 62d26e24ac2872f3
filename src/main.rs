//! gitriol CLI - incremental git-to-remote deployment
//!
//! Usage: gitriol <COMMAND>
//!
//! Commands:
//!   deploy  Push the diff since the last deployment to the remote
//!   revert  Redeploy an earlier logged revision
//!   init    Seed the remote with a full tree and start a fresh log
//!   log     List recorded deployments, newest first

use anyhow::Result;
use clap::{Parser, Subcommand};

use gitriol::commands::{deploy, history, init, revert};

/// gitriol - deploy git-tracked sites over FTP, FTPS and SFTP
#[derive(Parser, Debug)]
#[command(name = "gitriol")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Push the diff since the last deployment to the remote
    Deploy {
        /// Revision to deploy (defaults to the config's `upload` alias)
        revision: Option<String>,
    },

    /// Redeploy an earlier logged revision
    Revert {
        /// Steps back (0 = the deployment before the current one) or a
        /// date; the last deployment before that date is redeployed
        target: String,
    },

    /// Seed the remote with a full tree and start a fresh log
    Init {
        /// Revision to seed from (defaults to the config's `upload`
        /// alias, then HEAD)
        revision: Option<String>,
    },

    /// List recorded deployments, newest first
    Log {
        /// Number of entries to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Show the whole log
        #[arg(long, conflicts_with = "limit")]
        all: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy { revision } => deploy::cmd_deploy(revision.as_deref(), cli.yes)?,
        Commands::Revert { target } => revert::cmd_revert(&target, cli.yes)?,
        Commands::Init { revision } => init::cmd_init(revision.as_deref(), cli.yes)?,
        Commands::Log { limit, all } => history::cmd_log(limit, all)?,
    }
    Ok(())
}
