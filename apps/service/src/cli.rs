use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::admin::AdminCommand;

/// Watch a list of machines and send a mail whenever one goes up or down
#[derive(Parser, Debug)]
#[command(name = "pingwatch", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Entry list to use instead of the configured one
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive admin panel (default)
    Menu,
    /// Print the stored entries
    List,
    /// Add a machine to the list
    Add { ip: String, machine: String },
    /// Remove the entry at a 1-based position
    Remove { index: usize },
    /// Start monitoring until Ctrl+C
    Monitor,
    /// Print the effective configuration
    Config,
}

impl Command {
    /// Admin command this subcommand runs, if it is not handled by `main`
    pub fn admin_command(&self) -> Option<AdminCommand> {
        match self {
            Command::List => Some(AdminCommand::View),
            Command::Add { ip, machine } => {
                Some(AdminCommand::Add { identifier: ip.clone(), label: machine.clone() })
            }
            Command::Remove { index } => Some(AdminCommand::Delete { index: *index }),
            Command::Monitor => Some(AdminCommand::StartMonitoring),
            Command::Menu | Command::Config => None,
        }
    }
}
