//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Manage the lifecycle of a VM fleet through the management API
#[derive(Parser, Debug)]
#[command(name = "vmfleet", version, long_about = None)]
#[command(after_help = "Host lists hold one `name id` pair per line; `#` starts a comment.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Host list with one `name id` pair per line
    #[arg(short = 'H', long, global = true, value_name = "PATH")]
    pub hosts: Option<PathBuf>,

    /// Management API username
    #[arg(short = 'U', long, global = true, env = "VMFLEET_USERNAME")]
    pub user: Option<String>,

    /// Management API password
    #[arg(
        short = 'P',
        long,
        global = true,
        env = "VMFLEET_PASSWORD",
        hide_env_values = true
    )]
    pub passwd: Option<String>,

    /// URL of the VM collection, e.g. https://manager/api/vms/
    #[arg(long, global = true, env = "VMFLEET_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Configuration file (default: ./vmfleet.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pause after each per-host request, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub pacing_ms: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Bring every VM in the host list up
    Up,

    /// Stop every VM in the host list
    Down,

    /// Fetch the state of every VM in the host list
    Status,

    /// List all VMs known to the management API
    List {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Output the whole XML document from the API
        #[arg(short = 'x', long)]
        xml: bool,
    },
}
