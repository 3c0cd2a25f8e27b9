// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gpurent")]
#[command(about = "Rent GPU compute nodes and drive remote command sessions over SSH")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List rentable candidates on the marketplace
    Candidates {
        /// Restrict to one cluster
        #[arg(long)]
        cluster: Option<String>,

        /// Require at least this many free GPUs
        #[arg(long)]
        min_gpus: Option<u32>,

        /// Print the raw candidate records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rent GPUs on a specific cluster node
    Rent {
        /// Cluster the node belongs to
        cluster: String,

        /// Node identifier within the cluster
        node: String,

        /// Number of GPUs to rent
        gpus: u32,
    },

    /// Connect to a host, run one command, and disconnect
    Run {
        /// Remote host to connect to
        #[arg(long)]
        host: String,

        /// Username for authentication
        #[arg(short, long)]
        user: String,

        /// Password; takes precedence over key authentication
        #[arg(long)]
        password: Option<String>,

        /// Private key path (default: $SSH_PRIVATE_KEY_PATH, then ~/.ssh/id_rsa)
        #[arg(long)]
        key: Option<PathBuf>,

        /// SSH port
        #[arg(long, default_value_t = 22)]
        port: u16,

        /// Connect timeout in milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,

        /// Command to execute on the remote host
        command: String,
    },
}
