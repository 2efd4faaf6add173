// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the serve and one-shot deploy subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ascend")]
#[command(about = "Build a repository into a container image and run it, on request over HTTP")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ascend.yml in the current directory, if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Accept deploy requests over HTTP
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(short, long)]
        listen: Option<String>,

        /// Directory for build and container logs, overriding the configuration
        #[arg(long)]
        logs_dir: Option<PathBuf>,
    },

    /// Run a single deploy from a JSON request file and print the response
    Deploy {
        /// Path to a JSON deploy request
        request: PathBuf,
    },
}
