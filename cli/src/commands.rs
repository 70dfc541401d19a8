pub mod cache;
pub mod info;
pub mod probe;
pub mod resolve;
pub mod scan;

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "pawprobe")]
#[command(about = "Finds the adoption platform backend on the local network.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Read settings from this file instead of the platform config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend port, overrides the config file
    #[arg(long, short, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Reduce output, repeat for less
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Keep the resolution cache in memory for this run only
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the backend endpoint the way the client does
    #[command(alias = "r")]
    Resolve {
        /// Derive the subnet from this address instead of the local interfaces
        #[arg(long)]
        local_ip: Option<Ipv4Addr>,
    },
    /// Scan the local /24 for the backend port
    #[command(alias = "s")]
    Scan {
        /// Derive the subnet from this address instead of the local interfaces
        #[arg(long)]
        local_ip: Option<Ipv4Addr>,
        /// Store the host found in the resolution cache
        #[arg(long)]
        save: bool,
    },
    /// Check whether a single host answers on the backend port
    #[command(alias = "p")]
    Probe { host: String },
    /// Inspect or override the cached backend host
    #[command(alias = "c")]
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show what the resolver sees on this device
    #[command(alias = "i")]
    Info,
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Print the cached host
    Show,
    /// Replace the cached host, e.g. after a misdetection
    Set { host: String },
    /// Forget the cached host (reset network config)
    Clear,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Cancels `token` when the user hits Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}
