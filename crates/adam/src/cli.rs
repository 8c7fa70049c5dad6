use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Keep a polled cache of a Plugwise Smile (Anna / Adam) gateway.
#[derive(Debug, Parser)]
#[command(name = "adamd", version, about)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Refresh once, print every reading as JSON, and exit
    #[arg(long)]
    pub once: bool,

    /// Seconds to wait before retrying a gateway that is not ready
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub retry_delay: u64,
}
