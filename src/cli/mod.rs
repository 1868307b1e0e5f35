//! CLI module for the semantic cache
//!
//! Provides subcommands against the configured store:
//! - `set`: embed a key and store its value
//! - `get`: look up the value of the closest stored key

pub mod cache;

use clap::{Args, Parser, Subcommand};

/// Semantic cache - key/value lookups matched by meaning
#[derive(Parser)]
#[command(name = "semantic-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a value under a natural-language key
    Set(SetArgs),

    /// Retrieve the value of the most similar stored key
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Natural-language key, e.g. "Capital of France"
    pub key: String,

    /// Value to return for semantically similar keys
    pub value: String,

    /// Expire the entry after this many seconds
    #[arg(long)]
    pub ttl_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Natural-language query
    pub key: String,
}
