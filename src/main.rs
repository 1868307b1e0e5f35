use clap::Parser;
use semantic_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Set(args) => cli::cache::set(args).await,
        Command::Get(args) => cli::cache::get(args).await,
    }
}
