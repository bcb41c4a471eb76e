use anyhow::Context;
use clap::Parser;
use clima_maps::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("clima-maps failed")
}
