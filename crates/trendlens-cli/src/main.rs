//! Trendlens CLI - fetch platform hot-search rankings, score them with an
//! LLM, and render static reports.

mod cli;
mod commands;
mod logging;

use clap::Parser;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    commands::execute(cli).await
}
