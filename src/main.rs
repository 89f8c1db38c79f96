use anyhow::Result;
use clap::Parser;
use s4tk_project::{cli::Cli, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
