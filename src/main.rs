use anyhow::Result;
use arca::cli::Cli;
use arca::logging;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    cli.run().await
}
