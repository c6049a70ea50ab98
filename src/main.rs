use anyhow::Result;
use clap::Parser;
use ppr_wallet::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ppr_wallet::logging::init(cli.verbose);
    cli.run().await
}
