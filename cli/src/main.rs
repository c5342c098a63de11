use clap::Parser;
use conduit_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    conduit_cli::logging::init();
    conduit_cli::run(cli).await
}
