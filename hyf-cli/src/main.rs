//! HYF CLI - inspect hydrologic networks and fetch gauge observations.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "hyf",
    version,
    about = "Hydrologic feature network toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: hyf_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("hyf {}", env!("CARGO_PKG_VERSION"));
    hyf_cmd::run(cli.command).await
}
