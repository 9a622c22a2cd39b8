use clap::Parser;
use tangent_tally_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tangent_tally_lib::run(Cli::parse()).await
}
