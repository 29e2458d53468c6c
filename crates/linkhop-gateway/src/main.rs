use clap::Parser;
use linkhop_gateway::cli::CLI;
use linkhop_gateway::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    let _telemetry = linkhop_telemetry::init(&config.telemetry())?;

    server::run(config).await
}
