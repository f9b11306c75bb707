use clap::Parser;

use product_catalog::cli::{self, Cli};
use product_catalog::config::Config;
use product_catalog::telemetry;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    telemetry::init();
    let config = Config::from_env();

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli, config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
