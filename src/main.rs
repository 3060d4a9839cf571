mod auth;
mod cli;
mod config;
mod duration;
mod error;
mod export;
mod github;
mod output;
mod pipeline;
mod selector;

use clap::Parser;
use cli::Cli;
use error::ExportError;
use log::{error, info};

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if !cli.quiet() {
        output::print_banner();
    }

    info!("Starting gha-timings");
    if let Err(err) = cli.execute().await {
        error!("{err:#}");
        eprintln!("{} {err:#}", output::bright_red("error:"));

        let code = err
            .downcast_ref::<ExportError>()
            .map_or(1, ExportError::exit_code);
        std::process::exit(code);
    }
}
