use std::{convert::Infallible, process::ExitCode};

use discovery::{Discoverer, DiscoveryError};

mod cli;
mod discovery;
mod signals;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::get_cli_args();

    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    signals::handle_termination();

    match run(args).await {
        Ok(never) => match never {},
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &cli::Args) -> Result<Infallible, DiscoveryError> {
    log::info!("Connecting to Docker API");
    let docker = discovery::docker::connect().await?;

    let _ = sd_notify::notify(false, &[sd_notify::NotifyState::Ready]);

    Discoverer::new(docker, args.discovery_settings()).run().await
}
