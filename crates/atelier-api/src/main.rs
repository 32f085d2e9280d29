use atelier_api::setup::{initialize_app, server::start_server};
use atelier_api::telemetry::init_tracing;
use atelier_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    init_tracing(std::env::var("LOG_FORMAT").ok().as_deref())?;

    let (_state, router) = initialize_app(config.clone()).await?;
    start_server(&config, router).await?;

    Ok(())
}
