use mediasync_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load variables from a .env file when present; the environment wins.
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    mediasync_api::init_tracing();

    if !dotenv_loaded {
        tracing::warn!("No .env file found, using process environment only");
    }

    let config = Config::from_env()?;

    let (_state, router) = mediasync_api::setup::initialize_app(config.clone()).await?;

    mediasync_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
