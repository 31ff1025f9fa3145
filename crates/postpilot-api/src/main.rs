use postpilot_api::setup;
use postpilot_core::Config;

// Use mimalloc as the global allocator for lower fragmentation,
// especially on musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Initialize the application (stores, background jobs, routes)
    let (_state, router, usage_reset) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router, usage_reset.into_iter().collect()).await?;

    Ok(())
}
