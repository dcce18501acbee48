use std::net::SocketAddr;

use blog_api::{
    App,
    config::{Env, ServerConfig},
    connect, router,
};
use dotenv::dotenv;
use mimalloc::MiMalloc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    let dev = Env::from_env() == Env::Dev;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_api=debug,tower_http=debug".into()),
        )
        .with(dev.then(fmt::layer))
        .with((!dev).then(|| fmt::layer().json()))
        .init();

    let config = ServerConfig::new_from_env();
    tracing::info!(env = ?config.env, port = config.port, "Starting blog API");

    let pool = config.database.as_ref().map(connect).transpose()?;
    let app = match pool {
        Some(pool) => {
            tracing::info!("Using postgres storage");
            App::postgres(pool)
        }
        None => {
            tracing::info!("Using in-memory storage");
            App::in_memory()
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, router(app)).await?;

    Ok(())
}
