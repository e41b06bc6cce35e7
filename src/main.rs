use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use advocate_directory::api;
use advocate_directory::config;
use advocate_directory::search::{select_source, QueryExecutor};
use advocate_directory::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advocate_directory=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::init_config().map_err(anyhow::Error::msg)?;
    let (bind_addr, source) = {
        let cfg = app_config.read().clone();
        tracing::info!("Server will listen on {}:{}", cfg.server.host, cfg.server.port);
        (cfg.get_bind_address(), select_source(&cfg).await?)
    };

    let state = Arc::new(AppState::new(QueryExecutor::new(source), app_config));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
