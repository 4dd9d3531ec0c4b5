use std::sync::Arc;

use anyhow::Context;

use stockpulse_api::{build_app, ApiConfig, AppServices};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    stockpulse_observability::init();
    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "loaded environment file");
    }

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let services = AppServices::from_config(&config).with_context(|| {
        format!("failed to initialize services from {}", config.model_bundle_path.display())
    })?;

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        horizon = config.forecast_horizon,
        worker_limit = config.worker_limit,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
