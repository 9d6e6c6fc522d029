use std::{net::SocketAddr, path::Path, sync::Arc};

use anyhow::{Context, Result};
use shems_service::{
    api::{self, AppState},
    config::AppConfig,
    metrics_server, model, observability,
    store::UsageStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // Explicit startup step: a bad artifact aborts here instead of serving
    // with an undefined model.
    let model = model::load_or_train(Path::new(&cfg.model.artifact_path))
        .context("baseline model initialization failed")?;

    let state = AppState {
        store: Arc::new(UsageStore::new()),
        model: Arc::new(model),
    };
    let app = api::router(state);

    let addr: SocketAddr = cfg
        .http
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid http.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "shems service listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
