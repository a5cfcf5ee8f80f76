use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod config;
mod engine;
mod server;

use config::Config;
use facefind_core::PhotoStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("facefindd starting");

    let config = Config::from_env();

    // A corrupt store file is fatal here: serving queries against a silently
    // empty index would look like "no matches" to every user. Only the
    // missing-file bootstrap case starts empty.
    let store = PhotoStore::load_or_init(&config.store_path)
        .with_context(|| format!("loading embedding store {}", config.store_path.display()))?;
    if store.is_empty() {
        tracing::warn!(
            path = %config.store_path.display(),
            "embedding store is empty; /find will reject queries until an index is built"
        );
    }

    let engine = engine::spawn_engine(
        &config.detector_model_path(),
        &config.recognizer_model_path(),
    )
    .context("loading ONNX models")?;

    let state = server::AppState::new(store, engine, &config);
    let app = server::create_app(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "facefindd ready");

    axum::serve(listener, app).await?;

    Ok(())
}
