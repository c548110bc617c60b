use std::sync::Arc;

use anyhow::Context;
use db::{DBService, store::SqliteRecordStore};
use server::{AppState, config::ServerConfig, routes};
use utils::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let db = DBService::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    let state = AppState::new(Arc::new(SqliteRecordStore::new(db)), config.editor.clone());

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %addr,
        public_origin = %config.editor.public_origin,
        "Card server listening"
    );

    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
