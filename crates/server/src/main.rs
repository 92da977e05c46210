use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aegis_server::app_config::{self, Config};
use aegis_server::router::build_router;
use aegis_server::state::AppState;
use aegis_storage::keys::MasterKeyProvider;
use aegis_storage::sql::schema::ensure_schema;
use aegis_storage::KeyProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app_config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    info!("Connecting to PostgreSQL: {}", masked(&config.database_url));
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    ensure_schema(&pool)
        .await
        .context("failed to prepare the vault schema")?;

    let keys: Arc<dyn KeyProvider> =
        Arc::new(MasterKeyProvider::from_env_or_file(&config.filestore_dir)?);
    let state = Arc::new(AppState::new(
        pool,
        config.filestore_dir.clone(),
        keys,
    )?);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Vault listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
}

/// Mask the password portion of a connection URL for logging.
fn masked(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        format!("{}***@{}", &url[..scheme_end], &url[at_pos + 1..])
    } else {
        url.to_string()
    }
}
