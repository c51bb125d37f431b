//! Starbase server: dispatcher in front of PostgreSQL-backed instances.
//!
//! Run from repo root: `cargo run -p starbase-server`
//! Requires `AUTHORIZATION_TOKEN`; see `.env.example` for the rest.

use starbase_dispatch::{
    app, AppState, BasicAuthStudio, DispatchConfig, IdentityResolver, PgDirectory, PgDirectoryConfig,
    SqlQueryHandler,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("starbase_dispatch=info,starbase_server=info")),
        )
        .init();

    let config = DispatchConfig::from_env()?;
    let directory = PgDirectory::new(&PgDirectoryConfig::from_env()?)?;
    let resolver = IdentityResolver::new(Arc::new(directory));
    tracing::info!(
        instance = %resolver.key(),
        region = %config.region,
        studio = config.studio.is_some(),
        "dispatcher configured"
    );

    let state = AppState {
        config: Arc::new(config),
        resolver,
        query_handler: Arc::new(SqlQueryHandler::new()),
        studio_handler: Arc::new(BasicAuthStudio),
    };

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
