//! dynatable server: reads settings, loads the schema cache, serves table CRUD over HTTP.
//!
//! Run from repo root: `cargo run -p dynatable-server`

use dynatable::{api_routes, AppState, SchemaRegistry, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dynatable=info,dynatable_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let pool = settings.connect().await?;
    let registry = SchemaRegistry::load(&pool, &settings.schema).await?;
    if registry.is_empty() {
        tracing::warn!(schema = %settings.schema, "no tables found; every request will be not found");
    }

    let app = api_routes(AppState::new(pool, registry));
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
