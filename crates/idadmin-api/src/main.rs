//! idadmin API server entry point.

use std::error::Error;
use std::sync::Arc;

use idadmin_api::config::{AdminConfig, LogFormat};
use idadmin_api::state::AppState;
use idadmin_core::clock::SystemClock;
use idadmin_store::InMemoryStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let builder = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AdminConfig::from_env()?;
    init_tracing(config.log_format);

    tracing::info!("Starting idadmin API server");

    let app_state = AppState::new(InMemoryStore::new(), Arc::new(SystemClock));

    // TODO: Replace CorsLayer::permissive() with the admin UI origin once it is configurable.
    let app = idadmin_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
