//! Personal task-tracking web app: one server-rendered page over a managed
//! Postgres store, with form posts for every mutation.

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;

mod config;
mod db;
mod error;
mod filters;
mod handlers;
mod models;
mod render;
mod schema;

use crate::config::AppConfig;
use crate::handlers::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = match &config.database_url {
        Some(url) => Some(db::build_connection_pool(url)?),
        None => None,
    };

    let app = handlers::router()
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pool });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
