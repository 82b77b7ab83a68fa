mod config;
mod db;
mod equity;
mod handlers;
mod leaderboard;
mod normalize;
mod oracle;
mod pnl;
mod state;
mod types;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = Arc::new(AppState::new());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/leaderboard", get(handlers::get_leaderboard))
        .route("/trades", get(handlers::get_trades))
        .layer(cors)
        .with_state(state);

    let addr = "0.0.0.0:8080";
    info!("🏆 Leaderboard engine starting on {}", addr);
    info!("📋 REST API: http://{}/leaderboard", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
