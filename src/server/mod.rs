//! HTTP surface over the provider.
//!
//! The provider is synchronous; every request runs it on tokio's blocking
//! pool behind a mutex, so the async runtime never waits on SQLite.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::provider::FriendsProvider;

pub mod routes;

/// Server state
pub struct AppState {
    pub provider: Arc<Mutex<FriendsProvider>>,
}

impl AppState {
    pub fn new(provider: FriendsProvider) -> Self {
        Self {
            provider: Arc::new(Mutex::new(provider)),
        }
    }
}

/// Routes for the friends collection and items
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/friends",
            get(routes::list_friends)
                .post(routes::create_friend)
                .delete(routes::delete_all_friends),
        )
        .route("/friends/bulk", post(routes::bulk_create_friends))
        .route(
            "/friends/{id}",
            get(routes::get_friend)
                .put(routes::update_friend)
                .delete(routes::delete_friend),
        )
        .route("/type", get(routes::get_type))
        .with_state(state)
}

pub async fn start_server(port: u16, provider: FriendsProvider) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(provider));

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
