//! HTTP gateway
//!
//! ```text
//! GET  /api/v1/health
//! POST /api/v1/users                  register
//! POST /api/v1/users/login            login -> JWT
//! POST /api/v1/accounts               (jwt)
//! GET  /api/v1/accounts               (jwt)
//! GET  /api/v1/accounts/{id}          (jwt)
//! GET  /api/v1/accounts/{id}/entries  (jwt)
//! POST /api/v1/transfers              (jwt)
//! GET  /api/v1/transfers?account_id=  (jwt)
//! GET  /docs                          Swagger UI
//! ```

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::user_auth;
use state::AppState;

/// Build the complete router
pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/users", post(user_auth::handlers::register))
        .route("/api/v1/users/login", post(user_auth::handlers::login));

    // JWT required
    let private_routes = Router::new()
        .route(
            "/api/v1/accounts",
            post(handlers::create_account).get(handlers::list_accounts),
        )
        .route("/api/v1/accounts/{id}", get(handlers::get_account))
        .route("/api/v1/accounts/{id}/entries", get(handlers::list_entries))
        .route(
            "/api/v1/transfers",
            post(handlers::create_transfer).get(handlers::list_transfers),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            user_auth::jwt_auth_middleware,
        ));

    public_routes
        .merge(private_routes)
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Serve on an already bound listener until the process stops
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    axum::serve(listener, app).await.context("Server error")
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port already in use?)", addr))?;

    tracing::info!(store = state.store_name, "Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    serve(listener, state).await
}
