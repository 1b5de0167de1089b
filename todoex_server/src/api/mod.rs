//! HTTP API for the todo service.
//!
//! # Modules
//!
//! - [`auth`]: registration, login and logout in both credential modes
//! - [`todos`]: owned todo CRUD
//! - [`middleware`]: the auth gate in front of every `/api` route
//! - [`error`]: domain error to status code mapping
//! - [`request_id`]: request correlation
//!
//! # Endpoints
//!
//! ```text
//! GET    /health              - Liveness (public)
//! POST   /register_session    - Register, returns session token (public)
//! POST   /register_JWT        - Register, returns signed token (public)
//! POST   /login               - Login, returns session token (public)
//! POST   /login_JWT           - Login, returns signed token (public)
//! POST   /api/logout          - Delete the presented session (auth)
//! GET    /api/todos           - List own todos (auth)
//! POST   /api/todos           - Create todo (auth)
//! PATCH  /api/todos/{id}      - Partially update todo (auth)
//! DELETE /api/todos/{id}      - Archive todo (auth)
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod auth;
pub mod error;
pub mod middleware;
pub mod request_id;
pub mod todos;

use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use todoex::{auth::SessionManager, todo::TodoRepository};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Default bound on a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub todos: Arc<dyn TodoRepository>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>, todos: Arc<dyn TodoRepository>) -> Self {
        Self {
            sessions,
            todos,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use todoex_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            patch(todos::update_todo).delete(todos::archive_todo),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_gate,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register_session", post(auth::register_session))
        .route("/register_JWT", post(auth::register_jwt))
        .route("/login", post(auth::login))
        .route("/login_JWT", post(auth::login_jwt))
        .nest("/api", protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(request_id::request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(state.request_timeout)),
        )
        .with_state(state)
}

/// Liveness probe. Does not touch the database.
async fn health_check() -> Json<Value> {
    Json(json!({ "alive": true }))
}
