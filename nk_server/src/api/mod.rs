//! HTTP API for the notekeeper server.
//!
//! # Modules
//!
//! - [`auth`]: Passcode and Google sign-in
//! - [`user`]: The signed-in user's profile
//! - [`notes`]: Owner-scoped note management
//! - [`middleware`]: Bearer-token authentication for protected endpoints
//! - [`request_id`]: Request correlation, access logging and HTTP metrics
//! - [`error`]: Error-to-response mapping
//!
//! # Endpoints Overview
//!
//! ## Authentication (No Auth Required)
//! - `POST /api/auth/send-otp` - Mail a passcode
//! - `POST /api/auth/verify-otp-signup` - Sign up (or in) with a passcode
//! - `POST /api/auth/verify-otp-login` - Sign in with a passcode
//! - `POST /api/auth/google-login` - Sign in with Google
//! - `POST /api/auth/google-signup` - Sign up with Google
//!
//! ## Requires Auth
//! - `GET /api/user/me` - Current user
//! - `POST /api/notes` - Create note
//! - `GET /api/notes` - List notes
//! - `DELETE /api/notes/{id}` - Delete note
//!
//! ## Health Check
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use nk_server::api::{AppState, cors_layer, create_router};
//! # use notekeeper::{AuthManager, NoteManager};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let auth_manager: AuthManager = unimplemented!();
//! # let note_manager: NoteManager = unimplemented!();
//!
//! let state = AppState::new(auth_manager, note_manager, None);
//! let app = create_router(state, cors_layer("http://localhost:5173")?);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod middleware;
pub mod notes;
pub mod request_id;
pub mod user;

use axum::{
    Router,
    extract::State,
    http::{
        HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue},
    },
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use notekeeper::{AuthManager, NoteManager, db::Database};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub note_manager: Arc<NoteManager>,
    /// `None` when running on in-memory storage
    pub database: Option<Database>,
}

impl AppState {
    pub fn new(
        auth_manager: AuthManager,
        note_manager: NoteManager,
        database: Option<Database>,
    ) -> Self {
        Self {
            auth_manager: Arc::new(auth_manager),
            note_manager: Arc::new(note_manager),
            database,
        }
    }
}

/// CORS policy admitting only the web client's origin, with credentials
pub fn cors_layer(client_url: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(client_url.trim_end_matches('/'))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Arguments
///
/// - `state`: Application state with managers
/// - `cors`: CORS policy applied to every route
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    // Public routes (no authentication middleware)
    let auth_routes = Router::new()
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp-signup", post(auth::verify_otp_signup))
        .route("/verify-otp-login", post(auth::verify_otp_login))
        .route("/google-login", post(auth::google_login))
        .route("/google-signup", post(auth::google_signup));

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route("/user/me", get(user::me))
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route("/notes/{id}", delete(notes::delete_note))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(axum::middleware::from_fn(request_id::request_id_middleware)),
        )
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable`
/// otherwise. In-memory storage is always healthy.
///
/// # Example
///
/// ```bash
/// curl http://localhost:5000/health
/// # {"status":"healthy","storage":"postgres","database":true,"version":"1.0.0","timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, db_healthy) = match &state.database {
        Some(db) => ("postgres", db.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
