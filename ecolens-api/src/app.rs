/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use ecolens_api::{app::{build_router, AppState}, config::Config};
/// use ecolens_shared::db::pool::RecordStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let store = RecordStore::connect(config.database.store_config()).await?;
/// let app = build_router(AppState::new(store, config));
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use ecolens_shared::db::pool::RecordStore;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Record store handle
    pub store: RecordStore,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: RecordStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Connection pool for model operations
    pub fn db(&self) -> &PgPool {
        self.store.pool()
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                       # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST  /register           # public
///     │   ├── POST  /login              # public
///     │   ├── GET   /me
///     │   └── PATCH /me
///     ├── /emissions/
///     │   ├── POST   /
///     │   ├── GET    /today
///     │   ├── GET    /history?days=
///     │   ├── GET    /recent?limit=
///     │   ├── GET    /breakdown?days=
///     │   └── DELETE /:id
///     ├── GET /dashboard/stats?period=
///     └── GET /impact?carbonValue=      # public
/// ```
///
/// Routes other than the public ones require a bearer credential, enforced
/// by the [`crate::extract::CurrentUser`] extractor in each handler.
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route(
            "/me",
            get(routes::auth::me).patch(routes::auth::update_me),
        );

    let emission_routes = Router::new()
        .route("/", post(routes::emissions::create_emission))
        .route("/today", get(routes::emissions::today))
        .route("/history", get(routes::emissions::history))
        .route("/recent", get(routes::emissions::recent))
        .route("/breakdown", get(routes::emissions::breakdown))
        .route("/:id", delete(routes::emissions::delete_emission));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/emissions", emission_routes)
        .route("/dashboard/stats", get(routes::dashboard::dashboard_stats))
        .route("/impact", get(routes::impact::carbon_impact));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
