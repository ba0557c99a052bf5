/// Application state and router builder
///
/// This module defines the shared application state, connects the storage
/// backend and builds the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasklist_api::{app::{build_router, connect_store, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let (store, _pool) = connect_store(&config).await?;
/// let app = build_router(AppState::new(store, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tasklist_shared::{
    auth::{
        middleware::{bearer_auth_middleware, AuthError},
        token::TokenIssuer,
    },
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    store::{MemoryStore, PgStore, Store},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,

    /// Issues and resolves bearer tokens
    pub issuer: TokenIssuer,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let issuer = match config.auth.token_ttl_hours {
            Some(hours) => TokenIssuer::with_ttl(chrono::Duration::hours(i64::from(hours))),
            None => TokenIssuer::new(),
        };

        Self {
            store,
            issuer,
            config: Arc::new(config),
        }
    }
}

/// Opens the storage backend named by `DATABASE_URL`
///
/// `memory://` gives a fresh [`MemoryStore`]. Anything else is treated as a
/// PostgreSQL URL: the pool is created, checked and migrated. The pool is
/// also returned so the caller can close it on shutdown.
pub async fn connect_store(config: &Config) -> anyhow::Result<(Arc<dyn Store>, Option<PgPool>)> {
    if config.uses_memory_store() {
        warn!("Using in-memory store; data is lost on restart");
        return Ok((Arc::new(MemoryStore::new()), None));
    }

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;
    info!("Database ready");

    Ok((Arc::new(PgStore::new(pool.clone())), Some(pool)))
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health                  # Health check (public)
/// ├── POST   /register                # Create account (public)
/// ├── POST   /login                   # Issue bearer token (public)
/// └── /tasks                          # Bearer token required
///     ├── GET    /                    # List own tasks
///     ├── POST   /                    # Create task
///     ├── PUT    /:id                 # Update status (owner only)
///     ├── DELETE /:id                 # Delete (owner only)
///     └── GET    /status/:status      # Filter own tasks by status
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (task routes only, runs before body extraction)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // route_layer so unknown paths still answer 404 rather than 401
    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            put(routes::tasks::update_task_status).delete(routes::tasks::delete_task),
        )
        .route("/tasks/status/:status", get(routes::tasks::filter_tasks))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
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
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Bearer token authentication layer
///
/// Resolves the token and injects `AuthContext` into request extensions.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    bearer_auth_middleware(state.store.clone(), state.issuer.clone(), req, next).await
}
