//! Zentura Travel Backend
//!
//! Public site, contact inquiries and an admin dashboard API over a hosted
//! Supabase project, or a local SQLite key-value store when none is configured.

mod api;
mod auth;
mod config;
mod db;
mod editors;
mod errors;
mod gateway;
mod merge;
mod models;
mod render;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{SessionExpiry, SessionRegistry};
use config::{BackendMode, Config};
use db::LocalStore;
use editors::TripEditor;
use gateway::{Gateway, LocalBackend, SupabaseBackend};
use models::AdminCredentials;
use store::ClientStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub sessions: Arc<SessionRegistry>,
    pub store: Arc<ClientStore>,
    pub trip_editor: Arc<TripEditor>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(gateway: Gateway, config: Config) -> Self {
        let sessions = SessionRegistry::new(
            gateway.clone(),
            config.admin_check_timeout,
            SessionExpiry {
                revalidate_after: config.session_revalidate_after,
                idle_ttl: config.session_idle_ttl,
            },
        );
        Self {
            gateway: Arc::new(gateway),
            sessions: Arc::new(sessions),
            store: Arc::new(ClientStore::new()),
            trip_editor: Arc::new(TripEditor::new()),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Zentura Backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    let gateway = build_gateway(&config).await?;
    tracing::info!("Data backend: {}", gateway.backend_name());

    let state = AppState::new(gateway, config.clone());

    // Warm the cache so the first dashboard load has data
    let refreshed = state.store.refresh(&state.gateway, None).await;
    tracing::info!(
        "Loaded {} trips (store version {})",
        refreshed.snapshot.trips.len(),
        refreshed.snapshot.version
    );

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick the data backend from configuration.
async fn build_gateway(config: &Config) -> Result<Gateway, Box<dyn std::error::Error>> {
    match (config.backend, &config.supabase_url, &config.supabase_anon_key) {
        (BackendMode::None, _, _) => {
            tracing::warn!("No data backend: serving defaults, writes are disabled");
            Ok(Gateway::unconfigured())
        }
        (BackendMode::Auto, Some(url), Some(key)) if config.has_supabase_config() => Ok(
            Gateway::new(Arc::new(SupabaseBackend::new(url, key, &config.storage_bucket))),
        ),
        _ => {
            if config.backend == BackendMode::Auto {
                tracing::warn!("Supabase not configured, using the local store");
            }
            tracing::info!("Database path: {:?}", config.db_path);
            let pool = db::init_database(&config.db_path).await?;
            let store = LocalStore::new(pool);
            store
                .seed(&AdminCredentials {
                    username: config.admin_username.clone(),
                    password: config.admin_password.clone(),
                })
                .await?;
            Ok(Gateway::new(Arc::new(LocalBackend::new(store))))
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Admin routes, gated on an admitted session
    let admin_routes = Router::new()
        .route("/dashboard", get(api::get_dashboard))
        .route("/content", put(api::update_content))
        .route("/trips", get(api::list_trips).post(api::create_trip))
        .route("/trips/seed", post(api::seed_trips))
        .route("/trips/{id}/form", get(api::get_trip_form))
        .route(
            "/trips/{id}",
            put(api::update_trip).delete(api::delete_trip),
        )
        .route("/messages", get(api::list_messages))
        .route("/messages/{id}/toggle", post(api::toggle_message))
        .route("/images", get(api::list_images).post(api::upload_image))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_auth_layer,
        ));

    // API routes
    let api_routes = Router::new()
        .route("/content", get(api::get_content))
        .route("/trips", get(api::list_public_trips))
        .route("/messages", post(api::create_message))
        .route("/auth/login", post(api::login))
        .route("/auth/session", get(api::get_session))
        .route("/auth/logout", post(api::logout))
        .nest("/admin", admin_routes);

    // Page and health check (no auth required)
    let page_routes = Router::new()
        .route("/", get(api::home_page))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
