//! Server initialization and routing

use crate::api;
use crate::cache::TtlCache;
use crate::config::Config;
use crate::email::DefaultEmailProviderFactory;
use crate::middleware::{require_admin_middleware, AdminAuthState, ObservabilityLayer};
use crate::repository::{
    dispatch_log::DispatchLogRepositoryImpl, system_settings::SystemSettingsRepositoryImpl,
};
use crate::service::{DispatchLogService, DispatchService, SheetImportService, SystemSettingsService};
use crate::state::HasServices;
use anyhow::Result;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub dispatch_service:
        Arc<DispatchService<SystemSettingsRepositoryImpl, DispatchLogRepositoryImpl>>,
    pub dispatch_log_service: Arc<DispatchLogService<DispatchLogRepositoryImpl>>,
    pub system_settings_service: Arc<SystemSettingsService<SystemSettingsRepositoryImpl>>,
    pub sheet_import_service: Arc<SheetImportService>,
}

impl HasServices for AppState {
    type SettingsRepo = SystemSettingsRepositoryImpl;
    type LogRepo = DispatchLogRepositoryImpl;

    fn config(&self) -> &Config {
        &self.config
    }

    fn dispatch_service(&self) -> &DispatchService<Self::SettingsRepo, Self::LogRepo> {
        &self.dispatch_service
    }

    fn dispatch_log_service(&self) -> &DispatchLogService<Self::LogRepo> {
        &self.dispatch_log_service
    }

    fn system_settings_service(&self) -> &SystemSettingsService<Self::SettingsRepo> {
        &self.system_settings_service
    }

    fn sheet_import_service(&self) -> &SheetImportService {
        &self.sheet_import_service
    }

    async fn check_ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok()
    }
}

/// Run the HTTP server
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    // Create database connection pool
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    info!("Connected to database");

    let cache = TtlCache::new();

    // Create repositories
    let settings_repo = Arc::new(SystemSettingsRepositoryImpl::new(db_pool.clone()));
    let log_repo = Arc::new(DispatchLogRepositoryImpl::new(db_pool.clone()));

    // Create services
    let system_settings_service = Arc::new(SystemSettingsService::new(
        settings_repo,
        cache.clone(),
        Duration::from_secs(config.cache.settings_ttl_secs),
    ));
    let dispatch_log_service = Arc::new(DispatchLogService::new(
        log_repo,
        cache.clone(),
        Duration::from_secs(config.cache.logs_ttl_secs),
    ));
    let provider_factory = Arc::new(DefaultEmailProviderFactory::new(
        config.smtp.clone(),
        config.transactional_api.clone(),
    ));
    let dispatch_service = Arc::new(DispatchService::new(
        provider_factory,
        system_settings_service.clone(),
        dispatch_log_service.clone(),
    ));
    let sheet_import_service = Arc::new(SheetImportService::new(&config.sheets)?);

    if config.admin_api_token.is_none() {
        tracing::warn!("ADMIN_API_TOKEN is not set, the admin API is unauthenticated");
    }

    let http_addr = config.http_addr();
    let state = AppState {
        config: Arc::new(config),
        db_pool,
        dispatch_service,
        dispatch_log_service,
        system_settings_service,
        sheet_import_service,
    };

    let app = build_router(state).merge(metrics_router(prometheus_handle));

    info!("HTTP server listening on {}", http_addr);
    let listener = TcpListener::bind(&http_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the HTTP router with generic state type
///
/// Works with both production `AppState` and test implementations of `HasServices`.
pub fn build_router<S: HasServices>(state: S) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_auth = AdminAuthState::new(state.config().admin_api_token.clone());

    let admin_routes = Router::new()
        // Email dispatch
        .route("/api/v1/email/dispatch", post(api::email::dispatch::<S>))
        .route(
            "/api/v1/email/import-sheet",
            post(api::email::import_sheet::<S>),
        )
        // Dispatch log
        .route("/api/v1/email/logs", get(api::dispatch_log::list::<S>))
        .route(
            "/api/v1/email/logs/{id}",
            get(api::dispatch_log::get::<S>).delete(api::dispatch_log::delete::<S>),
        )
        // Provider settings
        .route(
            "/api/v1/settings/email/provider",
            get(api::system_settings::get_default_provider::<S>)
                .put(api::system_settings::update_default_provider::<S>)
                .delete(api::system_settings::reset_default_provider::<S>),
        )
        .route(
            "/api/v1/settings/email/test-connection",
            post(api::system_settings::test_email_connection::<S>),
        )
        .route(
            "/api/v1/settings/email/test-email",
            post(api::system_settings::send_test_email::<S>),
        )
        .route_layer(from_fn_with_state(admin_auth, require_admin_middleware));

    Router::new()
        // Health endpoints
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        .merge(admin_routes)
        // Add middleware
        .layer(ObservabilityLayer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// `/metrics` route, answering 404 when no recorder is installed
pub fn metrics_router(prometheus_handle: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/metrics", get(api::metrics::metrics_handler))
        .with_state(Arc::new(prometheus_handle))
}
