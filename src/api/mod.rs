use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod categories;
mod error;
mod items;
mod observability;
pub mod types;
mod validation;
mod vaults;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{AuthService, CategoryService, ItemService, VaultService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn vault_service(&self) -> &Arc<dyn VaultService> {
        &self.shared.vault_service
    }

    #[must_use]
    pub fn item_service(&self) -> &Arc<dyn ItemService> {
        &self.shared.item_service
    }

    #[must_use]
    pub fn category_service(&self) -> &Arc<dyn CategoryService> {
        &self.shared.category_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, inactivity_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_inactivity_minutes,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            inactivity_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/health", get(observability::health))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/api-key", get(auth::get_api_key))
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        .route("/vaults", get(vaults::list_vaults))
        .route("/vaults", post(vaults::create_vault))
        .route("/vaults/{id}", get(vaults::get_vault))
        .route("/vaults/{id}", put(vaults::update_vault))
        .route("/vaults/{id}", delete(vaults::delete_vault))
        .route("/vaults/{id}/members", post(vaults::add_member))
        .route("/vaults/{id}/members/{user_id}", put(vaults::update_member))
        .route(
            "/vaults/{id}/members/{user_id}",
            delete(vaults::remove_member),
        )
        .route("/items", get(items::list_items))
        .route("/items", post(items::create_item))
        .route("/items/expiring", get(items::list_expiring))
        .route("/items/reminders/due", get(items::list_due_reminders))
        .route("/items/{id}", get(items::get_item))
        .route("/items/{id}", put(items::update_item))
        .route("/items/{id}", delete(items::delete_item))
        .route("/items/{id}/status", put(items::set_status))
        .route("/items/{id}/attachments", post(items::add_attachment))
        .route(
            "/items/{id}/attachments/{attachment_id}",
            delete(items::remove_attachment),
        )
        .route("/items/{id}/reminders", post(items::add_reminder))
        .route(
            "/items/{id}/reminders/{reminder_id}",
            delete(items::remove_reminder),
        )
        .route("/categories", get(categories::list_categories))
        .route("/categories", post(categories::create_category))
        .route(
            "/categories/with-items",
            get(categories::list_categories_with_items),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
