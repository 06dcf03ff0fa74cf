pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::{AnnouncementStore, MemoryStore, TeacherStore};
use services::credentials::{CredentialCheck, TeacherDirectory};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub announcements: Arc<dyn AnnouncementStore>,
    pub credentials: Arc<dyn CredentialCheck>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State whose credential check looks teachers up in `teachers`.
    pub fn new(
        announcements: Arc<dyn AnnouncementStore>,
        teachers: Arc<dyn TeacherStore>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            announcements,
            credentials: Arc::new(TeacherDirectory::new(teachers)),
            config,
        }
    }

    pub fn in_memory(store: Arc<MemoryStore>, config: Arc<Config>) -> Self {
        Self::new(store.clone(), store, config)
    }
}

/// Build the full router: announcement CRUD plus health and metrics.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_origin(cors_origin(state.config.app_base_url.clone()));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .route(
            "/announcements",
            get(routes::announcements::list_announcements)
                .post(routes::announcements::create_announcement),
        )
        .route(
            "/announcements/",
            get(routes::announcements::list_announcements)
                .post(routes::announcements::create_announcement),
        )
        .route(
            "/announcements/{id}",
            get(routes::announcements::get_announcement)
                .put(routes::announcements::update_announcement)
                .delete(routes::announcements::delete_announcement),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Allow the configured base URL and localhost during development.
fn cors_origin(base: String) -> AllowOrigin {
    AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base
    })
}
