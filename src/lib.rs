pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod models;
pub mod routes;
pub mod services;
pub mod slug;

pub const STATIC_HASH: &str = env!("STATIC_HASH");

use axum::Router;
use sqlx::SqlitePool;
use time::Duration;
use axum::http::{header, HeaderValue};
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use services::{CredentialStore, EntryService};

#[derive(Clone)]
pub struct AppState {
    pub entries: EntryService,
    pub credentials: CredentialStore,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            entries: EntryService::new(pool.clone()),
            credentials: CredentialStore::new(pool),
        }
    }
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
/// The session table is created here.
pub async fn build_app(pool: SqlitePool, secure_cookies: bool) -> Result<Router, Box<dyn std::error::Error>> {
    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(30)))
        .with_secure(secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax);

    let state = AppState::new(pool);

    let router = Router::new()
        .merge(routes::auth::router())
        .merge(routes::entries::router())
        .fallback(routes::not_found)
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=86400"),
                ))
                .service(ServeDir::new("static")),
        )
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    Ok(router)
}
