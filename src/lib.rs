pub mod appresult;
pub mod avatars;
pub mod chats;
pub mod config;
pub mod db;
pub mod events;
pub mod likes;
pub mod models;
pub mod profiles;
pub mod session;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use avatars::AvatarCatalogue;
pub use chats::ChatFrame;
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub avatars: Arc<AvatarCatalogue>,
    pub tx: broadcast::Sender<ChatFrame>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, avatars: AvatarCatalogue) -> Self {
        AppState {
            db_pool,
            avatars: Arc::new(avatars),
            tx: broadcast::channel(256).0,
        }
    }
}

pub fn app(state: AppState, config: &Config) -> anyhow::Result<Router> {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            config.session_idle_minutes,
        )));

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]),
        None => CorsLayer::permissive(),
    };

    Ok(Router::new()
        .route("/session", get(session::whoami).post(session::sign_in))
        .route("/logout", post(session::logout))
        .route("/matches", get(likes::matches))
        .nest("/p", profiles::router())
        .nest("/l", likes::router())
        .nest("/e", events::router())
        .nest("/c", chats::router())
        .nest("/avatars", avatars::router())
        .with_state(state)
        .layer(session_layer)
        .layer(cors))
}
