pub mod engine;
mod like;
mod matches;

use axum::{routing::post, Router};

use crate::AppState;

pub use matches::matches;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{uid}", post(like::like))
}
