mod assign;

use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::{AppError, AppResult, AppState};

pub use assign::{seed_hash, AvatarCatalogue};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(image))
}

pub fn avatar_url(id: &str) -> String {
    format!("/avatars/{id}")
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(State(avatars): State<Arc<AvatarCatalogue>>) -> axum::Json<Vec<String>> {
    axum::Json(avatars.ids().to_vec())
}

#[debug_handler(state = AppState)]
pub(crate) async fn image(
    Path(id): Path<String>,
    State(avatars): State<Arc<AvatarCatalogue>>,
) -> AppResult<Response> {
    let Some(path) = avatars.path_of(&id) else {
        return Err(AppError::sorry("avatar"));
    };

    let bytes = tokio::fs::read(&path).await?;
    let content_type = if id.to_ascii_lowercase().ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    };

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
