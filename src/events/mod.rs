mod attend;
mod detail;
mod list;
mod new;
pub mod visibility;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list).post(new::new_event))
        .route("/{id}", get(detail::event).put(new::edit_event).delete(detail::delete_event))
        .route("/{id}/join", post(attend::join))
        .route("/{id}/leave", post(attend::leave))
}
