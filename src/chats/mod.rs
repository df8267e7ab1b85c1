mod list;
mod msg;
pub mod thread;
mod ws;

use axum::{routing::get, Router};

use crate::AppState;

pub use msg::ChatFrame;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::chats))
        .route("/{uid}", get(msg::conversation).post(msg::send))
        .route("/{uid}/ws", get(ws::chat_ws))
}
