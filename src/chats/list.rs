use std::sync::Arc;

use axum::{debug_handler, extract::State, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    avatars::AvatarCatalogue,
    db,
    profiles::ProfileCard,
    session::require_viewer,
    AppResult, AppState,
};

use super::thread::{chat_list, other_participant};

#[derive(Serialize)]
pub(crate) struct ChatItem {
    id: String,
    other_user_id: Option<String>,
    /// `None` when the other user deleted their profile.
    other_user: Option<ProfileCard>,
    last_message: Option<String>,
    updated_at: Option<i64>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn chats(
    State(db_pool): State<SqlitePool>,
    State(avatars): State<Arc<AvatarCatalogue>>,
    session: Session,
) -> AppResult<Json<Vec<ChatItem>>> {
    let viewer = require_viewer(&session).await?;

    let threads = db::threads_for(&db_pool, &viewer).await?;
    let listed = chat_list(&threads, &viewer);
    let others: Vec<&str> = listed
        .iter()
        .copied()
        .filter_map(|thread| other_participant(thread, &viewer))
        .collect();
    let profiles = db::load_profiles(&db_pool, &others).await?;

    let items = listed
        .into_iter()
        .map(|thread| {
            let other = other_participant(thread, &viewer);
            ChatItem {
                id: thread.id.clone(),
                other_user_id: other.map(str::to_owned),
                other_user: other
                    .and_then(|uid| profiles.get(uid))
                    .map(|profile| ProfileCard::new(profile, &avatars)),
                last_message: thread.last_message.clone(),
                updated_at: thread.updated_at,
            }
        })
        .collect();

    Ok(Json(items))
}
