use std::sync::Arc;

use axum::{debug_handler, extract::{Path, State}, http::StatusCode, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    avatars::AvatarCatalogue,
    db,
    models::Event,
    profiles::ProfileCard,
    session::{self, require_viewer},
    AppError, AppResult, AppState,
};

use super::visibility::can_view;

#[derive(Serialize)]
pub(crate) struct EventDetail {
    #[serde(flatten)]
    event: Event,
    joined: bool,
    /// Attendees with a profile, in join order.
    going: Vec<ProfileCard>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn event(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(avatars): State<Arc<AvatarCatalogue>>,
    session: Session,
) -> AppResult<Json<EventDetail>> {
    let viewer = session::viewer(&session).await?;

    let Some(event) = db::load_event(&db_pool, &id).await? else {
        return Err(AppError::sorry("event"));
    };
    if !can_view(viewer.as_deref(), &event) {
        return Err(AppError::sorry("event"));
    }

    let attendees: Vec<&str> = event.attendees.iter().map(String::as_str).collect();
    let profiles = db::load_profiles(&db_pool, &attendees).await?;
    let going = event
        .attendees
        .iter()
        .filter_map(|uid| profiles.get(uid))
        .map(|profile| ProfileCard::new(profile, &avatars))
        .collect();

    Ok(Json(EventDetail {
        joined: viewer.as_deref().is_some_and(|viewer| event.is_attending(viewer)),
        going,
        event,
    }))
}

#[debug_handler]
pub(crate) async fn delete_event(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<StatusCode> {
    let viewer = require_viewer(&session).await?;

    let Some((created_by,)): Option<(String,)> =
        sqlx::query_as("SELECT created_by FROM events WHERE id=?")
            .bind(&id)
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::sorry("event"));
    };
    if created_by != viewer {
        return Err(AppError::forbidden("only the creator can delete this event"));
    }

    let mut tx = db_pool.begin().await?;
    sqlx::query("DELETE FROM event_attendees WHERE event_id=?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM events WHERE id=?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    log::info!("u/{viewer} deleted event {id}");
    Ok(StatusCode::NO_CONTENT)
}
