use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, models::Event, session::require_viewer, AppError, AppResult};

async fn existing_event(db_pool: &SqlitePool, id: &str) -> AppResult<()> {
    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM events WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    found.map(|_| ()).ok_or_else(|| AppError::sorry("event"))
}

async fn reload(db_pool: &SqlitePool, id: &str) -> AppResult<Json<Event>> {
    db::load_event(db_pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::sorry("event"))
}

/// Joins the event. Knowing the id is enough, which is how private events are shared.
#[debug_handler]
pub(crate) async fn join(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Event>> {
    let viewer = require_viewer(&session).await?;
    existing_event(&db_pool, &id).await?;

    sqlx::query("INSERT OR IGNORE INTO event_attendees (event_id,uid) VALUES (?,?)")
        .bind(&id)
        .bind(&viewer)
        .execute(&db_pool)
        .await?;

    reload(&db_pool, &id).await
}

#[debug_handler]
pub(crate) async fn leave(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Event>> {
    let viewer = require_viewer(&session).await?;
    existing_event(&db_pool, &id).await?;

    sqlx::query("DELETE FROM event_attendees WHERE event_id=? AND uid=?")
        .bind(&id)
        .bind(&viewer)
        .execute(&db_pool)
        .await?;

    reload(&db_pool, &id).await
}
