use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db,
    models::{now_millis, LikeEdge},
    session::require_viewer,
    AppError, AppResult,
};

use super::engine;

#[derive(Serialize)]
pub(crate) struct LikeOutcome {
    like_id: String,
    is_match: bool,
}

/// Stores the viewer's like for `uid`. Liking again keeps the first edge.
#[debug_handler]
pub(crate) async fn like(
    Path(uid): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<LikeOutcome>> {
    let viewer = require_viewer(&session).await?;
    if db::load_profile(&db_pool, &uid).await?.is_none() {
        return Err(AppError::sorry("profile"));
    }

    let edge = LikeEdge::new(viewer, uid, now_millis());
    let like_id = edge.id();
    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO likes (id,from_uid,to_uid,timestamp) VALUES (?,?,?,?)",
    )
    .bind(&like_id)
    .bind(&edge.from)
    .bind(&edge.to)
    .bind(edge.timestamp)
    .execute(&db_pool)
    .await?
    .rows_affected();

    let edges = db::likes_between(&db_pool, &edge.from, &edge.to).await?;
    let is_match = engine::is_mutual(&edge.from, &edge.to, &edges);
    if inserted > 0 && is_match {
        log::info!("u/{} likes u/{}, it's a match", edge.from, edge.to);
    } else if inserted > 0 {
        log::info!("u/{} likes u/{}", edge.from, edge.to);
    }

    Ok(Json(LikeOutcome { like_id, is_match }))
}
