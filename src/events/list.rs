use axum::{debug_handler, extract::{Query, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, models::Event, session, AppResult};

use super::visibility::visible_events;

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    category: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct EventItem {
    #[serde(flatten)]
    event: Event,
    joined: bool,
}

/// Events the caller may see, their own joined ones first. Works signed out too.
#[debug_handler]
pub(crate) async fn list(
    Query(ListQuery { category }): Query<ListQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<EventItem>>> {
    let viewer = session::viewer(&session).await?;
    let events = db::load_events(&db_pool).await?;

    let items = visible_events(viewer.as_deref(), &events, category.as_deref())
        .into_iter()
        .map(|event| EventItem {
            joined: viewer.as_deref().is_some_and(|viewer| event.is_attending(viewer)),
            event: event.clone(),
        })
        .collect();

    Ok(Json(items))
}
