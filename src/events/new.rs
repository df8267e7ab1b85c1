use axum::{debug_handler, extract::{Path, State}, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    db,
    models::{now_millis, Event, Location},
    session::require_viewer,
    AppError, AppResult,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct EventInput {
    title: String,
    description: String,
    category: String,
    date_time: Option<String>,
    location: Location,
    is_private: bool,
}

impl EventInput {
    fn validate(self) -> AppResult<EventInput> {
        if self.title.trim().is_empty() {
            return Err(AppError::bad_request("event needs a title"));
        }
        Ok(EventInput {
            title: self.title.trim().to_owned(),
            date_time: self.date_time.filter(|when| !when.trim().is_empty()),
            ..self
        })
    }
}

/// Creates an event owned by the viewer, who joins it right away.
#[debug_handler]
pub(crate) async fn new_event(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(input): Json<EventInput>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let viewer = require_viewer(&session).await?;
    let input = input.validate()?;

    let id = Uuid::now_v7().to_string();
    let created_at = now_millis();

    let mut tx = db_pool.begin().await?;
    sqlx::query(
        "INSERT INTO events (id,title,description,category,date_time,location_name,lat,lng,
                             created_by,is_private,created_at)
         VALUES (?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.date_time)
    .bind(&input.location.name)
    .bind(input.location.lat)
    .bind(input.location.lng)
    .bind(&viewer)
    .bind(input.is_private)
    .bind(created_at)
    .execute(&mut *tx)
    .await?;
    sqlx::query("INSERT INTO event_attendees (event_id,uid) VALUES (?,?)")
        .bind(&id)
        .bind(&viewer)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    log::info!("u/{viewer} created event {id}");
    Ok((
        StatusCode::CREATED,
        Json(Event {
            id,
            title: input.title,
            description: input.description,
            category: input.category,
            date_time: input.date_time,
            location: input.location,
            attendees: vec![viewer.clone()],
            created_by: viewer,
            is_private: input.is_private,
            created_at,
        }),
    ))
}

#[debug_handler]
pub(crate) async fn edit_event(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(input): Json<EventInput>,
) -> AppResult<Json<Event>> {
    let viewer = require_viewer(&session).await?;
    let input = input.validate()?;

    let Some(event) = db::load_event(&db_pool, &id).await? else {
        return Err(AppError::sorry("event"));
    };
    if event.created_by != viewer {
        return Err(AppError::forbidden("only the creator can edit this event"));
    }

    sqlx::query(
        "UPDATE events SET title=?,description=?,category=?,date_time=?,
                           location_name=?,lat=?,lng=?,is_private=?
         WHERE id=?",
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.date_time)
    .bind(&input.location.name)
    .bind(input.location.lat)
    .bind(input.location.lng)
    .bind(input.is_private)
    .bind(&id)
    .execute(&db_pool)
    .await?;

    Ok(Json(Event {
        title: input.title,
        description: input.description,
        category: input.category,
        date_time: input.date_time,
        location: input.location,
        is_private: input.is_private,
        ..event
    }))
}
