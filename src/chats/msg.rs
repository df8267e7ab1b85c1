use std::sync::Arc;

use axum::{debug_handler, extract::{Path, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    avatars::AvatarCatalogue,
    db,
    likes::engine,
    models::{now_millis, Message},
    profiles::{EventSummary, ProfileCard},
    session::require_viewer,
    AppError, AppResult, AppState,
};

use super::thread::{participants, thread_id};

/// A new message, as pushed to every live subscriber of its thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatFrame {
    pub thread_id: String,
    pub message: Message,
}

#[derive(Deserialize)]
pub(crate) struct SendMessageBody {
    pub(crate) text: String,
}

#[derive(Serialize)]
pub(crate) struct Conversation {
    thread_id: String,
    other_user: Option<ProfileCard>,
    messages: Vec<Message>,
    shared_events: Vec<EventSummary>,
}

/// Appends a message to the thread between `sender` and `other`, creating the thread on
/// first use, then fans it out to live subscribers.
pub(crate) async fn send_msg(
    db_pool: &SqlitePool,
    tx: &broadcast::Sender<ChatFrame>,

    sender: &str,
    other: &str,

    SendMessageBody { text }: SendMessageBody,
) -> AppResult<Message> {
    let text = text.trim().to_owned();
    if text.is_empty() {
        return Err(AppError::bad_request("message is empty"));
    }

    let chat_id = thread_id(sender, other);
    let message = Message {
        id: Uuid::now_v7().to_string(),
        chat_id: chat_id.clone(),
        sender_id: sender.to_owned(),
        text,
        created_at: now_millis(),
    };

    let mut db_tx = db_pool.begin().await?;
    sqlx::query(
        "INSERT INTO chats (id,participants,last_message,updated_at) VALUES (?,?,?,?)
         ON CONFLICT(id) DO UPDATE SET
            last_message=excluded.last_message, updated_at=excluded.updated_at",
    )
    .bind(&chat_id)
    .bind(serde_json::to_string(&participants(sender, other))?)
    .bind(&message.text)
    .bind(message.created_at)
    .execute(&mut *db_tx)
    .await?;
    sqlx::query("INSERT INTO messages (id,chat_id,sender_id,text,created_at) VALUES (?,?,?,?,?)")
        .bind(&message.id)
        .bind(&message.chat_id)
        .bind(&message.sender_id)
        .bind(&message.text)
        .bind(message.created_at)
        .execute(&mut *db_tx)
        .await?;
    db_tx.commit().await?;

    // nobody listening is fine
    let _ = tx.send(ChatFrame {
        thread_id: chat_id,
        message: message.clone(),
    });

    Ok(message)
}

#[debug_handler(state = AppState)]
pub(crate) async fn conversation(
    Path(uid): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(avatars): State<Arc<AvatarCatalogue>>,
    session: Session,
) -> AppResult<Json<Conversation>> {
    let viewer = require_viewer(&session).await?;

    let other_user = db::load_profile(&db_pool, &uid)
        .await?
        .map(|profile| ProfileCard::new(&profile, &avatars));
    let chat_id = thread_id(&viewer, &uid);
    if other_user.is_none() && db::load_thread(&db_pool, &chat_id).await?.is_none() {
        return Err(AppError::sorry("chat"));
    }

    let messages = db::messages_in(&db_pool, &chat_id).await?;
    let events = db::events_attended_by_both(&db_pool, &viewer, &uid).await?;
    let shared_events = engine::shared_events(&viewer, &uid, &events)
        .map(EventSummary::from)
        .collect();

    Ok(Json(Conversation {
        thread_id: chat_id,
        other_user,
        messages,
        shared_events,
    }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    Path(uid): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ChatFrame>>,
    session: Session,
    Json(body): Json<SendMessageBody>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let viewer = require_viewer(&session).await?;
    if db::load_profile(&db_pool, &uid).await?.is_none() {
        return Err(AppError::sorry("profile"));
    }

    let message = send_msg(&db_pool, &tx, &viewer, &uid, body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
