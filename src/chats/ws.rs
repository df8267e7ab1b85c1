use axum::{
    debug_handler,
    extract::{ws::{Message as WsMessage, WebSocket}, Path, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;

use crate::{db, session::require_viewer, AppError, AppResult, AppState};

use super::{msg::{self, ChatFrame, SendMessageBody}, thread::thread_id};

/// Live feed of the thread between the viewer and `uid`. Incoming `{"text": ...}` frames
/// are sent as the viewer.
#[debug_handler(state = AppState)]
pub(crate) async fn chat_ws(
    Path(uid): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ChatFrame>>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let viewer = require_viewer(&session).await?;
    if db::load_profile(&db_pool, &uid).await?.is_none() {
        return Err(AppError::sorry("profile"));
    }

    Ok(ws
        .on_upgrade(move |socket| relay(socket, db_pool, tx, viewer, uid))
        .into_response())
}

async fn relay(
    socket: WebSocket,
    db_pool: SqlitePool,
    tx: broadcast::Sender<ChatFrame>,
    viewer: String,
    other: String,
) {
    let chat_id = thread_id(&viewer, &other);
    let mut rx = tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let broadcast_task = tokio::spawn(async move {
        loop {
            let frame = match rx.recv().await {
                Ok(frame) => frame,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("chat subscriber on {chat_id} skipped {skipped} frames");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if frame.thread_id != chat_id {
                continue;
            }
            let Ok(json) = serde_json::to_string(&frame) else {
                continue;
            };
            if sender.send(WsMessage::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(incoming)) = receiver.next().await {
        let body: SendMessageBody = match incoming {
            WsMessage::Text(text) => match serde_json::from_str(text.as_str()) {
                Ok(body) => body,
                Err(_) => continue,
            },
            WsMessage::Close(_) => break,
            _ => continue,
        };

        if let Err(err) = msg::send_msg(&db_pool, &tx, &viewer, &other, body).await {
            log::warn!("dropping ws message from u/{viewer}: {:#}", err.err);
        }
        if broadcast_task.is_finished() {
            break;
        }
    }

    broadcast_task.abort();
    let _ = broadcast_task.await;
}
