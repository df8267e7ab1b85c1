use axum::{debug_handler, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{AppError, AppResult};

pub const USER_ID: &str = "user_id";

/// The signed-in user, if any.
pub async fn viewer(session: &Session) -> AppResult<Option<String>> {
    Ok(session.get::<String>(USER_ID).await?)
}

pub async fn require_viewer(session: &Session) -> AppResult<String> {
    viewer(session).await?.ok_or_else(AppError::unauthorized)
}

#[derive(Deserialize)]
pub(crate) struct SignInBody {
    user_id: String,
}

#[derive(Serialize)]
pub(crate) struct WhoAmI {
    user_id: Option<String>,
}

/// Records the user id handed over by the identity provider. Credentials are checked
/// upstream; this service only remembers who the caller is.
///
/// Nothing here verifies `user_id`, so whoever can reach this route can act as any user.
/// Only expose it through the identity provider's gateway, never directly.
#[debug_handler]
pub(crate) async fn sign_in(
    session: Session,
    Json(SignInBody { user_id }): Json<SignInBody>,
) -> AppResult<StatusCode> {
    let user_id = user_id.trim().to_owned();
    if user_id.is_empty() {
        return Err(AppError::bad_request("user_id is empty"));
    }

    session.cycle_id().await?;
    session.insert(USER_ID, &user_id).await?;
    log::info!("welcome u/{user_id}");
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
pub(crate) async fn whoami(session: Session) -> AppResult<Json<WhoAmI>> {
    Ok(Json(WhoAmI {
        user_id: viewer(&session).await?,
    }))
}

#[debug_handler]
pub(crate) async fn logout(session: Session) -> AppResult<StatusCode> {
    session.flush().await?;
    Ok(StatusCode::NO_CONTENT)
}
