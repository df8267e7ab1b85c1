use std::sync::Arc;

use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    avatars::{avatar_url, AvatarCatalogue},
    db,
    models::{normalize_ids, normalize_images, UserProfile},
    session::require_viewer,
    AppError, AppResult, AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ProfileInput {
    name: String,
    birth_date: Option<String>,
    gender: String,
    interested_in: String,
    bio: String,
    images: Vec<Option<String>>,
    is_avatar_mode: bool,
    avatar_id: Option<String>,
    interests: Vec<String>,
}

#[derive(Serialize)]
pub(crate) struct OwnProfile {
    #[serde(flatten)]
    profile: UserProfile,
    avatar_url: Option<String>,
}

impl OwnProfile {
    fn new(profile: UserProfile, avatars: &AvatarCatalogue) -> Self {
        let avatar_url = avatars.resolve(&profile).map(avatar_url);
        OwnProfile { profile, avatar_url }
    }
}

/// A profile is complete once it has a name, a birth date and something to look at.
fn is_complete(profile: &UserProfile) -> bool {
    !profile.name.trim().is_empty()
        && profile.birth_date.is_some()
        && (profile.is_avatar_mode || profile.images.iter().any(Option::is_some))
}

#[debug_handler(state = AppState)]
pub(crate) async fn get_me(
    State(db_pool): State<SqlitePool>,
    State(avatars): State<Arc<AvatarCatalogue>>,
    session: Session,
) -> AppResult<Json<OwnProfile>> {
    let uid = require_viewer(&session).await?;
    let profile = db::load_profile(&db_pool, &uid)
        .await?
        .ok_or_else(|| AppError::sorry("profile"))?;
    Ok(Json(OwnProfile::new(profile, &avatars)))
}

#[debug_handler(state = AppState)]
pub(crate) async fn save_me(
    State(db_pool): State<SqlitePool>,
    State(avatars): State<Arc<AvatarCatalogue>>,
    session: Session,
    Json(input): Json<ProfileInput>,
) -> AppResult<Json<OwnProfile>> {
    let uid = require_viewer(&session).await?;

    let avatar_id = input.avatar_id.filter(|id| !id.is_empty());
    if let Some(id) = &avatar_id {
        if !avatars.contains(id) {
            return Err(AppError::bad_request(format!("unknown avatar {id}")));
        }
    }

    let mut profile = UserProfile {
        uid,
        name: input.name.trim().to_owned(),
        birth_date: input.birth_date.filter(|date| !date.trim().is_empty()),
        gender: input.gender,
        interested_in: input.interested_in,
        bio: input.bio,
        images: normalize_images(input.images),
        is_avatar_mode: input.is_avatar_mode,
        avatar_id,
        interests: normalize_ids(input.interests),
        is_complete: false,
    };
    profile.is_complete = is_complete(&profile);

    db::save_profile(&db_pool, &profile).await?;
    log::info!("saved profile u/{}", profile.uid);
    Ok(Json(OwnProfile::new(profile, &avatars)))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_me(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<StatusCode> {
    let uid = require_viewer(&session).await?;
    sqlx::query("DELETE FROM users WHERE uid=?")
        .bind(&uid)
        .execute(&db_pool)
        .await?;
    session.flush().await?;
    log::info!("deleted profile u/{uid}");
    Ok(StatusCode::NO_CONTENT)
}

/// Re-rolls the avatar and switches the profile to avatar mode.
#[debug_handler(state = AppState)]
pub(crate) async fn shuffle_avatar(
    State(db_pool): State<SqlitePool>,
    State(avatars): State<Arc<AvatarCatalogue>>,
    session: Session,
) -> AppResult<Json<OwnProfile>> {
    let uid = require_viewer(&session).await?;
    let mut profile = db::load_profile(&db_pool, &uid)
        .await?
        .ok_or_else(|| AppError::sorry("profile"))?;

    profile.avatar_id = avatars.assign_random().map(str::to_owned);
    profile.is_avatar_mode = true;
    profile.is_complete = is_complete(&profile);

    db::save_profile(&db_pool, &profile).await?;
    Ok(Json(OwnProfile::new(profile, &avatars)))
}
