use std::sync::Arc;

use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    avatars::AvatarCatalogue,
    db,
    likes::engine,
    session::require_viewer,
    AppError, AppResult, AppState,
};

use super::{EventSummary, ProfileCard};

#[derive(Serialize)]
pub(crate) struct ProfileView {
    #[serde(flatten)]
    card: ProfileCard,
    bio: String,
    gender: String,
    photos: Vec<String>,
    interests: Vec<String>,
    common_interests: Vec<String>,
    liked: bool,
    is_match: bool,
    shared_events: Vec<EventSummary>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    Path(uid): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(avatars): State<Arc<AvatarCatalogue>>,
    session: Session,
) -> AppResult<Json<ProfileView>> {
    let viewer = require_viewer(&session).await?;

    let Some(profile) = db::load_profile(&db_pool, &uid).await? else {
        return Err(AppError::sorry("profile"));
    };
    let own_interests = db::load_profile(&db_pool, &viewer)
        .await?
        .map(|own| own.interests)
        .unwrap_or_default();

    let edges = db::likes_between(&db_pool, &viewer, &uid).await?;
    let liked = edges.iter().any(|edge| edge.from == viewer && edge.to == uid);

    let events = db::events_attended_by_both(&db_pool, &viewer, &uid).await?;
    let shared_events = engine::shared_events(&viewer, &uid, &events)
        .map(EventSummary::from)
        .collect();

    let common_interests = profile
        .interests
        .iter()
        .filter(|interest| own_interests.contains(interest))
        .cloned()
        .collect();

    Ok(Json(ProfileView {
        card: ProfileCard::new(&profile, &avatars),
        photos: profile.images.iter().flatten().cloned().collect(),
        common_interests,
        liked,
        is_match: engine::is_mutual(&viewer, &uid, &edges),
        shared_events,
        bio: profile.bio,
        gender: profile.gender,
        interests: profile.interests,
    }))
}
