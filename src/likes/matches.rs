use std::{collections::HashMap, sync::Arc};

use axum::{debug_handler, extract::State, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    avatars::AvatarCatalogue,
    db,
    models::UserProfile,
    profiles::ProfileCard,
    session::require_viewer,
    AppResult, AppState,
};

use super::engine;

#[derive(Debug, Serialize)]
pub struct Counterpart {
    #[serde(flatten)]
    pub card: ProfileCard,
    pub shared_events: usize,
}

#[derive(Debug, Serialize)]
pub struct MatchesPage {
    pub matches: Vec<Counterpart>,
    pub likes_you: Vec<Counterpart>,
}

fn enrich(
    uids: &[String],
    profiles: &HashMap<String, UserProfile>,
    shared: &HashMap<String, usize>,
    avatars: &AvatarCatalogue,
) -> Vec<Counterpart> {
    // deleted users drop out here
    uids.iter()
        .filter_map(|uid| {
            let profile = profiles.get(uid)?;
            Some(Counterpart {
                card: ProfileCard::new(profile, avatars),
                shared_events: shared.get(uid).copied().unwrap_or(0),
            })
        })
        .collect()
}

#[debug_handler(state = AppState)]
pub async fn matches(
    State(db_pool): State<SqlitePool>,
    State(avatars): State<Arc<AvatarCatalogue>>,
    session: Session,
) -> AppResult<Json<MatchesPage>> {
    let viewer = require_viewer(&session).await?;

    let sent = db::likes_sent(&db_pool, &viewer).await?;
    let received = db::likes_received(&db_pool, &viewer).await?;
    let events = if received.is_empty() {
        Vec::new()
    } else {
        db::load_events(&db_pool).await?
    };

    let report = engine::classify(&viewer, &sent, &received, &events);
    let counterparts: Vec<&str> =
        report.matches.iter().chain(&report.likes_you).map(String::as_str).collect();
    let profiles = db::load_profiles(&db_pool, &counterparts).await?;

    Ok(Json(MatchesPage {
        matches: enrich(&report.matches, &profiles, &report.shared_events, &avatars),
        likes_you: enrich(&report.likes_you, &profiles, &report.shared_events, &avatars),
    }))
}
