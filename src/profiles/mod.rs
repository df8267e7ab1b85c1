mod me;
mod page;

use axum::{routing::{get, post}, Router};
use serde::Serialize;

use crate::{avatars::{avatar_url, AvatarCatalogue}, models::{Event, UserProfile}, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me::get_me).put(me::save_me).delete(me::delete_me))
        .route("/me/avatar/shuffle", post(me::shuffle_avatar))
        .route("/{uid}", get(page::profile))
}

/// What lists show about another user.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileCard {
    pub uid: String,
    pub name: String,
    pub age: Option<i32>,
    pub photo: Option<String>,
    pub is_avatar_mode: bool,
}

impl ProfileCard {
    pub fn new(profile: &UserProfile, avatars: &AvatarCatalogue) -> Self {
        ProfileCard {
            uid: profile.uid.clone(),
            name: profile.name.clone(),
            age: profile.birth_date.as_deref().and_then(|date| age_in(date, current_year())),
            photo: photo_of(profile, avatars),
            is_avatar_mode: profile.is_avatar_mode,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub date_time: Option<String>,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        EventSummary {
            id: event.id.clone(),
            title: event.title.clone(),
            category: event.category.clone(),
            date_time: event.date_time.clone(),
        }
    }
}

/// Avatar when the user hides behind one, otherwise the first filled photo slot.
pub fn photo_of(profile: &UserProfile, avatars: &AvatarCatalogue) -> Option<String> {
    if profile.is_avatar_mode {
        return avatars.resolve(profile).map(avatar_url);
    }
    profile.images.iter().flatten().next().cloned()
}

fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

/// Years between the birth year and `year`; only the year part of the date counts.
pub fn age_in(birth_date: &str, year: i32) -> Option<i32> {
    let birth_year: i32 = birth_date.get(..4)?.parse().ok()?;
    Some(year - birth_year)
}
