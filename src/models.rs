use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Number of photo slots on a profile. Slots are positional, empty ones stay `None`.
pub const IMAGE_SLOTS: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub name: String,
    pub birth_date: Option<String>,
    pub gender: String,
    pub interested_in: String,
    pub bio: String,
    pub images: Vec<Option<String>>,
    pub is_avatar_mode: bool,
    pub avatar_id: Option<String>,
    pub interests: Vec<String>,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// `None` means "anytime".
    pub date_time: Option<String>,
    pub location: Location,
    pub created_by: String,
    pub is_private: bool,
    pub attendees: Vec<String>,
    pub created_at: i64,
}

impl Event {
    pub fn is_attending(&self, uid: &str) -> bool {
        self.attendees.iter().any(|attendee| attendee == uid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LikeEdge {
    #[sqlx(rename = "from_uid")]
    pub from: String,
    #[sqlx(rename = "to_uid")]
    pub to: String,
    pub timestamp: i64,
}

impl LikeEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, timestamp: i64) -> Self {
        LikeEdge {
            from: from.into(),
            to: to.into(),
            timestamp,
        }
    }

    /// At most one edge exists per ordered pair, so the id is derived from it.
    pub fn edge_id(from: &str, to: &str) -> String {
        format!("{from}_{to}")
    }

    pub fn id(&self) -> String {
        Self::edge_id(&self.from, &self.to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatThread {
    pub id: String,
    pub participants: Vec<String>,
    pub last_message: Option<String>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: i64,
}

pub fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Reads a JSON column, falling back to the default when it is missing or malformed.
/// One bad record must not take the whole listing down with it.
pub fn json_column<T>(column: &str, owner: &str, raw: Option<&str>) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return T::default();
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("ignoring malformed {column} on {owner}: {err}");
            T::default()
        }
    }
}

pub fn normalize_images(mut images: Vec<Option<String>>) -> Vec<Option<String>> {
    images.truncate(IMAGE_SLOTS);
    for slot in images.iter_mut() {
        if slot.as_deref().is_some_and(|url| url.trim().is_empty()) {
            *slot = None;
        }
    }
    images.resize(IMAGE_SLOTS, None);
    images
}

/// Set semantics with first-seen order; blank tags are dropped.
pub fn normalize_ids(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if id.is_empty() || out.iter().any(|seen| seen == id) {
            continue;
        }
        out.push(id.to_owned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_edge_id_is_ordered() {
        assert_eq!(LikeEdge::edge_id("a", "b"), "a_b");
        assert_eq!(LikeEdge::new("b", "a", 0).id(), "b_a");
    }

    #[test]
    fn malformed_json_column_degrades_to_default() {
        let parsed: Vec<String> = json_column("attendees", "ev1", Some("{not json"));
        assert!(parsed.is_empty());
        let parsed: Vec<String> = json_column("attendees", "ev1", None);
        assert!(parsed.is_empty());
        let parsed: Vec<String> = json_column("attendees", "ev1", Some(r#"["a","b"]"#));
        assert_eq!(parsed, vec!["a", "b"]);
    }

    #[test]
    fn images_always_have_six_slots() {
        let short = normalize_images(vec![Some("a.jpg".into()), Some(" ".into())]);
        assert_eq!(short.len(), IMAGE_SLOTS);
        assert_eq!(short[0].as_deref(), Some("a.jpg"));
        assert_eq!(short[1], None);

        let long = normalize_images((0..9).map(|i| Some(format!("{i}.jpg"))).collect());
        assert_eq!(long.len(), IMAGE_SLOTS);
        assert_eq!(long[5].as_deref(), Some("5.jpg"));
    }

    #[test]
    fn ids_are_deduplicated_in_order() {
        let ids = normalize_ids(vec!["b".into(), "a".into(), "b".into(), "".into()]);
        assert_eq!(ids, vec!["b", "a"]);
    }
}
