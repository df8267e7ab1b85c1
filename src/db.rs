use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::models::{
    json_column, normalize_ids, normalize_images, ChatThread, Event, LikeEdge, Location, Message,
    UserProfile,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    uid TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    birth_date TEXT,
    gender TEXT NOT NULL DEFAULT '',
    interested_in TEXT NOT NULL DEFAULT '',
    bio TEXT NOT NULL DEFAULT '',
    images TEXT NOT NULL DEFAULT '[]',
    is_avatar_mode INTEGER NOT NULL DEFAULT 0,
    avatar_id TEXT,
    interests TEXT NOT NULL DEFAULT '[]',
    is_complete INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    date_time TEXT,
    location_name TEXT NOT NULL DEFAULT '',
    lat REAL NOT NULL DEFAULT 0,
    lng REAL NOT NULL DEFAULT 0,
    created_by TEXT NOT NULL,
    is_private INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS event_attendees (
    event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    uid TEXT NOT NULL,
    PRIMARY KEY (event_id, uid)
);
CREATE INDEX IF NOT EXISTS event_attendees_uid ON event_attendees (uid);

CREATE TABLE IF NOT EXISTS likes (
    id TEXT PRIMARY KEY NOT NULL,
    from_uid TEXT NOT NULL,
    to_uid TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS likes_from ON likes (from_uid);
CREATE INDEX IF NOT EXISTS likes_to ON likes (to_uid);

CREATE TABLE IF NOT EXISTS chats (
    id TEXT PRIMARY KEY NOT NULL,
    participants TEXT NOT NULL DEFAULT '[]',
    last_message TEXT,
    updated_at INTEGER
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY NOT NULL,
    chat_id TEXT NOT NULL,
    sender_id TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS messages_chat ON messages (chat_id, created_at);
"#;

pub async fn init(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(db_pool).await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    uid: String,
    name: String,
    birth_date: Option<String>,
    gender: String,
    interested_in: String,
    bio: String,
    images: Option<String>,
    is_avatar_mode: bool,
    avatar_id: Option<String>,
    interests: Option<String>,
    is_complete: bool,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        let images = json_column("images", &row.uid, row.images.as_deref());
        let interests = json_column("interests", &row.uid, row.interests.as_deref());
        UserProfile {
            images: normalize_images(images),
            interests: normalize_ids(interests),
            avatar_id: row.avatar_id.filter(|id| !id.is_empty()),
            uid: row.uid,
            name: row.name,
            birth_date: row.birth_date.filter(|date| !date.is_empty()),
            gender: row.gender,
            interested_in: row.interested_in,
            bio: row.bio,
            is_avatar_mode: row.is_avatar_mode,
            is_complete: row.is_complete,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    category: String,
    date_time: Option<String>,
    location_name: String,
    lat: f64,
    lng: f64,
    created_by: String,
    is_private: bool,
    created_at: i64,
}

impl EventRow {
    fn into_event(self, attendees: Vec<String>) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            date_time: self.date_time.filter(|when| !when.is_empty()),
            location: Location {
                name: self.location_name,
                lat: self.lat,
                lng: self.lng,
            },
            created_by: self.created_by,
            is_private: self.is_private,
            attendees,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: String,
    participants: Option<String>,
    last_message: Option<String>,
    updated_at: Option<i64>,
}

impl From<ChatRow> for ChatThread {
    fn from(row: ChatRow) -> Self {
        let participants = json_column("participants", &row.id, row.participants.as_deref());
        ChatThread {
            participants,
            id: row.id,
            last_message: row.last_message,
            updated_at: row.updated_at,
        }
    }
}

pub async fn load_profile(
    db_pool: &SqlitePool,
    uid: &str,
) -> Result<Option<UserProfile>, sqlx::Error> {
    let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE uid=?")
        .bind(uid)
        .fetch_optional(db_pool)
        .await?;
    Ok(row.map(UserProfile::from))
}

/// Profiles that no longer exist are simply absent from the map.
pub async fn load_profiles(
    db_pool: &SqlitePool,
    uids: &[&str],
) -> anyhow::Result<HashMap<String, UserProfile>> {
    if uids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<UserRow> =
        sqlx::query_as("SELECT * FROM users WHERE uid IN (SELECT value FROM json_each(?))")
            .bind(serde_json::to_string(uids)?)
            .fetch_all(db_pool)
            .await?;
    Ok(rows
        .into_iter()
        .map(UserProfile::from)
        .map(|profile| (profile.uid.clone(), profile))
        .collect())
}

pub async fn save_profile(db_pool: &SqlitePool, profile: &UserProfile) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO users (uid,name,birth_date,gender,interested_in,bio,images,
                            is_avatar_mode,avatar_id,interests,is_complete)
         VALUES (?,?,?,?,?,?,?,?,?,?,?)
         ON CONFLICT(uid) DO UPDATE SET
            name=excluded.name, birth_date=excluded.birth_date, gender=excluded.gender,
            interested_in=excluded.interested_in, bio=excluded.bio, images=excluded.images,
            is_avatar_mode=excluded.is_avatar_mode, avatar_id=excluded.avatar_id,
            interests=excluded.interests, is_complete=excluded.is_complete",
    )
    .bind(&profile.uid)
    .bind(&profile.name)
    .bind(&profile.birth_date)
    .bind(&profile.gender)
    .bind(&profile.interested_in)
    .bind(&profile.bio)
    .bind(serde_json::to_string(&profile.images)?)
    .bind(profile.is_avatar_mode)
    .bind(&profile.avatar_id)
    .bind(serde_json::to_string(&profile.interests)?)
    .bind(profile.is_complete)
    .execute(db_pool)
    .await?;
    Ok(())
}

fn group_attendees(rows: Vec<(String, String)>) -> HashMap<String, Vec<String>> {
    let mut attendees: HashMap<String, Vec<String>> = HashMap::new();
    for (event_id, uid) in rows {
        attendees.entry(event_id).or_default().push(uid);
    }
    attendees
}

async fn attendees_by_event(
    db_pool: &SqlitePool,
) -> Result<HashMap<String, Vec<String>>, sqlx::Error> {
    let rows = sqlx::query_as("SELECT event_id,uid FROM event_attendees ORDER BY rowid")
        .fetch_all(db_pool)
        .await?;
    Ok(group_attendees(rows))
}

/// Every event, newest first.
pub async fn load_events(db_pool: &SqlitePool) -> Result<Vec<Event>, sqlx::Error> {
    let rows: Vec<EventRow> =
        sqlx::query_as("SELECT * FROM events ORDER BY created_at DESC, rowid DESC")
            .fetch_all(db_pool)
            .await?;
    let mut attendees = attendees_by_event(db_pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let going = attendees.remove(&row.id).unwrap_or_default();
            row.into_event(going)
        })
        .collect())
}

/// Events both `a` and `b` attend, newest first.
pub async fn events_attended_by_both(
    db_pool: &SqlitePool,
    a: &str,
    b: &str,
) -> anyhow::Result<Vec<Event>> {
    let rows: Vec<EventRow> = sqlx::query_as(
        "SELECT e.* FROM events e
         JOIN event_attendees x ON x.event_id=e.id AND x.uid=?
         JOIN event_attendees y ON y.event_id=e.id AND y.uid=?
         ORDER BY e.created_at DESC, e.rowid DESC",
    )
    .bind(a)
    .bind(b)
    .fetch_all(db_pool)
    .await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    let found = sqlx::query_as(
        "SELECT event_id,uid FROM event_attendees
         WHERE event_id IN (SELECT value FROM json_each(?)) ORDER BY rowid",
    )
    .bind(serde_json::to_string(&ids)?)
    .fetch_all(db_pool)
    .await?;
    let mut attendees = group_attendees(found);

    Ok(rows
        .into_iter()
        .map(|row| {
            let going = attendees.remove(&row.id).unwrap_or_default();
            row.into_event(going)
        })
        .collect())
}

pub async fn load_event(db_pool: &SqlitePool, id: &str) -> Result<Option<Event>, sqlx::Error> {
    let Some(row): Option<EventRow> = sqlx::query_as("SELECT * FROM events WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?
    else {
        return Ok(None);
    };

    let attendees: Vec<(String,)> =
        sqlx::query_as("SELECT uid FROM event_attendees WHERE event_id=? ORDER BY rowid")
            .bind(id)
            .fetch_all(db_pool)
            .await?;

    Ok(Some(row.into_event(attendees.into_iter().map(|(uid,)| uid).collect())))
}

pub async fn likes_sent(db_pool: &SqlitePool, uid: &str) -> Result<Vec<LikeEdge>, sqlx::Error> {
    sqlx::query_as(
        "SELECT from_uid,to_uid,timestamp FROM likes WHERE from_uid=? ORDER BY timestamp, rowid",
    )
        .bind(uid)
        .fetch_all(db_pool)
        .await
}

pub async fn likes_received(
    db_pool: &SqlitePool,
    uid: &str,
) -> Result<Vec<LikeEdge>, sqlx::Error> {
    sqlx::query_as(
        "SELECT from_uid,to_uid,timestamp FROM likes WHERE to_uid=? ORDER BY timestamp, rowid",
    )
        .bind(uid)
        .fetch_all(db_pool)
        .await
}

/// Edges in either direction between `a` and `b`.
pub async fn likes_between(
    db_pool: &SqlitePool,
    a: &str,
    b: &str,
) -> Result<Vec<LikeEdge>, sqlx::Error> {
    sqlx::query_as("SELECT from_uid,to_uid,timestamp FROM likes WHERE id IN (?,?)")
        .bind(LikeEdge::edge_id(a, b))
        .bind(LikeEdge::edge_id(b, a))
        .fetch_all(db_pool)
        .await
}

/// Threads that list `uid` as a participant, in storage order. A row whose participants
/// do not parse is left out.
pub async fn threads_for(db_pool: &SqlitePool, uid: &str) -> anyhow::Result<Vec<ChatThread>> {
    // the substring match only narrows the scan, membership is checked after parsing
    let rows: Vec<ChatRow> = sqlx::query_as(
        "SELECT id,participants,last_message,updated_at FROM chats
         WHERE instr(participants, ?) > 0",
    )
    .bind(serde_json::to_string(uid)?)
    .fetch_all(db_pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(ChatThread::from)
        .filter(|thread| thread.participants.iter().any(|participant| participant == uid))
        .collect())
}

pub async fn load_thread(
    db_pool: &SqlitePool,
    id: &str,
) -> Result<Option<ChatThread>, sqlx::Error> {
    let row: Option<ChatRow> =
        sqlx::query_as("SELECT id,participants,last_message,updated_at FROM chats WHERE id=?")
            .bind(id)
            .fetch_optional(db_pool)
            .await?;
    Ok(row.map(ChatThread::from))
}

pub async fn messages_in(db_pool: &SqlitePool, chat_id: &str) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM messages WHERE chat_id=? ORDER BY created_at, rowid")
        .bind(chat_id)
        .fetch_all(db_pool)
        .await
}
