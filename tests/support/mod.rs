#![allow(dead_code)]

use std::sync::Arc;

use placetodate::{app, db, AppState, AvatarCatalogue, Config};
use reqwest::{
    cookie::{CookieStore, Jar},
    header::COOKIE,
    Client, StatusCode,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{tungstenite::client::IntoClientRequest, MaybeTlsStream, WebSocketStream};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const AVATARS: [&str; 3] = ["a.jpg", "b.jpg", "c.jpg"];

/// Serves the app on an ephemeral port backed by a private in-memory database.
pub async fn spawn_app() -> String {
    // one connection, kept forever, so the in-memory database is never dropped
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init(&db_pool).await.unwrap();

    let ids = AVATARS.iter().map(|id| id.to_string()).collect();
    let avatars = AvatarCatalogue::new("/nowhere", ids);
    let config = Config {
        database_url: "sqlite::memory:".to_owned(),
        bind_addr: "127.0.0.1:0".to_owned(),
        avatar_dir: "/nowhere".into(),
        session_idle_minutes: 60,
        cors_origin: None,
    };
    let app = app(AppState::new(db_pool, avatars), &config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// A cookie-carrying client for one user.
pub struct User {
    pub uid: String,
    pub base: String,
    pub client: Client,
    jar: Arc<Jar>,
}

impl User {
    pub fn anonymous(base: &str) -> User {
        let jar = Arc::new(Jar::default());
        User {
            uid: String::new(),
            base: base.to_owned(),
            client: Client::builder().cookie_provider(jar.clone()).build().unwrap(),
            jar,
        }
    }

    pub async fn sign_in(base: &str, uid: &str) -> User {
        let mut user = User::anonymous(base);
        user.uid = uid.to_owned();
        let res = user
            .client
            .post(user.url("/session"))
            .json(&json!({ "user_id": uid }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        user
    }

    /// Signs in and saves a minimal profile.
    pub async fn with_profile(base: &str, uid: &str) -> User {
        let user = User::sign_in(base, uid).await;
        let (status, _) = user
            .put(
                "/p/me",
                json!({
                    "name": uid.to_uppercase(),
                    "birth_date": "1995-06-01",
                    "images": ["https://img.example/1.jpg"],
                    "interests": ["hiking", "coffee"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        user
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Opens a websocket carrying this user's session cookie.
    pub async fn ws(&self, path: &str) -> Socket {
        let url = self.url(path);
        let mut request = url.replacen("http", "ws", 1).into_client_request().unwrap();
        if let Some(cookie) = self.jar.cookies(&url.parse().unwrap()) {
            request.headers_mut().insert(COOKIE, cookie);
        }
        let (socket, _) = tokio_tungstenite::connect_async(request).await.unwrap();
        socket
    }

    async fn read(res: reqwest::Response) -> (StatusCode, Value) {
        let status = res.status();
        let text = res.text().await.unwrap();
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        Self::read(self.client.get(self.url(path)).send().await.unwrap()).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        Self::read(self.client.post(self.url(path)).json(&body).send().await.unwrap()).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        Self::read(self.client.put(self.url(path)).json(&body).send().await.unwrap()).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        Self::read(self.client.delete(self.url(path)).send().await.unwrap()).await
    }

    pub async fn like(&self, other: &str) -> Value {
        let (status, body) = self.post(&format!("/l/{other}"), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    pub async fn create_event(&self, title: &str, is_private: bool) -> String {
        let (status, body) = self
            .post(
                "/e",
                json!({
                    "title": title,
                    "category": "coffee",
                    "location": { "name": "Corner Cafe", "lat": 52.52, "lng": 13.40 },
                    "is_private": is_private,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_owned()
    }
}

pub fn uids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["uid"].as_str().unwrap().to_owned())
        .collect()
}

pub fn titles(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_owned())
        .collect()
}
