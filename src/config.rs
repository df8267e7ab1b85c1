use std::path::PathBuf;

use anyhow::Context;

/// Process configuration, read from `.env` and then the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub avatar_dir: PathBuf,
    pub session_idle_minutes: i64,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();

        let database_url = dotenv::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
        let avatar_dir = dotenv::var("AVATAR_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/res/avatars")));
        let session_idle_minutes = match dotenv::var("SESSION_IDLE_MINUTES") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("SESSION_IDLE_MINUTES={raw} is not a number"))?,
            Err(_) => 60,
        };
        let cors_origin = dotenv::var("CORS_ORIGIN").ok().filter(|origin| !origin.is_empty());

        Ok(Config {
            database_url,
            bind_addr,
            avatar_dir,
            session_idle_minutes,
            cors_origin,
        })
    }
}
