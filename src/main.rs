use anyhow::Context;
use placetodate::{app, db, AppState, AvatarCatalogue, Config};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()?;

    let connect_options: SqliteConnectOptions = config
        .database_url
        .parse::<SqliteConnectOptions>()
        .with_context(|| format!("bad DATABASE_URL {}", config.database_url))?
        .create_if_missing(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(connect_options)
        .await?;
    db::init(&db_pool).await?;

    let avatars = AvatarCatalogue::load(&config.avatar_dir)?;
    if avatars.is_empty() {
        log::warn!("no avatars to hand out, avatar mode profiles will have no photo");
    }
    let app = app(AppState::new(db_pool, avatars), &config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
