use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use school_announcements_api::{
    app,
    config::{Config, StoreBackend},
    db::{self, MemoryStore, PgStore, TeacherStore},
    services::metrics,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let state = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Missing required env var: DATABASE_URL"))?;
            let pool = db::create_pool(database_url, config.database_max_connections).await?;
            db::run_migrations(&pool).await?;
            info!("Database connected and migrations applied");

            let store = Arc::new(PgStore::new(pool));
            AppState::new(store.clone(), store, config.clone())
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store, data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            for username in &config.seed_teachers {
                store.upsert_teacher(username, username).await?;
                info!("Registered teacher: {}", username);
            }
            AppState::in_memory(store, config.clone())
        }
    };

    metrics::start(state.announcements.clone());

    let addr = format!("{}:{}", config.host, config.port);
    info!("Announcements API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
