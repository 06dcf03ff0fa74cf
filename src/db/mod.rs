pub mod memory;
pub mod postgres;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    announcement::{Announcement, AnnouncementChanges, NewAnnouncement},
    teacher::Teacher,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run the migrations embedded from ./migrations/
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Persistence for announcement records.
#[async_trait::async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// Newest first. With `active_at`, only records whose window contains it.
    async fn list(&self, active_at: Option<DateTime<Utc>>) -> anyhow::Result<Vec<Announcement>>;

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Announcement>>;

    async fn insert(&self, new: NewAnnouncement) -> anyhow::Result<Announcement>;

    /// `None` when no record has this id.
    async fn update(
        &self,
        id: Uuid,
        changes: AnnouncementChanges,
    ) -> anyhow::Result<Option<Announcement>>;

    /// `true` if a record was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn ping(&self) -> anyhow::Result<()>;
}

/// Read/write access to the teacher records used for credential checks.
#[async_trait::async_trait]
pub trait TeacherStore: Send + Sync {
    async fn find_teacher(&self, username: &str) -> anyhow::Result<Option<Teacher>>;

    async fn upsert_teacher(&self, username: &str, display_name: &str) -> anyhow::Result<Teacher>;
}
