use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{AnnouncementStore, TeacherStore};
use crate::models::{
    announcement::{Announcement, AnnouncementChanges, NewAnnouncement},
    patch::Patch,
    teacher::Teacher,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AnnouncementStore for PgStore {
    async fn list(&self, active_at: Option<DateTime<Utc>>) -> anyhow::Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, Announcement>(
            "SELECT * FROM announcements
             WHERE $1::TIMESTAMPTZ IS NULL
                OR (expiration_date >= $1 AND (start_date IS NULL OR start_date <= $1))
             ORDER BY created_at DESC",
        )
        .bind(active_at)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, Announcement>("SELECT * FROM announcements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, new: NewAnnouncement) -> anyhow::Result<Announcement> {
        let row = sqlx::query_as::<_, Announcement>(
            "INSERT INTO announcements (id, message, expiration_date, start_date, created_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.message)
        .bind(new.expiration_date)
        .bind(new.start_date)
        .bind(Utc::now())
        .bind(&new.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: AnnouncementChanges,
    ) -> anyhow::Result<Option<Announcement>> {
        let clear_start = matches!(changes.start_date, Patch::Clear);
        let row = sqlx::query_as::<_, Announcement>(
            "UPDATE announcements
             SET message = COALESCE($1, message),
                 expiration_date = COALESCE($2, expiration_date),
                 start_date = CASE WHEN $3 THEN NULL ELSE COALESCE($4, start_date) END
             WHERE id = $5
             RETURNING *",
        )
        .bind(changes.message.as_set())
        .bind(changes.expiration_date.as_set())
        .bind(clear_start)
        .bind(changes.start_date.as_set())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TeacherStore for PgStore {
    async fn find_teacher(&self, username: &str) -> anyhow::Result<Option<Teacher>> {
        let row = sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn upsert_teacher(&self, username: &str, display_name: &str) -> anyhow::Result<Teacher> {
        let row = sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (username, display_name)
             VALUES ($1, $2)
             ON CONFLICT (username) DO UPDATE SET display_name = EXCLUDED.display_name
             RETURNING *",
        )
        .bind(username)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
