use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AnnouncementStore, TeacherStore};
use crate::models::{
    announcement::{Announcement, AnnouncementChanges, NewAnnouncement},
    teacher::Teacher,
};

/// Process-local store for tests and `STORE_BACKEND=memory` runs.
#[derive(Default)]
pub struct MemoryStore {
    announcements: RwLock<HashMap<Uuid, Announcement>>,
    teachers: RwLock<HashMap<String, Teacher>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed record, bypassing validation. Used to seed
    /// expired or not-yet-started announcements.
    pub async fn put(&self, announcement: Announcement) {
        self.announcements
            .write()
            .await
            .insert(announcement.id, announcement);
    }
}

#[async_trait::async_trait]
impl AnnouncementStore for MemoryStore {
    async fn list(&self, active_at: Option<DateTime<Utc>>) -> anyhow::Result<Vec<Announcement>> {
        let guard = self.announcements.read().await;
        let mut rows: Vec<Announcement> = guard
            .values()
            .filter(|a| active_at.map_or(true, |now| a.is_active_at(now)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Announcement>> {
        Ok(self.announcements.read().await.get(&id).cloned())
    }

    async fn insert(&self, new: NewAnnouncement) -> anyhow::Result<Announcement> {
        let announcement = Announcement {
            id: Uuid::new_v4(),
            message: new.message,
            expiration_date: new.expiration_date,
            start_date: new.start_date,
            created_at: Utc::now(),
            created_by: new.created_by,
        };
        self.put(announcement.clone()).await;
        Ok(announcement)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: AnnouncementChanges,
    ) -> anyhow::Result<Option<Announcement>> {
        let mut guard = self.announcements.write().await;
        let Some(existing) = guard.get_mut(&id) else {
            return Ok(None);
        };

        // Same guarantee as the announcements_start_before_expiration
        // CHECK constraint in Postgres, evaluated under the write lock.
        let mut updated = existing.clone();
        changes.apply_to(&mut updated);
        if let Some(start) = updated.start_date {
            if start > updated.expiration_date {
                anyhow::bail!("announcements_start_before_expiration violated for {id}");
            }
        }

        *existing = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.announcements.write().await.remove(&id).is_some())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl TeacherStore for MemoryStore {
    async fn find_teacher(&self, username: &str) -> anyhow::Result<Option<Teacher>> {
        Ok(self.teachers.read().await.get(username).cloned())
    }

    async fn upsert_teacher(&self, username: &str, display_name: &str) -> anyhow::Result<Teacher> {
        let mut guard = self.teachers.write().await;
        let teacher = guard
            .entry(username.to_string())
            .and_modify(|t| t.display_name = display_name.to_string())
            .or_insert_with(|| Teacher {
                username: username.to_string(),
                display_name: display_name.to_string(),
                created_at: Utc::now(),
            });
        Ok(teacher.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patch::Patch;
    use chrono::Duration;

    fn new_announcement(message: &str) -> NewAnnouncement {
        NewAnnouncement {
            message: message.into(),
            expiration_date: Utc::now() + Duration::days(7),
            start_date: None,
            created_by: "mchen".into(),
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryStore::new();
        let first = store.insert(new_announcement("first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.insert(new_announcement("second")).await.unwrap();

        let rows = store.list(None).await.unwrap();
        assert_eq!(rows.iter().map(|a| a.id).collect::<Vec<_>>(), vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryStore::new();
        let changes = AnnouncementChanges {
            message: Patch::Set("x".into()),
            ..Default::default()
        };
        assert!(store.update(Uuid::new_v4(), changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_start_after_expiration() {
        let store = MemoryStore::new();
        let mut new = new_announcement("concurrent");
        new.start_date = Some(Utc::now() + Duration::days(3));
        let a = store.insert(new).await.unwrap();

        let changes = AnnouncementChanges {
            expiration_date: Patch::Set(Utc::now() + Duration::days(1)),
            ..Default::default()
        };
        assert!(store.update(a.id, changes).await.is_err());

        let stored = store.get(a.id).await.unwrap().unwrap();
        assert_eq!(stored.expiration_date, a.expiration_date);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let store = MemoryStore::new();
        let a = store.insert(new_announcement("gone soon")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_teacher_keeps_created_at() {
        let store = MemoryStore::new();
        let t1 = store.upsert_teacher("mchen", "Ms. Chen").await.unwrap();
        let t2 = store.upsert_teacher("mchen", "Dr. Chen").await.unwrap();
        assert_eq!(t2.display_name, "Dr. Chen");
        assert_eq!(t1.created_at, t2.created_at);
    }
}
