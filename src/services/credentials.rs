use std::sync::Arc;

use crate::{
    db::TeacherStore,
    error::{AppError, ResultExt},
    models::teacher::Teacher,
};

/// Identity check that gates every mutating announcement operation.
#[async_trait::async_trait]
pub trait CredentialCheck: Send + Sync {
    async fn verify(&self, teacher_username: Option<&str>) -> Result<Teacher, AppError>;
}

/// Accepts any username present in the teacher store. No password, token or
/// session is involved, so this is only an identity lookup.
pub struct TeacherDirectory {
    teachers: Arc<dyn TeacherStore>,
}

impl TeacherDirectory {
    pub fn new(teachers: Arc<dyn TeacherStore>) -> Self {
        Self { teachers }
    }
}

#[async_trait::async_trait]
impl CredentialCheck for TeacherDirectory {
    async fn verify(&self, teacher_username: Option<&str>) -> Result<Teacher, AppError> {
        let username = match teacher_username.map(str::trim).filter(|u| !u.is_empty()) {
            Some(u) => u,
            None => {
                tracing::warn!("Authentication attempt without username");
                return Err(AppError::unauthenticated("Authentication required for this action"));
            }
        };

        let teacher = self
            .teachers
            .find_teacher(username)
            .await
            .or_internal("Failed to verify teacher credentials")?;

        teacher.ok_or_else(|| {
            tracing::warn!("Failed authentication attempt for username: {username}");
            AppError::unauthenticated("Invalid teacher credentials")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    async fn directory() -> TeacherDirectory {
        let store = Arc::new(MemoryStore::new());
        store.upsert_teacher("mrodriguez", "Mr. Rodriguez").await.unwrap();
        TeacherDirectory::new(store)
    }

    #[tokio::test]
    async fn test_known_teacher_is_accepted() {
        let teacher = directory().await.verify(Some("mrodriguez")).await.unwrap();
        assert_eq!(teacher.display_name, "Mr. Rodriguez");
    }

    #[tokio::test]
    async fn test_missing_username_is_rejected() {
        let dir = directory().await;
        for input in [None, Some(""), Some("   ")] {
            let err = dir.verify(input).await.unwrap_err();
            assert_eq!(err.to_string(), "Authentication required for this action");
        }
    }

    #[tokio::test]
    async fn test_unknown_username_is_rejected() {
        let err = directory().await.verify(Some("nobody")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
        assert_eq!(err.to_string(), "Invalid teacher credentials");
    }
}
