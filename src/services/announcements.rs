use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::AnnouncementStore,
    error::{AppError, ResultExt},
    models::{
        announcement::{
            Announcement, AnnouncementChanges, CreateAnnouncementRequest, NewAnnouncement,
            UpdateAnnouncementRequest, MAX_MESSAGE_LENGTH,
        },
        patch::Patch,
        teacher::Teacher,
    },
    services::dates::parse_calendar_date,
};

pub struct AnnouncementService;

impl AnnouncementService {
    pub async fn list(
        store: &dyn AnnouncementStore,
        active_only: bool,
    ) -> Result<Vec<Announcement>, AppError> {
        let active_at = active_only.then(Utc::now);
        store
            .list(active_at)
            .await
            .or_internal("Failed to list announcements")
    }

    pub async fn get(store: &dyn AnnouncementStore, id: &str) -> Result<Announcement, AppError> {
        let id = parse_id(id)?;
        store
            .get(id)
            .await
            .or_internal("Failed to fetch announcement")?
            .ok_or_else(AppError::not_found)
    }

    pub async fn create(
        store: &dyn AnnouncementStore,
        teacher: &Teacher,
        req: CreateAnnouncementRequest,
    ) -> Result<Announcement, AppError> {
        let message = validate_message(req.message.as_deref().unwrap_or_default())?;

        let expiration_date = req
            .expiration_date
            .as_deref()
            .ok_or_else(|| AppError::invalid_input("Expiration date is required"))
            .and_then(|raw| parse_calendar_date(raw, "expiration date"))?;
        ensure_future(expiration_date, Utc::now())?;

        let start_date = match req.start_date.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_calendar_date(raw, "start date")?),
            None => None,
        };
        ensure_ordered(start_date, expiration_date)?;

        let announcement = store
            .insert(NewAnnouncement {
                message,
                expiration_date,
                start_date,
                created_by: teacher.username.clone(),
            })
            .await
            .or_internal("Failed to create announcement")?;

        tracing::info!(
            "Announcement created by {}: {}",
            teacher.username,
            announcement.id
        );
        Ok(announcement)
    }

    pub async fn update(
        store: &dyn AnnouncementStore,
        teacher: &Teacher,
        id: &str,
        req: UpdateAnnouncementRequest,
    ) -> Result<Announcement, AppError> {
        let id = parse_id(id)?;
        let existing = store
            .get(id)
            .await
            .or_internal("Failed to update announcement")?
            .ok_or_else(AppError::not_found)?;

        let changes = validate_changes(&existing, req, Utc::now())?;
        if changes.is_empty() {
            return Ok(existing);
        }

        let updated = store
            .update(id, changes)
            .await
            .or_internal("Failed to update announcement")?
            .ok_or_else(AppError::not_found)?;

        tracing::info!("Announcement updated by {}: {}", teacher.username, id);
        Ok(updated)
    }

    pub async fn delete(
        store: &dyn AnnouncementStore,
        teacher: &Teacher,
        id: &str,
    ) -> Result<(), AppError> {
        let id = parse_id(id)?;
        let removed = store
            .delete(id)
            .await
            .or_internal("Failed to delete announcement")?;
        if !removed {
            return Err(AppError::not_found());
        }

        tracing::info!("Announcement deleted by {}: {}", teacher.username, id);
        Ok(())
    }
}

/// Malformed ids can never match a record, so they are reported as not found.
fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::not_found())
}

/// Returns the trimmed message.
pub fn validate_message(message: &str) -> Result<String, AppError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("Message cannot be empty"));
    }
    // Invalid UTF-8 in the query string decodes to U+FFFD.
    if trimmed.contains(char::REPLACEMENT_CHARACTER) {
        return Err(AppError::invalid_input("Message contains invalid characters"));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Message too long (max {MAX_MESSAGE_LENGTH} characters)"
        )));
    }
    Ok(trimmed.to_string())
}

fn ensure_future(expiration_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppError> {
    if expiration_date <= now {
        return Err(AppError::invalid_input("Expiration date must be in the future"));
    }
    Ok(())
}

fn ensure_ordered(
    start_date: Option<DateTime<Utc>>,
    expiration_date: DateTime<Utc>,
) -> Result<(), AppError> {
    match start_date {
        Some(start) if start > expiration_date => Err(AppError::invalid_input(
            "Start date must be before expiration date",
        )),
        _ => Ok(()),
    }
}

/// Validate an update against the stored record and turn it into store changes.
fn validate_changes(
    existing: &Announcement,
    req: UpdateAnnouncementRequest,
    now: DateTime<Utc>,
) -> Result<AnnouncementChanges, AppError> {
    let (message, expiration_date, start_date) = req.into_patches();

    let message = message.try_map(|m| validate_message(&m))?;
    let expiration_date =
        expiration_date.try_map(|raw| parse_calendar_date(&raw, "expiration date"))?;
    let start_date = start_date.try_map(|raw| parse_calendar_date(&raw, "start date"))?;

    if let Patch::Set(expiration) = expiration_date {
        ensure_future(expiration, now)?;
    }

    // Checked whenever either side of the window moves, so the stored
    // start date cannot end up after a shortened expiration.
    if !(expiration_date.is_unset() && start_date.is_unset()) {
        let effective_expiration = expiration_date
            .as_set()
            .copied()
            .unwrap_or(existing.expiration_date);
        let effective_start = start_date.clone().apply(existing.start_date);
        ensure_ordered(effective_start, effective_expiration)?;
    }

    Ok(AnnouncementChanges {
        message,
        expiration_date,
        start_date,
    })
}
