use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::patch::Patch;

pub const MAX_MESSAGE_LENGTH: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Announcement {
    pub id: Uuid,
    pub message: String,
    pub expiration_date: DateTime<Utc>,
    /// Absent means active as soon as it is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Username of the teacher who created it.
    pub created_by: String,
}

impl Announcement {
    /// Active window: started (or no start date) and not yet expired.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let started = match self.start_date {
            Some(start) => start <= now,
            None => true,
        };
        started && self.expiration_date >= now
    }
}

/// Validated fields for a new record; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub message: String,
    pub expiration_date: DateTime<Utc>,
    pub start_date: Option<DateTime<Utc>>,
    pub created_by: String,
}

/// Validated partial update handed to the store.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementChanges {
    pub message: Patch<String>,
    pub expiration_date: Patch<DateTime<Utc>>,
    pub start_date: Patch<DateTime<Utc>>,
}

impl AnnouncementChanges {
    pub fn is_empty(&self) -> bool {
        self.message.is_unset() && self.expiration_date.is_unset() && self.start_date.is_unset()
    }

    pub fn apply_to(self, announcement: &mut Announcement) {
        if let Some(message) = Patch::apply(self.message, None) {
            announcement.message = message;
        }
        if let Some(expiration) = Patch::apply(self.expiration_date, None) {
            announcement.expiration_date = expiration;
        }
        announcement.start_date = self.start_date.apply(announcement.start_date);
    }
}

fn default_active_only() -> bool {
    true
}

/// Query-string boolean: `true/false`, `1/0`, `yes/no`, `on/off`, `t/f`, `y/n`, any case.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err(de::Error::custom(format!("invalid boolean value: {raw:?}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListAnnouncementsQuery {
    #[serde(default = "default_active_only", deserialize_with = "deserialize_flag")]
    pub active_only: bool,
}

/// Raw query fields for `POST /announcements`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub message: Option<String>,
    /// YYYY-MM-DD
    pub expiration_date: Option<String>,
    pub start_date: Option<String>,
}

/// Raw query fields for `PUT /announcements/{id}`. An empty `start_date` removes it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAnnouncementRequest {
    pub message: Option<String>,
    pub expiration_date: Option<String>,
    pub start_date: Option<String>,
}

impl UpdateAnnouncementRequest {
    pub fn into_patches(self) -> (Patch<String>, Patch<String>, Patch<String>) {
        (
            Patch::from_option(self.message),
            Patch::from_option(self.expiration_date),
            Patch::from_clearable_param(self.start_date),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(start: Option<DateTime<Utc>>, expiration: DateTime<Utc>) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            message: "Bring your calculators".into(),
            expiration_date: expiration,
            start_date: start,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            created_by: "mrodriguez".into(),
        }
    }

    #[test]
    fn test_active_without_start_date() {
        let now = Utc::now();
        assert!(sample(None, now + Duration::days(1)).is_active_at(now));
        assert!(!sample(None, now - Duration::seconds(1)).is_active_at(now));
    }

    #[test]
    fn test_active_with_start_date() {
        let now = Utc::now();
        let exp = now + Duration::days(3);
        assert!(sample(Some(now - Duration::days(1)), exp).is_active_at(now));
        assert!(sample(Some(now), exp).is_active_at(now));
        assert!(!sample(Some(now + Duration::days(1)), exp).is_active_at(now));
    }

    #[test]
    fn test_expiration_boundary_is_inclusive() {
        let now = Utc::now();
        assert!(sample(None, now).is_active_at(now));
    }

    #[test]
    fn test_missing_start_date_not_serialized() {
        let a = sample(None, Utc.with_ymd_and_hms(2099, 1, 1, 23, 59, 59).unwrap());
        let v = serde_json::to_value(&a).unwrap();
        assert!(v.get("start_date").is_none());
        assert_eq!(v["id"], serde_json::Value::String(a.id.to_string()));
        assert_eq!(v["expiration_date"], "2099-01-01T23:59:59Z");
    }

    #[test]
    fn test_changes_apply_to() {
        let now = Utc::now();
        let mut a = sample(Some(now), now + Duration::days(2));
        let new_exp = now + Duration::days(5);
        AnnouncementChanges {
            message: Patch::Set("Updated".into()),
            expiration_date: Patch::Set(new_exp),
            start_date: Patch::Clear,
        }
        .apply_to(&mut a);
        assert_eq!(a.message, "Updated");
        assert_eq!(a.expiration_date, new_exp);
        assert_eq!(a.start_date, None);
    }

    fn list_query(qs: &str) -> Result<ListAnnouncementsQuery, serde::de::value::Error> {
        serde::Deserialize::deserialize(serde::de::value::MapDeserializer::new(
            qs.split('&')
                .filter(|kv| !kv.is_empty())
                .filter_map(|kv| kv.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string())),
        ))
    }

    #[test]
    fn test_active_only_spellings() {
        for raw in ["true", "True", "1", "yes", "ON"] {
            assert!(list_query(&format!("active_only={raw}")).unwrap().active_only, "{raw}");
        }
        for raw in ["false", "False", "0", "no", "off"] {
            assert!(!list_query(&format!("active_only={raw}")).unwrap().active_only, "{raw}");
        }
        assert!(list_query("").unwrap().active_only);
        assert!(list_query("active_only=maybe").is_err());
    }

    #[test]
    fn test_update_request_patches() {
        let req = UpdateAnnouncementRequest {
            message: None,
            expiration_date: Some("2099-02-01".into()),
            start_date: Some(String::new()),
        };
        let (message, expiration, start) = req.into_patches();
        assert_eq!(message, Patch::Unset);
        assert_eq!(expiration, Patch::Set("2099-02-01".to_string()));
        assert_eq!(start, Patch::Clear);
    }
}
