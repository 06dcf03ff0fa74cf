pub mod announcements;
pub mod credentials;
pub mod dates;
pub mod metrics;
