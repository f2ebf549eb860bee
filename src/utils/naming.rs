use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of the random suffix appended to every base name
pub const RANDOM_ID_LEN: usize = 10;

/// Replaces whitespace and path separators so the label is safe inside a
/// file name and an object key.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

pub fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_ID_LEN)
        .map(char::from)
        .collect()
}

/// `{label}_{unix seconds}_{random id}`
pub fn base_name(label: &str, started_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        normalize_label(label),
        started_at.timestamp(),
        random_id()
    )
}

/// `{year}/{month}/{file_name}`, month 1-indexed without padding
pub fn object_key(started_at: DateTime<Utc>, file_name: &str) -> String {
    format!("{}/{}/{}", started_at.year(), started_at.month(), file_name)
}
