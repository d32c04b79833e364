use chrono::{DateTime, SecondsFormat, Utc};

/// Builds `"<prefix>_<id>_<timestamp>.<ext>"`.
///
/// The timestamp is RFC 3339 in UTC with millisecond precision, with `:` and
/// `.` replaced by `-` so the name is valid on every filesystem, e.g.
/// `family_B001_2026-10-17T08-30-00-000Z.csv`.
#[must_use]
pub fn output_file_name(prefix: &str, id: &str, timestamp: DateTime<Utc>, ext: &str) -> String {
    let stamp = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let id = id.trim().replace(['/', '\\'], "-");
    format!("{prefix}_{id}_{stamp}.{ext}")
}
