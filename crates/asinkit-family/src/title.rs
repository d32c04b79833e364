/// Canonicalizes a title for equality checks: trimmed, whitespace runs
/// collapsed to one space, lower-cased. `None` becomes `""`.
///
/// Only ever used for comparison; display code keeps the original title.
#[must_use]
pub fn normalize_title(title: Option<&str>) -> String {
    title
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
