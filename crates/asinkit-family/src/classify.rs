use crate::title::normalize_title;
use crate::types::Relationship;

/// Assigns a fetched ASIN its place in the family.
///
/// 1. Same ASIN as the parent: [`Relationship::Parent`].
/// 2. Normalized title equals the parent's, or normalized
///    title-excluding-variant equals the parent's: [`Relationship::DefaultChild`].
///    A comparison is skipped when either side is empty.
/// 3. Otherwise [`Relationship::Child`].
///
/// The parent titles are expected pre-normalized.
#[must_use]
pub fn classify(
    candidate_asin: &str,
    candidate_title: Option<&str>,
    candidate_title_excluding_variant: Option<&str>,
    parent_asin: &str,
    parent_title_normalized: &str,
    parent_title_excluding_variant_normalized: &str,
) -> Relationship {
    if candidate_asin == parent_asin {
        return Relationship::Parent;
    }

    let title = normalize_title(candidate_title);
    let title_excluding_variant = normalize_title(candidate_title_excluding_variant);

    if equal_and_present(&title, parent_title_normalized)
        || equal_and_present(&title_excluding_variant, parent_title_excluding_variant_normalized)
    {
        return Relationship::DefaultChild;
    }

    Relationship::Child
}

fn equal_and_present(candidate: &str, parent: &str) -> bool {
    !candidate.is_empty() && !parent.is_empty() && candidate == parent
}
