use std::collections::HashMap;

use asinkit_core::FetchStatus;
use serde::Serialize;

/// Where a fetched ASIN sits in its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    Parent,
    /// A child whose title matches the parent's; the listing's de facto
    /// default selection.
    DefaultChild,
    Child,
}

impl Relationship {
    /// Label used in the relationship column for members that could not be
    /// fetched.
    pub const UNAVAILABLE_LABEL: &'static str = "UNAVAILABLE";

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "PARENT",
            Self::DefaultChild => "DEFAULT_CHILD",
            Self::Child => "CHILD",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully fetched ASIN of the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyMember {
    pub asin: String,
    pub parent_asin: String,
    pub title: String,
    pub title_excluding_variant: Option<String>,
    pub category: Option<String>,
    pub relationship: Relationship,
    /// Keyed by every attribute name of the family; `""` where this member
    /// has no value.
    pub attribute_values: HashMap<String, String>,
}

impl FamilyMember {
    /// Value for `name`, or `""` when absent.
    #[must_use]
    pub fn attribute(&self, name: &str) -> &str {
        self.attribute_values.get(name).map_or("", String::as_str)
    }
}

/// An ASIN listed in the family that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnavailableMember {
    pub asin: String,
    pub parent_asin: Option<String>,
    pub status: FetchStatus,
    /// The listing's title, or `"Unknown"`.
    pub title: String,
}

/// Placeholder title for unavailable members whose listing had none.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// The outcome of one reconciliation pass.
///
/// Built once by [`crate::FamilyReconciler`] and read-only afterwards; every
/// member carries exactly the attribute names in [`Self::attribute_names`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyResult {
    pub(crate) seed_asin: String,
    pub(crate) parent_asin: String,
    pub(crate) members: Vec<FamilyMember>,
    pub(crate) unavailable: Vec<UnavailableMember>,
    pub(crate) attribute_names: Vec<String>,
    pub(crate) parent_title_normalized: String,
    pub(crate) parent_title_excluding_variant_normalized: String,
}

impl FamilyResult {
    #[must_use]
    pub fn seed_asin(&self) -> &str {
        &self.seed_asin
    }

    /// The family's resolved parent ASIN. Equals the seed when the seed
    /// could not be fetched or reported no parent.
    #[must_use]
    pub fn parent_asin(&self) -> &str {
        &self.parent_asin
    }

    /// Members in insertion order: parent, seed, then variants in listing
    /// order.
    #[must_use]
    pub fn members(&self) -> &[FamilyMember] {
        &self.members
    }

    #[must_use]
    pub fn unavailable(&self) -> &[UnavailableMember] {
        &self.unavailable
    }

    /// Attribute names in order of first sighting.
    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    #[must_use]
    pub fn parent_title_normalized(&self) -> &str {
        &self.parent_title_normalized
    }

    #[must_use]
    pub fn parent_title_excluding_variant_normalized(&self) -> &str {
        &self.parent_title_excluding_variant_normalized
    }

    /// `true` if `asin` appears as a member or as unavailable.
    #[must_use]
    pub fn contains(&self, asin: &str) -> bool {
        self.members.iter().any(|m| m.asin == asin) || self.unavailable.iter().any(|u| u.asin == asin)
    }

    /// Every ASIN of the family, members first.
    pub fn asins(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .map(|m| m.asin.as_str())
            .chain(self.unavailable.iter().map(|u| u.asin.as_str()))
    }

    /// `true` when the seed itself could not be fetched.
    #[must_use]
    pub fn is_total_failure(&self) -> bool {
        self.members.is_empty()
            && self.unavailable.len() == 1
            && self.unavailable[0].asin == self.seed_asin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> FamilyResult {
        FamilyResult {
            seed_asin: "B001".to_owned(),
            parent_asin: "B000".to_owned(),
            members: vec![FamilyMember {
                asin: "B001".to_owned(),
                parent_asin: "B000".to_owned(),
                title: "Widget".to_owned(),
                title_excluding_variant: None,
                category: None,
                relationship: Relationship::DefaultChild,
                attribute_values: HashMap::new(),
            }],
            unavailable: vec![UnavailableMember {
                asin: "B002".to_owned(),
                parent_asin: Some("B000".to_owned()),
                status: FetchStatus::OutOfStock,
                title: UNKNOWN_TITLE.to_owned(),
            }],
            attribute_names: Vec::new(),
            parent_title_normalized: "widget".to_owned(),
            parent_title_excluding_variant_normalized: String::new(),
        }
    }

    #[test]
    fn relationship_labels() {
        assert_eq!(Relationship::Parent.to_string(), "PARENT");
        assert_eq!(Relationship::DefaultChild.as_str(), "DEFAULT_CHILD");
        assert_eq!(
            serde_json::to_value(Relationship::Child).unwrap(),
            serde_json::json!("CHILD")
        );
    }

    #[test]
    fn serializes_with_wire_labels() {
        let value = serde_json::to_value(result()).unwrap();
        assert_eq!(value["members"][0]["relationship"], "DEFAULT_CHILD");
        assert_eq!(value["unavailable"][0]["status"], "out-of-stock");
    }

    #[test]
    fn contains_and_asins_cover_both_lists() {
        let result = result();
        assert!(result.contains("B001"));
        assert!(result.contains("B002"));
        assert!(!result.contains("B000"));
        assert_eq!(result.asins().collect::<Vec<_>>(), ["B001", "B002"]);
        assert!(!result.is_total_failure());
    }
}
