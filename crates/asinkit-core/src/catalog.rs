//! Product records as the reconciler consumes them.
//!
//! These are the post-ingestion shapes: the API crate resolves every
//! response quirk (list-vs-object `dimensions`, empty strings, missing
//! parents) before building a [`ProductRecord`], so nothing downstream has
//! to inspect raw JSON again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named attribute value such as `Color: Red`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One entry in a product's variant listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRef {
    pub asin: String,
    /// `None` when the listing carried no dimensions at all.
    pub dimensions: Option<Vec<Dimension>>,
    /// Marks the variant the fetch was made for.
    pub is_current_product: bool,
    pub title: Option<String>,
}

/// A single fetched product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub asin: String,
    /// `None` when the API did not report a parent; the product is then its
    /// own parent.
    pub parent_asin: Option<String>,
    pub title: String,
    pub title_excluding_variant: Option<String>,
    pub category: Option<String>,
    /// Present only on parent-capable fetches; empty otherwise.
    pub variants: Vec<VariantRef>,
    /// The product's own dimensions in source order.
    pub dimensions: Vec<Dimension>,
}

impl ProductRecord {
    /// Finds the variant-listing entry for `asin`, if this record lists it.
    #[must_use]
    pub fn variant(&self, asin: &str) -> Option<&VariantRef> {
        self.variants.iter().find(|v| v.asin == asin)
    }
}

/// Reason code attached to a product that could not be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStatus {
    /// No usable response at all.
    ApiError,
    /// A response arrived but carried no buy-box winner.
    NoBuybox,
    OutOfStock,
    Unknown,
}

impl FetchStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiError => "api-error",
            Self::NoBuybox => "no-buybox",
            Self::OutOfStock => "out-of-stock",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a fetch that did not yield a [`ProductRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not fetch {asin} ({status}): {detail}")]
pub struct FetchFailure {
    pub asin: String,
    pub status: FetchStatus,
    pub detail: String,
}

impl FetchFailure {
    #[must_use]
    pub fn new(asin: impl Into<String>, status: FetchStatus, detail: impl Into<String>) -> Self {
        Self {
            asin: asin.into(),
            status,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_lookup_by_asin() {
        let record = ProductRecord {
            asin: "B001".to_owned(),
            variants: vec![
                VariantRef {
                    asin: "B002".to_owned(),
                    ..VariantRef::default()
                },
                VariantRef {
                    asin: "B003".to_owned(),
                    title: Some("Blue".to_owned()),
                    ..VariantRef::default()
                },
            ],
            ..ProductRecord::default()
        };
        assert_eq!(
            record.variant("B003").and_then(|v| v.title.as_deref()),
            Some("Blue")
        );
        assert!(record.variant("B999").is_none());
    }

    #[test]
    fn fetch_status_serializes_as_reason_code() {
        let json = serde_json::to_string(&FetchStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"out-of-stock\"");
        assert_eq!(FetchStatus::NoBuybox.to_string(), "no-buybox");
        assert_eq!(FetchStatus::ApiError.as_str(), "api-error");
    }

    #[test]
    fn fetch_failure_message_includes_status() {
        let failure = FetchFailure::new("B002", FetchStatus::NoBuybox, "response had no product");
        assert_eq!(
            failure.to_string(),
            "could not fetch B002 (no-buybox): response had no product"
        );
    }
}
