//! Rainforest API response types for `type=product` and `type=store`.
//!
//! ## Observed shape
//!
//! ### `dimensions`
//! Not stable across listings. Variant entries carry a list of
//! `{"name": "Color", "value": "Red"}` pairs; product-level `dimensions`
//! shows up as the same kind of list, as a `{"Color": "Red"}` object, or as
//! a free-text measurement string (`"10 x 4 x 2 inches"`). [`RawDimensions`]
//! accepts all three and `normalize.rs` resolves it once.
//!
//! ### `parent_asin`
//! Absent on standalone listings and on parents themselves; some parents
//! report their own ASIN here.
//!
//! ### `title_excluding_variant_name`
//! The title with the variant suffix (`", Red, Large"`) stripped. Only
//! present on listings that belong to a variation family.
//!
//! ### `buybox_winner`
//! Absent on parents and on listings nobody is currently selling.
//!
//! ### list entries
//! A single odd entry in `variants`, `categories`, `store_results` or a
//! dimension list (`null` flags, a pair with no `name`, a bare string) must
//! not sink the rest. Those lists are decoded entry by entry and entries that
//! do not fit are dropped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Top-level response from `GET /request?type=product`.
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub request_info: Option<RequestInfo>,
    #[serde(default)]
    pub product: Option<RawProduct>,
}

/// Request metadata present on every Rainforest response.
#[derive(Debug, Deserialize)]
pub struct RequestInfo {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A single product as returned under `product`.
#[derive(Debug, Deserialize)]
pub struct RawProduct {
    /// Empty when the payload omits it; the requested ASIN is used instead.
    #[serde(default)]
    pub asin: String,

    #[serde(default)]
    pub parent_asin: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub title_excluding_variant_name: Option<String>,

    /// Breadcrumb rendered as one string, e.g. `"Home > Kitchen > Mugs"`.
    #[serde(default)]
    pub categories_flat: Option<String>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub categories: Vec<RawCategory>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub variants: Vec<RawVariant>,

    #[serde(default)]
    pub dimensions: Option<RawDimensions>,
}

#[derive(Debug, Deserialize)]
pub struct RawCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category_id: Option<String>,
}

/// One entry of `product.variants`.
#[derive(Debug, Deserialize)]
pub struct RawVariant {
    #[serde(default)]
    pub asin: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_current_product: Option<bool>,
    /// Usually a pair list, occasionally an object like product-level
    /// `dimensions`.
    #[serde(default)]
    pub dimensions: Option<RawDimensions>,
}

/// A `{name, value}` pair. `value` is kept loose because numeric values
/// occasionally appear; a pair without a `name` is dropped on resolution.
#[derive(Debug, Deserialize)]
pub struct RawDimension {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Value,
}

/// The shapes `dimensions` arrives in, on products and on variant entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawDimensions {
    List(#[serde(deserialize_with = "lenient_list")] Vec<RawDimension>),
    Map(Map<String, Value>),
    /// Measurement strings and anything else unrecognized.
    Other(Value),
}

/// Top-level response from `GET /request?type=store`.
#[derive(Debug, Deserialize)]
pub struct StoreResponse {
    #[serde(default)]
    pub request_info: Option<RequestInfo>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub store_results: Vec<StoreResult>,
    /// Category tabs of the storefront; expanded one level deep.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
pub struct StoreResult {
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Decodes an array one entry at a time, dropping entries that do not fit
/// `T`. `null` or a non-array value yields an empty list.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(entries) => Ok(keep_decodable(entries)),
        _ => Ok(Vec::new()),
    }
}

/// Like [`lenient_vec`], but a non-array is an error so that an untagged
/// enum moves on to its next shape.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(entries) => Ok(keep_decodable(entries)),
        _ => Err(serde::de::Error::custom("expected a list")),
    }
}

fn keep_decodable<T: DeserializeOwned>(entries: Vec<Value>) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match T::deserialize(entry) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::debug!(error = %err, "dropping malformed list entry");
                None
            }
        })
        .collect()
}
