use std::sync::Mutex;

use asinkit_core::{FetchStatus, VariantRef};

use super::*;
use crate::types::Relationship;

/// In-memory source: canned outcomes per ASIN plus a log of every call.
#[derive(Default)]
struct FakeSource {
    outcomes: HashMap<String, Result<ProductRecord, FetchFailure>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    fn with(mut self, record: ProductRecord) -> Self {
        self.outcomes.insert(record.asin.clone(), Ok(record));
        self
    }

    fn failing(mut self, asin: &str, status: FetchStatus) -> Self {
        self.outcomes.insert(
            asin.to_owned(),
            Err(FetchFailure::new(asin, status, "canned failure")),
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProductSource for FakeSource {
    async fn fetch(&self, asin: &str) -> Result<ProductRecord, FetchFailure> {
        self.calls.lock().unwrap().push(asin.to_owned());
        self.outcomes.get(asin).cloned().unwrap_or_else(|| {
            Err(FetchFailure::new(asin, FetchStatus::ApiError, "not canned"))
        })
    }
}

fn record(asin: &str, parent: Option<&str>, title: &str) -> ProductRecord {
    ProductRecord {
        asin: asin.to_owned(),
        parent_asin: parent.map(str::to_owned),
        title: title.to_owned(),
        ..ProductRecord::default()
    }
}

fn variant(asin: &str, pairs: &[(&str, &str)]) -> VariantRef {
    VariantRef {
        asin: asin.to_owned(),
        dimensions: if pairs.is_empty() {
            None
        } else {
            Some(pairs.iter().map(|(n, v)| Dimension::new(*n, *v)).collect())
        },
        ..VariantRef::default()
    }
}

fn member<'r>(result: &'r FamilyResult, asin: &str) -> &'r FamilyMember {
    result
        .members()
        .iter()
        .find(|m| m.asin == asin)
        .unwrap_or_else(|| panic!("member {asin} missing from {result:?}"))
}

// ---------------------------------------------------------------------------
// exits and ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn self_parented_seed_is_single_parent_member() {
    let source = FakeSource::default().with(record("B001", Some("B001"), "Widget"));

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(result.members().len(), 1);
    assert_eq!(result.members()[0].asin, "B001");
    assert_eq!(result.members()[0].relationship, Relationship::Parent);
    assert!(result.unavailable().is_empty());
    assert!(result.attribute_names().is_empty());
    assert_eq!(source.calls(), vec!["B001"]);
}

#[tokio::test]
async fn seed_without_parent_field_is_its_own_parent() {
    let source = FakeSource::default().with(record("B001", None, "Widget"));

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(result.parent_asin(), "B001");
    assert_eq!(result.members()[0].relationship, Relationship::Parent);
    assert_eq!(result.members()[0].parent_asin, "B001");
    assert_eq!(result.parent_title_normalized(), "widget");
}

#[tokio::test]
async fn unfetchable_seed_is_the_only_entry() {
    let source = FakeSource::default().failing("B001", FetchStatus::OutOfStock);

    let result = FamilyReconciler::new(&source).reconcile(" B001 ").await;

    assert!(result.is_total_failure());
    assert!(result.members().is_empty());
    assert_eq!(result.unavailable().len(), 1);
    let entry = &result.unavailable()[0];
    assert_eq!(entry.asin, "B001");
    assert_eq!(entry.status, FetchStatus::OutOfStock);
    assert!(entry.parent_asin.is_none());
    assert_eq!(entry.title, UNKNOWN_TITLE);
    assert_eq!(source.calls(), vec!["B001"]);
}

#[tokio::test]
async fn failed_variant_is_recorded_unavailable() {
    let mut seed = record("B001", Some("B000"), "Widget");
    seed.variants = vec![variant("B002", &[])];
    let source = FakeSource::default()
        .with(seed)
        .with(record("B000", None, "Widget"))
        .failing("B002", FetchStatus::NoBuybox);

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    let asins: Vec<&str> = result.members().iter().map(|m| m.asin.as_str()).collect();
    assert_eq!(asins, vec!["B000", "B001"]);
    assert_eq!(result.members()[0].relationship, Relationship::Parent);
    assert_eq!(result.members()[1].relationship, Relationship::DefaultChild);

    assert_eq!(result.unavailable().len(), 1);
    let gone = &result.unavailable()[0];
    assert_eq!(gone.asin, "B002");
    assert_eq!(gone.status, FetchStatus::NoBuybox);
    assert_eq!(gone.parent_asin.as_deref(), Some("B000"));
    assert_eq!(gone.title, UNKNOWN_TITLE);
}

#[tokio::test]
async fn failing_variant_listed_twice_is_fetched_and_recorded_once() {
    let mut seed = record("B001", Some("B000"), "Widget");
    seed.variants = vec![variant("B002", &[]), variant("B002", &[])];
    let mut parent = record("B000", None, "Widget");
    parent.variants = vec![variant("B002", &[])];
    let source = FakeSource::default()
        .with(seed)
        .with(parent)
        .failing("B002", FetchStatus::OutOfStock);

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(source.calls(), vec!["B001", "B000", "B002"]);
    assert_eq!(result.unavailable().len(), 1);
    assert_eq!(result.unavailable()[0].asin, "B002");
    assert_eq!(result.unavailable()[0].status, FetchStatus::OutOfStock);
    assert!(result.members().iter().all(|m| m.asin != "B002"));
}

#[tokio::test]
async fn unavailable_member_keeps_listing_title() {
    let mut seed = record("B001", None, "Widget");
    let mut listed = variant("B002", &[]);
    listed.title = Some("Widget, Teal".to_owned());
    seed.variants = vec![listed];
    let source = FakeSource::default()
        .with(seed)
        .failing("B002", FetchStatus::Unknown);

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(result.unavailable()[0].title, "Widget, Teal");
}

#[tokio::test]
async fn failed_parent_is_dropped_and_not_refetched() {
    let mut seed = record("B001", Some("B000"), "Widget, Red");
    seed.variants = vec![variant("B000", &[]), variant("B002", &[])];
    let source = FakeSource::default()
        .with(seed)
        .failing("B000", FetchStatus::ApiError)
        .with(record("B002", Some("B000"), "Widget, Blue"));

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    let asins: Vec<&str> = result.members().iter().map(|m| m.asin.as_str()).collect();
    assert_eq!(asins, vec!["B001", "B002"]);
    assert!(result.unavailable().is_empty(), "parent failure must not be recorded");
    assert!(result
        .members()
        .iter()
        .all(|m| m.relationship == Relationship::Child));
    assert_eq!(source.calls(), vec!["B001", "B000", "B002"]);
}

#[tokio::test]
async fn members_follow_parent_seed_listing_order_and_skip_processed() {
    let mut seed = record("B002", Some("B000"), "Widget, Blue");
    seed.variants = vec![
        variant("B003", &[]),
        variant("B002", &[]),
        variant("B000", &[]),
        variant("B001", &[]),
        variant("B003", &[]),
    ];
    let source = FakeSource::default()
        .with(seed)
        .with(record("B000", None, "Widget"))
        .with(record("B001", Some("B000"), "Widget, Red"))
        .with(record("B003", Some("B000"), "Widget, Green"));

    let result = FamilyReconciler::new(&source).reconcile("B002").await;

    let asins: Vec<&str> = result.members().iter().map(|m| m.asin.as_str()).collect();
    assert_eq!(asins, vec!["B000", "B002", "B003", "B001"]);
    assert_eq!(source.calls(), vec!["B002", "B000", "B003", "B001"]);
}

// ---------------------------------------------------------------------------
// classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn default_child_by_title_excluding_variant() {
    let mut seed = record("B001", Some("B000"), "Widget, Red");
    seed.title_excluding_variant = Some("Widget".to_owned());
    let mut parent = record("B000", None, "Widget Family");
    parent.title_excluding_variant = Some("  widget ".to_owned());
    let source = FakeSource::default().with(seed).with(parent);

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(member(&result, "B001").relationship, Relationship::DefaultChild);
    assert_eq!(result.parent_title_excluding_variant_normalized(), "widget");
}

#[tokio::test]
async fn differing_title_is_plain_child() {
    let mut seed = record("B001", Some("B000"), "Widget");
    seed.variants = vec![variant("B002", &[])];
    let source = FakeSource::default()
        .with(seed)
        .with(record("B000", None, "Widget"))
        .with(record("B002", Some("B000"), "Widget, Blue"));

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(member(&result, "B002").relationship, Relationship::Child);
}

// ---------------------------------------------------------------------------
// dimensions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sibling_listing_overwrites_fetched_dimensions() {
    let mut seed = record("B001", None, "Widget");
    seed.variants = vec![variant("B002", &[("Color", "Blue")])];
    let mut fetched = record("B002", Some("B001"), "Widget, Blue");
    fetched.dimensions = vec![Dimension::new("Color", "Red")];
    let source = FakeSource::default().with(seed).with(fetched);

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(member(&result, "B002").attribute("Color"), "Blue");
}

#[tokio::test]
async fn late_attribute_is_backfilled_on_earlier_members() {
    let mut seed = record("B001", None, "Widget");
    seed.variants = vec![variant("B002", &[]), variant("B003", &[])];
    let mut first = record("B002", Some("B001"), "Widget, Red");
    first.dimensions = vec![Dimension::new("Color", "Red")];
    let mut second = record("B003", Some("B001"), "Widget, Red, L");
    second.dimensions = vec![Dimension::new("Color", "Red"), Dimension::new("Size", "L")];
    let source = FakeSource::default().with(seed).with(first).with(second);

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(result.attribute_names(), ["Color", "Size"]);
    let early = member(&result, "B002");
    assert_eq!(early.attribute_values.get("Size").map(String::as_str), Some(""));
    let seed_member = member(&result, "B001");
    assert_eq!(seed_member.attribute("Color"), "");
    assert_eq!(seed_member.attribute_values.len(), 2);
}

#[tokio::test]
async fn parent_dimensions_come_from_variant_listings() {
    let mut seed = record("B001", Some("B000"), "Widget, Red");
    seed.variants = vec![
        variant("B000", &[("Color", "Any"), ("Size", "M")]),
        variant("B001", &[("Color", "Red")]),
    ];
    let mut parent = record("B000", None, "Widget");
    parent.dimensions = vec![Dimension::new("Material", "Steel")];
    parent.variants = vec![variant("B000", &[("Color", "All")])];
    let source = FakeSource::default().with(seed).with(parent);

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    let parent_member = member(&result, "B000");
    assert_eq!(parent_member.attribute("Color"), "All");
    assert_eq!(parent_member.attribute("Size"), "M");
    assert!(
        !result.attribute_names().iter().any(|n| n == "Material"),
        "parent's own dimensions are not part of its merge"
    );
    assert_eq!(member(&result, "B001").attribute("Color"), "Red");
}

#[tokio::test]
async fn seed_listing_names_come_first() {
    let mut seed = record("B001", None, "Widget");
    seed.dimensions = vec![Dimension::new("Style", "Classic")];
    seed.variants = vec![variant("B001", &[("Color", "Red")]), variant("B002", &[("Size", "S")])];
    let source = FakeSource::default()
        .with(seed)
        .failing("B002", FetchStatus::NoBuybox);

    let result = FamilyReconciler::new(&source).reconcile("B001").await;

    assert_eq!(result.attribute_names(), ["Color", "Size", "Style"]);
    let seed_member = member(&result, "B001");
    assert_eq!(seed_member.attribute("Style"), "Classic");
    assert_eq!(seed_member.attribute("Color"), "Red");
    assert_eq!(seed_member.attribute("Size"), "");
}
