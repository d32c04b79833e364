//! The reconciliation pass.
//!
//! Fetches are strictly sequential: each one is awaited before the next is
//! issued, and the processed-ASIN set is consulted in between. Order of the
//! resulting members is parent, seed, then the seed's variant listing.

use std::collections::{HashMap, HashSet};

use asinkit_core::{Dimension, FetchFailure, ProductRecord, ProductSource};

use crate::classify::classify;
use crate::dimensions::{backfill, merge_dimensions, AttributeNames};
use crate::title::normalize_title;
use crate::types::{FamilyMember, FamilyResult, UnavailableMember, UNKNOWN_TITLE};

/// Drives one reconciliation pass per call against an injected source.
pub struct FamilyReconciler<'a, S> {
    source: &'a S,
}

impl<'a, S: ProductSource> FamilyReconciler<'a, S> {
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Reconciles the family around `seed_asin`.
    ///
    /// Never fails: an unfetchable seed yields a result holding only that
    /// seed as unavailable, an unfetchable variant is recorded as
    /// unavailable, and an unfetchable parent is dropped.
    pub async fn reconcile(&self, seed_asin: &str) -> FamilyResult {
        let seed_asin = seed_asin.trim();

        let seed = match self.source.fetch(seed_asin).await {
            Ok(record) => record,
            Err(failure) => {
                tracing::warn!(
                    seed = seed_asin,
                    status = %failure.status,
                    detail = %failure.detail,
                    "seed could not be fetched"
                );
                return unavailable_seed(seed_asin, &failure);
            }
        };

        let parent_asin = seed
            .parent_asin
            .clone()
            .unwrap_or_else(|| seed_asin.to_owned());

        let mut pass = Pass::new(seed_asin, &parent_asin);
        for variant in &seed.variants {
            pass.names.extend_from(variant_dimensions(Some(variant)));
        }

        if parent_asin == seed_asin {
            pass.set_parent_titles(&seed);
        } else {
            self.add_parent(&mut pass, &seed).await;
        }

        if !pass.processed.contains(seed_asin) {
            let values = merge_dimensions(
                [
                    seed.dimensions.as_slice(),
                    variant_dimensions(seed.variant(seed_asin)),
                ],
                &mut pass.names,
            );
            pass.push_member(seed_asin, &seed, values);
        }

        for variant in &seed.variants {
            let asin = variant.asin.as_str();
            if asin.is_empty() || pass.processed.contains(asin) {
                continue;
            }

            match self.source.fetch(asin).await {
                Ok(record) => {
                    let values = merge_dimensions(
                        [
                            record.dimensions.as_slice(),
                            variant_dimensions(Some(variant)),
                        ],
                        &mut pass.names,
                    );
                    pass.push_member(asin, &record, values);
                }
                Err(failure) => {
                    tracing::debug!(
                        asin,
                        status = %failure.status,
                        "variant unavailable"
                    );
                    pass.processed.insert(asin.to_owned());
                    pass.unavailable.push(UnavailableMember {
                        asin: asin.to_owned(),
                        parent_asin: Some(parent_asin.clone()),
                        status: failure.status,
                        title: variant
                            .title
                            .clone()
                            .unwrap_or_else(|| UNKNOWN_TITLE.to_owned()),
                    });
                }
            }
        }

        let result = pass.finish();
        tracing::info!(
            seed = result.seed_asin(),
            parent = result.parent_asin(),
            members = result.members().len(),
            unavailable = result.unavailable().len(),
            attributes = result.attribute_names().len(),
            "family reconciled"
        );
        result
    }

    /// Fetches the declared parent and appends it as the first member.
    ///
    /// A failed parent fetch is logged and otherwise dropped: it is not
    /// recorded as unavailable, and it is not fetched again in this pass.
    async fn add_parent(&self, pass: &mut Pass, seed: &ProductRecord) {
        let parent_asin = pass.parent_asin.clone();
        match self.source.fetch(&parent_asin).await {
            Ok(parent) => {
                pass.set_parent_titles(&parent);
                let values = merge_dimensions(
                    [
                        variant_dimensions(seed.variant(&parent_asin)),
                        variant_dimensions(parent.variant(&parent_asin)),
                    ],
                    &mut pass.names,
                );
                pass.push_member(&parent_asin, &parent, values);
            }
            Err(failure) => {
                tracing::warn!(
                    parent = %parent_asin,
                    seed = %pass.seed_asin,
                    status = %failure.status,
                    "parent could not be fetched; continuing without it"
                );
                pass.processed.insert(parent_asin);
            }
        }
    }
}

/// The single-entry result for a seed that could not be fetched.
fn unavailable_seed(seed_asin: &str, failure: &FetchFailure) -> FamilyResult {
    FamilyResult {
        seed_asin: seed_asin.to_owned(),
        parent_asin: seed_asin.to_owned(),
        members: Vec::new(),
        unavailable: vec![UnavailableMember {
            asin: seed_asin.to_owned(),
            parent_asin: None,
            status: failure.status,
            title: UNKNOWN_TITLE.to_owned(),
        }],
        attribute_names: Vec::new(),
        parent_title_normalized: String::new(),
        parent_title_excluding_variant_normalized: String::new(),
    }
}

fn variant_dimensions(variant: Option<&asinkit_core::VariantRef>) -> &[Dimension] {
    variant
        .and_then(|v| v.dimensions.as_deref())
        .unwrap_or_default()
}

/// State of a pass in progress. Dropped into a [`FamilyResult`] by
/// [`Pass::finish`].
struct Pass {
    seed_asin: String,
    parent_asin: String,
    members: Vec<FamilyMember>,
    unavailable: Vec<UnavailableMember>,
    names: AttributeNames,
    processed: HashSet<String>,
    parent_title_normalized: String,
    parent_title_excluding_variant_normalized: String,
}

impl Pass {
    fn new(seed_asin: &str, parent_asin: &str) -> Self {
        Self {
            seed_asin: seed_asin.to_owned(),
            parent_asin: parent_asin.to_owned(),
            members: Vec::new(),
            unavailable: Vec::new(),
            names: AttributeNames::new(),
            processed: HashSet::new(),
            parent_title_normalized: String::new(),
            parent_title_excluding_variant_normalized: String::new(),
        }
    }

    fn set_parent_titles(&mut self, parent: &ProductRecord) {
        self.parent_title_normalized = normalize_title(Some(&parent.title));
        self.parent_title_excluding_variant_normalized =
            normalize_title(parent.title_excluding_variant.as_deref());
    }

    /// Classifies and appends a member for `asin`, marking it processed.
    fn push_member(
        &mut self,
        asin: &str,
        record: &ProductRecord,
        attribute_values: HashMap<String, String>,
    ) {
        let relationship = classify(
            asin,
            Some(&record.title),
            record.title_excluding_variant.as_deref(),
            &self.parent_asin,
            &self.parent_title_normalized,
            &self.parent_title_excluding_variant_normalized,
        );

        self.processed.insert(asin.to_owned());
        self.members.push(FamilyMember {
            asin: asin.to_owned(),
            parent_asin: record
                .parent_asin
                .clone()
                .unwrap_or_else(|| self.parent_asin.clone()),
            title: record.title.clone(),
            title_excluding_variant: record.title_excluding_variant.clone(),
            category: record.category.clone(),
            relationship,
            attribute_values,
        });
    }

    /// Finalizes the attribute-name set and backfills every member with it.
    fn finish(self) -> FamilyResult {
        let attribute_names = self.names.into_vec();
        let mut members = self.members;
        for member in &mut members {
            backfill(&mut member.attribute_values, &attribute_names);
        }

        FamilyResult {
            seed_asin: self.seed_asin,
            parent_asin: self.parent_asin,
            members,
            unavailable: self.unavailable,
            attribute_names,
            parent_title_normalized: self.parent_title_normalized,
            parent_title_excluding_variant_normalized: self
                .parent_title_excluding_variant_normalized,
        }
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
