//! Attribute-dimension collection for one family.
//!
//! Names are accumulated into an [`AttributeNames`] owned by the pass that
//! is building the family. Member maps are only backfilled with empty values
//! once every fetch is done, so a name first seen on the last variant still
//! reaches the first member.

use std::collections::{HashMap, HashSet};

use asinkit_core::Dimension;

/// Insertion-ordered, deduplicated set of attribute names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeNames {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl AttributeNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name`. Returns `true` if it was not seen before.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_owned());
        self.order.push(name.to_owned());
        true
    }

    /// Records every name in `dimensions`.
    pub fn extend_from(&mut self, dimensions: &[Dimension]) {
        for dimension in dimensions {
            self.insert(&dimension.name);
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Flattens several dimension sources into one `name -> value` map.
///
/// Sources are applied in order, so a later source overwrites an earlier one
/// for the same name. Every name encountered is recorded in `names`.
pub fn merge_dimensions<'a, I>(sources: I, names: &mut AttributeNames) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a [Dimension]>,
{
    let mut values = HashMap::new();
    for source in sources {
        for dimension in source {
            names.insert(&dimension.name);
            values.insert(dimension.name.clone(), dimension.value.clone());
        }
    }
    values
}

/// Adds an empty value for every name in `names` that `values` lacks.
pub(crate) fn backfill(values: &mut HashMap<String, String>, names: &[String]) {
    for name in names {
        values.entry(name.clone()).or_default();
    }
}
