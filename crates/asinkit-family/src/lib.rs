//! Variant-family reconciliation.
//!
//! Given a seed ASIN and a [`asinkit_core::ProductSource`], walks the seed,
//! its parent and its listed variants, and produces a [`FamilyResult`]:
//! who the parent is, which children are default children, which variants
//! could not be fetched, and the union of attribute dimensions across the
//! family. [`projection`] turns a finished result into rows for export.

pub mod classify;
pub mod dimensions;
pub mod projection;
pub mod reconcile;
pub mod title;
pub mod types;

pub use classify::classify;
pub use dimensions::{merge_dimensions, AttributeNames};
pub use projection::{
    attribute_crosstab, flat_table, relationship_counts, relationship_counts_from_table,
    RelationshipCounts,
};
pub use reconcile::FamilyReconciler;
pub use title::normalize_title;
pub use types::{FamilyMember, FamilyResult, Relationship, UnavailableMember, UNKNOWN_TITLE};
