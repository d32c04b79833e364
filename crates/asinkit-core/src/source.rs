//! The fetch capability the reconciler is driven by.

use std::future::Future;

use crate::catalog::{FetchFailure, ProductRecord};

/// Something that can turn an ASIN into a [`ProductRecord`].
///
/// Every call is a one-shot, terminal outcome: implementations own their
/// timeouts and callers never retry a failure.
pub trait ProductSource {
    fn fetch(&self, asin: &str) -> impl Future<Output = Result<ProductRecord, FetchFailure>> + Send;
}
