use asinkit_core::ProductRecord;

/// The two-column variant listing of one product: every listed variant ASIN
/// next to the product's declared parent ASIN (empty if it declares none).
#[must_use]
pub fn variant_rows(record: &ProductRecord) -> Vec<Vec<String>> {
    let parent = record.parent_asin.clone().unwrap_or_default();
    let mut rows = Vec::with_capacity(record.variants.len() + 1);
    rows.push(vec!["Variant ASIN".to_owned(), "Parent ASIN".to_owned()]);
    rows.extend(
        record
            .variants
            .iter()
            .map(|variant| vec![variant.asin.clone(), parent.clone()]),
    );
    rows
}
