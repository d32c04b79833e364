//! Tabular views of a finished [`FamilyResult`].
//!
//! Both views are plain `Vec<Vec<String>>` with the header row first, so the
//! export crate can render them to any format without knowing about
//! families.

use crate::types::{FamilyResult, Relationship};

/// Fixed leading columns of the flat table.
pub const FLAT_TABLE_COLUMNS: [&str; 7] = [
    "ASIN",
    "Parent ASIN",
    "Category",
    "Title",
    "Title Excluding Variant",
    "Relationship",
    "Status",
];

/// Status shown for every fetched member.
pub const ACTIVE_STATUS: &str = "Active";

/// One row per member, then one row per unavailable ASIN, then one column
/// per attribute name.
#[must_use]
pub fn flat_table(result: &FamilyResult) -> Vec<Vec<String>> {
    let names = result.attribute_names();
    let mut rows = Vec::with_capacity(1 + result.members().len() + result.unavailable().len());

    let mut header: Vec<String> = FLAT_TABLE_COLUMNS.iter().map(|c| (*c).to_owned()).collect();
    header.extend(names.iter().cloned());
    rows.push(header);

    for member in result.members() {
        let mut row = vec![
            member.asin.clone(),
            member.parent_asin.clone(),
            member.category.clone().unwrap_or_default(),
            member.title.clone(),
            member.title_excluding_variant.clone().unwrap_or_default(),
            member.relationship.as_str().to_owned(),
            ACTIVE_STATUS.to_owned(),
        ];
        row.extend(names.iter().map(|name| member.attribute(name).to_owned()));
        rows.push(row);
    }

    for entry in result.unavailable() {
        let mut row = vec![
            entry.asin.clone(),
            entry.parent_asin.clone().unwrap_or_default(),
            String::new(),
            entry.title.clone(),
            String::new(),
            Relationship::UNAVAILABLE_LABEL.to_owned(),
            entry.status.as_str().to_owned(),
        ];
        row.resize(row.len() + names.len(), String::new());
        rows.push(row);
    }

    rows
}

/// One column per `(attribute, non-empty value)` pair, headed
/// `"<name>: <value>"` and listing the member ASINs that carry it.
///
/// Columns are ordered by attribute name, then by first sighting of the
/// value; ASINs within a column keep member order. Shorter columns are
/// padded with empty cells.
#[must_use]
pub fn attribute_crosstab(result: &FamilyResult) -> Vec<Vec<String>> {
    let mut columns: Vec<(String, Vec<String>)> = Vec::new();

    for name in result.attribute_names() {
        let first_for_name = columns.len();
        for member in result.members() {
            let value = member.attribute(name);
            if value.is_empty() {
                continue;
            }
            let heading = format!("{name}: {value}");
            match columns[first_for_name..].iter_mut().find(|(h, _)| *h == heading) {
                Some((_, asins)) => asins.push(member.asin.clone()),
                None => columns.push((heading, vec![member.asin.clone()])),
            }
        }
    }

    let height = columns.iter().map(|(_, asins)| asins.len()).max().unwrap_or(0);
    let mut rows = Vec::with_capacity(height + 1);
    rows.push(columns.iter().map(|(heading, _)| heading.clone()).collect());
    for i in 0..height {
        rows.push(
            columns
                .iter()
                .map(|(_, asins)| asins.get(i).cloned().unwrap_or_default())
                .collect(),
        );
    }
    rows
}

/// How many ASINs of each kind a family holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationshipCounts {
    pub parent: usize,
    pub default_child: usize,
    pub child: usize,
    pub unavailable: usize,
}

impl RelationshipCounts {
    /// Counts taken straight from the result.
    #[must_use]
    pub fn from_result(result: &FamilyResult) -> Self {
        let mut counts = Self {
            unavailable: result.unavailable().len(),
            ..Self::default()
        };
        for member in result.members() {
            match member.relationship {
                Relationship::Parent => counts.parent += 1,
                Relationship::DefaultChild => counts.default_child += 1,
                Relationship::Child => counts.child += 1,
            }
        }
        counts
    }

    /// Counts recovered by scanning the `Relationship` column of a flat
    /// table. `None` if the header has no such column.
    #[must_use]
    pub fn from_flat_table(rows: &[Vec<String>]) -> Option<Self> {
        let (header, body) = rows.split_first()?;
        let column = header.iter().position(|h| h == "Relationship")?;

        let mut counts = Self::default();
        for row in body {
            match row.get(column).map(String::as_str) {
                Some("PARENT") => counts.parent += 1,
                Some("DEFAULT_CHILD") => counts.default_child += 1,
                Some("CHILD") => counts.child += 1,
                Some(Relationship::UNAVAILABLE_LABEL) => counts.unavailable += 1,
                _ => {}
            }
        }
        Some(counts)
    }
}

/// Shorthand for [`RelationshipCounts::from_result`].
#[must_use]
pub fn relationship_counts(result: &FamilyResult) -> RelationshipCounts {
    RelationshipCounts::from_result(result)
}

/// Shorthand for [`RelationshipCounts::from_flat_table`].
#[must_use]
pub fn relationship_counts_from_table(rows: &[Vec<String>]) -> Option<RelationshipCounts> {
    RelationshipCounts::from_flat_table(rows)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use asinkit_core::FetchStatus;

    use super::*;
    use crate::types::{FamilyMember, UnavailableMember};

    fn member(asin: &str, relationship: Relationship, attrs: &[(&str, &str)]) -> FamilyMember {
        FamilyMember {
            asin: asin.to_owned(),
            parent_asin: "B000".to_owned(),
            title: format!("Widget {asin}"),
            title_excluding_variant: None,
            category: Some("Home".to_owned()),
            relationship,
            attribute_values: attrs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn sample() -> FamilyResult {
        FamilyResult {
            seed_asin: "B001".to_owned(),
            parent_asin: "B000".to_owned(),
            members: vec![
                member("B000", Relationship::Parent, &[("Color", ""), ("Size", "")]),
                member("B001", Relationship::DefaultChild, &[("Color", "Red"), ("Size", "S")]),
                member("B002", Relationship::Child, &[("Color", "Blue"), ("Size", "S")]),
                member("B003", Relationship::Child, &[("Color", "Red"), ("Size", "")]),
            ],
            unavailable: vec![UnavailableMember {
                asin: "B004".to_owned(),
                parent_asin: Some("B000".to_owned()),
                status: FetchStatus::NoBuybox,
                title: "Unknown".to_owned(),
            }],
            attribute_names: vec!["Color".to_owned(), "Size".to_owned()],
            parent_title_normalized: "widget".to_owned(),
            parent_title_excluding_variant_normalized: String::new(),
        }
    }

    #[test]
    fn flat_table_header_and_rows() {
        let rows = flat_table(&sample());
        assert_eq!(
            rows[0],
            vec![
                "ASIN",
                "Parent ASIN",
                "Category",
                "Title",
                "Title Excluding Variant",
                "Relationship",
                "Status",
                "Color",
                "Size"
            ]
        );
        assert_eq!(rows.len(), 6);
        assert_eq!(
            rows[2],
            vec!["B001", "B000", "Home", "Widget B001", "", "DEFAULT_CHILD", "Active", "Red", "S"]
        );
        assert_eq!(
            rows[5],
            vec!["B004", "B000", "", "Unknown", "", "UNAVAILABLE", "no-buybox", "", ""]
        );
        assert!(rows.iter().all(|r| r.len() == 9));
    }

    #[test]
    fn crosstab_groups_asins_by_value() {
        let rows = attribute_crosstab(&sample());
        assert_eq!(rows[0], vec!["Color: Red", "Color: Blue", "Size: S"]);
        assert_eq!(rows[1], vec!["B001", "B002", "B001"]);
        assert_eq!(rows[2], vec!["B003", "", "B002"]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn crosstab_without_values_is_header_only() {
        let mut result = sample();
        result.members.truncate(1);
        let rows = attribute_crosstab(&result);
        assert_eq!(rows, vec![Vec::<String>::new()]);
    }

    #[test]
    fn counts_survive_a_table_round_trip() {
        let result = sample();
        let direct = RelationshipCounts::from_result(&result);
        assert_eq!(
            direct,
            RelationshipCounts {
                parent: 1,
                default_child: 1,
                child: 2,
                unavailable: 1
            }
        );
        assert_eq!(RelationshipCounts::from_flat_table(&flat_table(&result)), Some(direct));
    }

    #[test]
    fn counts_from_table_without_relationship_column() {
        let rows = vec![vec!["ASIN".to_owned()], vec!["B001".to_owned()]];
        assert_eq!(RelationshipCounts::from_flat_table(&rows), None);
        assert_eq!(RelationshipCounts::from_flat_table(&[]), None);
    }
}
