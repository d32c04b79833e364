//! `store` command: reconcile every family reachable from a storefront.
//!
//! Families are reconciled one after another. An ASIN already seen in an
//! earlier family (as a member or as unavailable) is not used as a seed
//! again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use asinkit_export::{output_file_name, write_table, write_workbook, Sheet, TableFormat};
use asinkit_family::projection::FLAT_TABLE_COLUMNS;
use asinkit_family::{attribute_crosstab, flat_table, FamilyReconciler, FamilyResult};
use asinkit_rainforest::RainforestClient;
use chrono::Utc;
use sqlx::PgPool;

use crate::output;

const FAMILIES_SHEET: &str = "Families";
const MAX_SHEET_NAME_CHARS: usize = 31;

/// What one store batch produced.
pub(crate) struct StoreBatch {
    pub(crate) listed: usize,
    pub(crate) families: Vec<FamilyResult>,
    /// Combined table first, then per-family cross-tabs for CSV output.
    /// Empty when the store listed nothing.
    pub(crate) written: Vec<PathBuf>,
}

impl StoreBatch {
    /// The file that holds every family of the batch.
    pub(crate) fn combined_path(&self) -> Option<&Path> {
        self.written.first().map(PathBuf::as_path)
    }
}

pub(crate) async fn run_store(
    config: &asinkit_core::AppConfig,
    store_id: &str,
    format: TableFormat,
    out_dir: Option<PathBuf>,
    save: bool,
) -> anyhow::Result<()> {
    let dir = output::prepare_out_dir(config, out_dir)?;
    let client = crate::build_client(config)?;
    let pool = crate::connect_if_saving(config, save).await?;
    let store_id = store_id.trim();
    let delay = Duration::from_millis(config.inter_request_delay_ms);

    let batch = store_batch(&client, store_id, format, &dir, delay, pool.as_ref()).await?;
    if batch.listed == 0 {
        println!("store {store_id} lists no products; nothing written");
        return Ok(());
    }

    for family in &batch.families {
        println!("{}", output::describe(family));
    }
    for path in &batch.written {
        println!("wrote {}", path.display());
    }
    println!(
        "store {store_id}: {} families from {} listed ASINs",
        batch.families.len(),
        batch.listed
    );
    Ok(())
}

/// Reconciles every family reachable from `store_id` and writes the tables
/// into `dir`.
///
/// Families are reconciled one after another with `delay` between them. When
/// `pool` is set each family is saved as soon as it is reconciled.
pub(crate) async fn store_batch(
    client: &RainforestClient,
    store_id: &str,
    format: TableFormat,
    dir: &Path,
    delay: Duration,
    pool: Option<&PgPool>,
) -> anyhow::Result<StoreBatch> {
    let asins = client
        .fetch_store_catalog(store_id)
        .await
        .with_context(|| format!("failed to fetch store {store_id}"))?;
    if asins.is_empty() {
        tracing::info!(store_id, "store lists no products");
        return Ok(StoreBatch {
            listed: 0,
            families: Vec::new(),
            written: Vec::new(),
        });
    }
    tracing::info!(store_id, asins = asins.len(), "store catalog fetched");

    let reconciler = FamilyReconciler::new(client);
    let mut covered: HashSet<String> = HashSet::new();
    let mut families: Vec<FamilyResult> = Vec::new();

    for asin in &asins {
        if covered.contains(asin) {
            tracing::debug!(asin, "already covered by an earlier family");
            continue;
        }
        if !families.is_empty() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = reconciler.reconcile(asin).await;
        covered.insert(asin.clone());
        covered.extend(result.asins().map(str::to_owned));

        if let Some(pool) = pool {
            output::save(pool, &result).await?;
        }
        families.push(result);
    }

    let written = write_store_tables(store_id, &families, format, dir)?;
    Ok(StoreBatch {
        listed: asins.len(),
        families,
        written,
    })
}

fn write_store_tables(
    store_id: &str,
    families: &[FamilyResult],
    format: TableFormat,
    dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let stamp = Utc::now();
    let combined = combine_flat_tables(families.iter().map(flat_table));
    let mut written = Vec::new();
    match format {
        TableFormat::Csv => {
            let path = dir.join(output_file_name("store", store_id, stamp, "csv"));
            write_table(&combined, format, &path)?;
            written.push(path);
            for family in families {
                let path = dir.join(output_file_name("attributes", family.seed_asin(), stamp, "csv"));
                write_table(&attribute_crosstab(family), format, &path)?;
                written.push(path);
            }
        }
        TableFormat::Xlsx => {
            let mut sheets = vec![Sheet::new(FAMILIES_SHEET, combined)];
            sheets.extend(families.iter().map(|family| {
                Sheet::new(sheet_name(family.seed_asin()), attribute_crosstab(family))
            }));
            let path = dir.join(output_file_name("store", store_id, stamp, "xlsx"));
            write_workbook(&sheets, &path)?;
            written.push(path);
        }
    }
    Ok(written)
}

/// Stacks several flat tables under one header.
///
/// The fixed columns are shared; attribute columns are the union of every
/// table's attribute names in first-seen order, with empty cells where a
/// family lacks an attribute.
pub(crate) fn combine_flat_tables<I>(tables: I) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = Vec<Vec<String>>>,
{
    let fixed = FLAT_TABLE_COLUMNS.len();
    let mut header: Vec<String> = FLAT_TABLE_COLUMNS.iter().map(|c| (*c).to_owned()).collect();
    let mut body: Vec<Vec<String>> = Vec::new();
    let mut pending: Vec<(Vec<usize>, Vec<Vec<String>>)> = Vec::new();

    for table in tables {
        let mut rows = table.into_iter();
        let Some(table_header) = rows.next() else {
            continue;
        };
        let columns = table_header
            .iter()
            .skip(fixed)
            .map(|name| {
                let existing = header[fixed..].iter().position(|h| h == name);
                if let Some(i) = existing {
                    fixed + i
                } else {
                    header.push(name.clone());
                    header.len() - 1
                }
            })
            .collect();
        pending.push((columns, rows.collect()));
    }

    let width = header.len();
    for (columns, rows) in pending {
        for row in rows {
            let mut combined = vec![String::new(); width];
            for (i, cell) in row.into_iter().enumerate() {
                let target = if i < fixed { Some(i) } else { columns.get(i - fixed).copied() };
                if let Some(target) = target {
                    combined[target] = cell;
                }
            }
            body.push(combined);
        }
    }

    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(header);
    out.extend(body);
    out
}

fn sheet_name(seed_asin: &str) -> String {
    seed_asin.chars().take(MAX_SHEET_NAME_CHARS).collect()
}
