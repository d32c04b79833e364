//! Shared helpers for writing command output to disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use asinkit_export::{output_file_name, write_table, write_workbook, Sheet, TableFormat};
use asinkit_family::{attribute_crosstab, flat_table, relationship_counts, FamilyResult};
use chrono::{DateTime, Utc};

pub(crate) const FAMILY_SHEET: &str = "Family";
pub(crate) const ATTRIBUTES_SHEET: &str = "Attributes";

/// Resolves the output directory (flag, else configured default) and makes
/// sure it exists.
pub(crate) fn prepare_out_dir(
    config: &asinkit_core::AppConfig,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    let dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    Ok(dir)
}

/// Writes the flat table and cross-tab of one family.
///
/// CSV produces two files; XLSX produces one workbook with a sheet for each.
pub(crate) fn write_family_tables(
    result: &FamilyResult,
    format: TableFormat,
    dir: &Path,
    stamp: DateTime<Utc>,
) -> anyhow::Result<Vec<PathBuf>> {
    let id = result.seed_asin();
    let flat = flat_table(result);
    let crosstab = attribute_crosstab(result);

    let written = match format {
        TableFormat::Csv => {
            let flat_path = dir.join(output_file_name("family", id, stamp, "csv"));
            write_table(&flat, format, &flat_path)?;
            let crosstab_path = dir.join(output_file_name("attributes", id, stamp, "csv"));
            write_table(&crosstab, format, &crosstab_path)?;
            vec![flat_path, crosstab_path]
        }
        TableFormat::Xlsx => {
            let path = dir.join(output_file_name("family", id, stamp, "xlsx"));
            write_workbook(
                &[
                    Sheet::new(FAMILY_SHEET, flat),
                    Sheet::new(ATTRIBUTES_SHEET, crosstab),
                ],
                &path,
            )?;
            vec![path]
        }
    };
    Ok(written)
}

/// One-line summary of a reconciled family.
pub(crate) fn describe(result: &FamilyResult) -> String {
    if result.is_total_failure() {
        let status = result
            .unavailable()
            .first()
            .map_or("unknown", |u| u.status.as_str());
        return format!("family {}: seed unavailable ({status})", result.seed_asin());
    }

    let counts = relationship_counts(result);
    format!(
        "family {} (parent {}): {} parent, {} default child, {} child, {} unavailable, {} attribute(s)",
        result.seed_asin(),
        result.parent_asin(),
        counts.parent,
        counts.default_child,
        counts.child,
        counts.unavailable,
        result.attribute_names().len(),
    )
}

/// Persists `result` and reports the new run id.
pub(crate) async fn save(pool: &sqlx::PgPool, result: &FamilyResult) -> anyhow::Result<()> {
    let run_id = asinkit_db::save_family(pool, result)
        .await
        .with_context(|| format!("failed to save family {}", result.seed_asin()))?;
    match asinkit_db::get_family_run(pool, run_id).await? {
        Some(run) => println!("saved family {} as run {} ({})", run.seed_asin, run.id, run.public_id),
        None => tracing::warn!(run_id, "saved run could not be read back"),
    }
    Ok(())
}
