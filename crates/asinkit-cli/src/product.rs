//! `raw` and `variants` commands: single-product dumps.

use std::path::PathBuf;

use asinkit_export::{output_file_name, variant_rows, write_json, write_table, TableFormat};
use chrono::Utc;

use crate::output;

/// Writes the unmodified product response for `asin` to
/// `amazon_<asin>_<timestamp>.json`.
pub(crate) async fn run_raw(
    config: &asinkit_core::AppConfig,
    asin: &str,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let dir = output::prepare_out_dir(config, out_dir)?;
    let client = crate::build_client(config)?;
    let asin = asin.trim();

    let body = client
        .fetch_product_json(asin)
        .await
        .map_err(|e| anyhow::anyhow!("failed to fetch {asin}: {e}"))?;

    let path = dir.join(output_file_name("amazon", asin, Utc::now(), "json"));
    write_json(&body, &path)?;
    println!("wrote {}", path.display());
    Ok(())
}

/// Writes the `Variant ASIN, Parent ASIN` listing for `asin` to
/// `variants_<asin>_<timestamp>.csv`.
pub(crate) async fn run_variants(
    config: &asinkit_core::AppConfig,
    asin: &str,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let dir = output::prepare_out_dir(config, out_dir)?;
    let client = crate::build_client(config)?;
    let asin = asin.trim();

    let record = client
        .fetch_product(asin)
        .await
        .map_err(|f| anyhow::anyhow!("failed to fetch {asin} ({}): {}", f.status, f.detail))?;

    if record.variants.is_empty() {
        println!("{asin} lists no variants; nothing written");
        return Ok(());
    }

    let path = dir.join(output_file_name("variants", asin, Utc::now(), "csv"));
    write_table(&variant_rows(&record), TableFormat::Csv, &path)?;
    println!("wrote {} variant(s) to {}", record.variants.len(), path.display());
    Ok(())
}
