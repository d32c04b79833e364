//! `family` command: reconcile one family per seed ASIN.

use std::path::PathBuf;

use asinkit_export::TableFormat;
use asinkit_family::FamilyReconciler;
use chrono::Utc;

use crate::output;

/// Reconciles each seed in turn and writes its tables.
///
/// A seed that cannot be fetched still produces output (a single
/// unavailable row); only I/O, client construction, and database errors
/// abort the run.
pub(crate) async fn run_family(
    config: &asinkit_core::AppConfig,
    asins: &[String],
    format: TableFormat,
    out_dir: Option<PathBuf>,
    save: bool,
) -> anyhow::Result<()> {
    let dir = output::prepare_out_dir(config, out_dir)?;
    let client = crate::build_client(config)?;
    let pool = crate::connect_if_saving(config, save).await?;
    let reconciler = FamilyReconciler::new(&client);
    let stamp = Utc::now();

    for asin in asins {
        let result = reconciler.reconcile(asin).await;
        println!("{}", output::describe(&result));

        for path in output::write_family_tables(&result, format, &dir, stamp)? {
            println!("  wrote {}", path.display());
        }

        if let Some(pool) = &pool {
            output::save(pool, &result).await?;
        }
    }

    Ok(())
}
