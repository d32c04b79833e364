//! `serve` command: HTTP front end for store batches.
//!
//! `POST /api/scrape` queues a store batch and answers with a job id,
//! `GET /api/status/{job_id}` reports progress, and
//! `GET /api/download/{job_id}` serves the combined table once the job is
//! complete.

mod api;
mod jobs;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use asinkit_export::TableFormat;
use tokio::sync::mpsc;

use crate::output;
use api::{build_app, AppState};
use jobs::{run_worker, JobStore, WorkerSettings};

const QUEUE_CAPACITY: usize = 32;

pub(crate) async fn run_serve(
    config: &asinkit_core::AppConfig,
    bind: Option<SocketAddr>,
    format: TableFormat,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let dir = output::prepare_out_dir(config, out_dir)?;
    let client = crate::build_client(config)?;

    let jobs = JobStore::default();
    let (queue, receiver) = mpsc::channel(QUEUE_CAPACITY);
    let worker = tokio::spawn(run_worker(
        receiver,
        jobs.clone(),
        client,
        WorkerSettings {
            format,
            out_dir: dir,
            delay: Duration::from_millis(config.inter_request_delay_ms),
        },
    ));

    let app = build_app(AppState { jobs, queue });
    let addr = bind.unwrap_or(config.bind_addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, %format, "serving store jobs");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    worker.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
