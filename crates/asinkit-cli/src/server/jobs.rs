//! In-memory store batch jobs.
//!
//! A submitted job is queued and picked up by a single worker, so batches
//! run one at a time. Finished jobs are forgotten after [`JOB_TTL`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use asinkit_export::TableFormat;
use asinkit_rainforest::RainforestClient;
use tokio::sync::{mpsc, Mutex};

use crate::store::store_batch;

pub(crate) const JOB_TTL: Duration = Duration::from_secs(60 * 60);

/// A queued request to run one store batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Job {
    pub(crate) id: String,
    pub(crate) store_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JobState {
    Processing,
    Complete { path: PathBuf },
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub(crate) struct JobEntry {
    pub(crate) store_id: String,
    pub(crate) state: JobState,
    finished_at: Option<Instant>,
}

/// Shared job table. Cloning shares the same table.
#[derive(Debug, Clone, Default)]
pub(crate) struct JobStore {
    entries: Arc<Mutex<HashMap<String, JobEntry>>>,
}

impl JobStore {
    /// Registers a new job as processing and returns it for queueing.
    pub(crate) async fn submit(&self, store_id: &str) -> Job {
        let job = Job {
            id: uuid::Uuid::new_v4().to_string(),
            store_id: store_id.to_owned(),
        };
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries, Instant::now());
        entries.insert(
            job.id.clone(),
            JobEntry {
                store_id: job.store_id.clone(),
                state: JobState::Processing,
                finished_at: None,
            },
        );
        job
    }

    pub(crate) async fn get(&self, id: &str) -> Option<JobEntry> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries, Instant::now());
        entries.get(id).cloned()
    }

    pub(crate) async fn complete(&self, id: &str, path: PathBuf) {
        self.finish(id, JobState::Complete { path }).await;
    }

    pub(crate) async fn fail(&self, id: &str, message: String) {
        self.finish(id, JobState::Failed { message }).await;
    }

    async fn finish(&self, id: &str, state: JobState) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(id) {
            entry.state = state;
            entry.finished_at = Some(Instant::now());
        }
    }
}

/// Drops finished jobs older than [`JOB_TTL`]. Jobs still processing are
/// kept regardless of age.
fn purge_expired(entries: &mut HashMap<String, JobEntry>, now: Instant) {
    entries.retain(|_, entry| {
        entry
            .finished_at
            .is_none_or(|at| now.saturating_duration_since(at) < JOB_TTL)
    });
}

/// Settings the worker applies to every batch.
pub(crate) struct WorkerSettings {
    pub(crate) format: TableFormat,
    pub(crate) out_dir: PathBuf,
    pub(crate) delay: Duration,
}

/// Runs queued jobs one after another until every sender is dropped.
pub(crate) async fn run_worker(
    mut queue: mpsc::Receiver<Job>,
    jobs: JobStore,
    client: RainforestClient,
    settings: WorkerSettings,
) {
    while let Some(job) = queue.recv().await {
        tracing::info!(job_id = %job.id, store_id = %job.store_id, "store job started");
        let outcome = run_job(&client, &job, &settings).await;
        match outcome {
            Ok(path) => {
                tracing::info!(job_id = %job.id, path = %path.display(), "store job complete");
                jobs.complete(&job.id, path).await;
            }
            Err(err) => {
                tracing::warn!(job_id = %job.id, error = %err, "store job failed");
                jobs.fail(&job.id, format!("{err:#}")).await;
            }
        }
    }
    tracing::debug!("job queue closed");
}

async fn run_job(
    client: &RainforestClient,
    job: &Job,
    settings: &WorkerSettings,
) -> anyhow::Result<PathBuf> {
    let batch = store_batch(
        client,
        &job.store_id,
        settings.format,
        &settings.out_dir,
        settings.delay,
        None,
    )
    .await?;
    batch
        .combined_path()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow::anyhow!("store {} lists no products", job.store_id))
}
