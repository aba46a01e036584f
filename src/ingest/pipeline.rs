use super::collector::collect;
use super::error::{IngestError, TaskError};
use super::extractor::extract_file;
use super::sink::{RecordIndex, RecordStore};
use super::source::{FileSource, FsSource};
use super::stats::IngestReport;
use super::traversal::discover_files;
use crate::config::IngestConfig;
use crate::models::EmailRecord;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};

/// Bounded fan-out from files to a single collector.
///
/// Each discovered file gets its own task, but a task is only spawned once a
/// permit is available, so at most `max_concurrency` extractions run at once.
/// Tasks hand records to the collector over a channel of `channel_capacity`
/// slots and keep their permit until the hand-off completes.
pub struct IngestPipeline<S, X, F = FsSource> {
    store: Arc<S>,
    index: Arc<X>,
    source: Arc<F>,
    config: IngestConfig,
}

impl<S, X> IngestPipeline<S, X, FsSource>
where
    S: RecordStore,
    X: RecordIndex,
{
    pub fn new(store: S, index: X, config: IngestConfig) -> Self {
        Self::with_source(store, index, FsSource, config)
    }
}

impl<S, X, F> IngestPipeline<S, X, F>
where
    S: RecordStore,
    X: RecordIndex,
    F: FileSource,
{
    /// Out-of-range settings are clamped so the semaphore and channel can
    /// always be built.
    pub fn with_source(store: S, index: X, source: F, config: IngestConfig) -> Self {
        Self {
            store: Arc::new(store),
            index: Arc::new(index),
            source: Arc::new(source),
            config: config.normalized(),
        }
    }

    /// Ingest every regular file under `root`.
    ///
    /// Returns only after all worker tasks have finished and the collector has
    /// drained the channel. Per-file, per-insert and per-index failures are
    /// counted in the report; only setup problems surface as errors.
    pub async fn ingest(&self, root: &Path) -> Result<IngestReport, IngestError> {
        let started_at = Utc::now();
        let timer = Instant::now();

        let metadata =
            tokio::fs::metadata(root)
                .await
                .map_err(|source| IngestError::RootUnavailable {
                    path: root.to_path_buf(),
                    source,
                })?;
        if !metadata.is_dir() {
            return Err(IngestError::NotADirectory(root.to_path_buf()));
        }

        let walk_root = root.to_path_buf();
        let files = tokio::task::spawn_blocking(move || discover_files(&walk_root)).await??;
        let files_discovered = files.len();
        log::info!(
            "starting ingestion of {} files from {} (max {} concurrent)",
            files_discovered,
            root.display(),
            self.config.max_concurrency
        );

        let (sender, receiver) = mpsc::channel(self.config.channel_capacity);
        let collector = tokio::spawn(collect(
            receiver,
            Arc::clone(&self.store),
            Arc::clone(&self.index),
        ));

        let extraction_failures = self.run_workers(files, sender).await?;
        let sinks = collector.await?;

        let report = IngestReport {
            started_at,
            finished_at: Utc::now(),
            elapsed: timer.elapsed(),
            files_discovered,
            extraction_failures,
            sinks,
        };
        Ok(report)
    }

    /// Spawn one task per file and wait for all of them. Returns how many
    /// files produced no record.
    async fn run_workers(
        &self,
        files: Vec<PathBuf>,
        sender: mpsc::Sender<EmailRecord>,
    ) -> Result<usize, IngestError> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut failures = 0;

        for path in files {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|_| IngestError::PoolClosed)?;

            while let Some(outcome) = tasks.try_join_next() {
                failures += tally(outcome);
            }

            let source = Arc::clone(&self.source);
            let sender = sender.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let record = extract_file(source.as_ref(), &path).await?;
                sender
                    .send(record)
                    .await
                    .map_err(|_| TaskError::CollectorClosed(path))
            });
        }

        // The collector stops once the last task's sender clone is dropped.
        drop(sender);

        while let Some(outcome) = tasks.join_next().await {
            failures += tally(outcome);
        }

        Ok(failures)
    }
}

fn tally(outcome: Result<Result<(), TaskError>, JoinError>) -> usize {
    match outcome {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => {
            log::warn!("{}", err);
            1
        }
        Err(err) => {
            log::error!("extraction task aborted: {}", err);
            1
        }
    }
}
