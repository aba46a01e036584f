use super::sink::{RecordIndex, RecordStore};
use super::stats::SinkStats;
use crate::models::EmailRecord;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Drain `records` until every sender is gone, writing each record to the
/// store and then the index.
///
/// The two sinks are independent: a failed insert does not skip indexing and
/// vice versa. Failures are logged and counted, never retried.
pub async fn collect<S, X>(
    mut records: mpsc::Receiver<EmailRecord>,
    store: Arc<S>,
    index: Arc<X>,
) -> SinkStats
where
    S: RecordStore + ?Sized,
    X: RecordIndex + ?Sized,
{
    let mut stats = SinkStats::default();

    while let Some(record) = records.recv().await {
        stats.received += 1;

        match store.save(&record).await {
            Ok(()) => stats.saved += 1,
            Err(err) => {
                stats.save_failures += 1;
                log::warn!("failed to save '{}': {}", record.message_id, err);
            }
        }

        match index.index(&record).await {
            Ok(()) => stats.indexed += 1,
            Err(err) => {
                stats.index_failures += 1;
                log::warn!("failed to index '{}': {}", record.message_id, err);
            }
        }

        if stats.received % 10_000 == 0 {
            log::info!(
                "collector progress: {} received, {} saved, {} indexed",
                stats.received,
                stats.saved,
                stats.indexed
            );
        }
    }

    log::debug!("collector drained after {} records", stats.received);
    stats
}
