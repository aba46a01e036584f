//! Corpus ingestion: walk a directory tree, extract one record per file and
//! write every record to both the relational store and the search index.
//!
//! # Architecture
//!
//! ```text
//! discover_files (blocking walk)
//!        │ Vec<PathBuf>
//!        ▼
//! driver ── acquire permit ──► worker task × N (≤ max_concurrency)
//!                                  │ read + extract_record
//!                                  ▼
//!                         mpsc channel (channel_capacity)
//!                                  │
//!                                  ▼
//!                        collector (single task)
//!                          ├─► RecordStore::save
//!                          └─► RecordIndex::index
//! ```
//!
//! A run ends only once every worker has been joined and the collector has
//! drained the channel, so the returned [`IngestReport`] is final.
//!
//! Failures are isolated per file: an unreadable file, a rejected insert or a
//! rejected index request is logged and counted but never stops the run.

mod collector;
mod error;
mod extractor;
mod pipeline;
mod sink;
mod source;
mod stats;
mod traversal;

pub use collector::collect;
pub use error::{ExtractError, IngestError, TaskError};
pub use extractor::{extract_file, extract_record};
pub use pipeline::IngestPipeline;
pub use sink::{RecordIndex, RecordStore, SinkError};
pub use source::{FileSource, FsSource};
pub use stats::{IngestReport, SinkStats};
pub use traversal::discover_files;
