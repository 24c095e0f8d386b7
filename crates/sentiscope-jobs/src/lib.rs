//! Sentiscope Jobs
//!
//! Everything around a bulk classification run that touches storage.
//!
//! Provides:
//! - Batch job records and their status lifecycle
//! - Tabular input and per-row detail artifacts
//! - File-backed job and single-analysis history stores
//! - Export, statistics and job metrics

pub mod artifact;
pub mod history;
pub mod ids;
pub mod job;
pub mod metrics;
pub mod service;
pub mod store;
pub mod tabular;

pub use artifact::{read_detail_csv, write_detail_csv, DetailRow};
pub use history::{
    export_file_name, AnalysisRecord, ExportFormat, HistoryPage, HistoryQuery, HistoryStats,
    HistoryStore,
};
pub use job::{BatchJobSummary, JobStatus};
pub use metrics::MetricsCollector;
pub use service::{BatchJobService, UploadRequest, DEFAULT_DETAIL_LIMIT};
pub use store::{JobRepository, JobStore};
pub use tabular::{CsvReader, Table, TabularReader};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::history::{HistoryQuery, HistoryStore};
    pub use crate::job::{BatchJobSummary, JobStatus};
    pub use crate::service::{BatchJobService, UploadRequest};
    pub use crate::store::{JobRepository, JobStore};
}
