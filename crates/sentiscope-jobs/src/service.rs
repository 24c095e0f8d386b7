//! Bulk upload orchestration
//!
//! Provides:
//! - Reading an uploaded table and selecting the text column
//! - Driving a job record through its status lifecycle
//! - Running the batch, aggregating it and writing the detail artifact
//! - Batch detail lookup and deletion

use crate::artifact::{read_detail_csv, write_detail_csv, DetailRow};
use crate::job::{BatchJobSummary, JobStatus};
use crate::metrics::MetricsCollector;
use crate::store::{JobRepository, JobStore};
use crate::tabular::{CsvReader, TabularReader};
use sentiscope_classifiers::{aggregate, validate_max_items, BatchRunner, Classifier};
use sentiscope_core::{Result, Variant};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Rows of a detail artifact shown by default
pub const DEFAULT_DETAIL_LIMIT: usize = 50;

/// A bulk upload to classify
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    /// Uploaded file
    pub source: &'a Path,

    /// Header of the column holding the texts
    pub text_column: &'a str,

    pub variant: Variant,

    /// Cap on rows classified (1..=1000)
    pub max_items: usize,
}

/// Runs bulk jobs end to end
pub struct BatchJobService<C, R = CsvReader, S = JobStore> {
    runner: BatchRunner<C>,
    reader: R,
    store: S,
    metrics: MetricsCollector,
}

impl<C: Classifier> BatchJobService<C, CsvReader, JobStore> {
    /// Create a service reading CSV uploads into a file-backed store
    pub fn new(runner: BatchRunner<C>, store: JobStore) -> Self {
        Self::with_reader(runner, CsvReader, store)
    }
}

impl<C: Classifier, S: JobRepository> BatchJobService<C, CsvReader, S> {
    /// Create a service reading CSV uploads into any job repository
    pub fn with_store(runner: BatchRunner<C>, store: S) -> Self {
        Self::with_reader(runner, CsvReader, store)
    }
}

impl<C: Classifier, R: TabularReader, S: JobRepository> BatchJobService<C, R, S> {
    pub fn with_reader(runner: BatchRunner<C>, reader: R, store: S) -> Self {
        Self {
            runner,
            reader,
            store,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Classify the text column of an uploaded file.
    ///
    /// Failing to read the file or find the column is reported before any
    /// job record exists. Once a job is created, a whole-batch fault marks
    /// it `failed` and is returned; per-row failures never fail the job.
    pub fn run_upload(&self, request: &UploadRequest<'_>) -> Result<BatchJobSummary> {
        validate_max_items(request.max_items)?;

        let table = self.reader.read(request.source)?;
        let texts: Vec<String> = table
            .column_texts(request.text_column)?
            .into_iter()
            .take(request.max_items)
            .map(|(_, text)| text)
            .collect();

        let source_name = request
            .source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| request.source.display().to_string());

        self.run_texts(&source_name, &texts, request.variant)
    }

    /// Classify already-extracted texts as one job.
    ///
    /// Once the `pending` record is stored, every fault ends with the job
    /// persisted as `failed`.
    pub fn run_texts(
        &self,
        source_name: &str,
        texts: &[String],
        variant: Variant,
    ) -> Result<BatchJobSummary> {
        let mut job = BatchJobSummary::new(self.store.reserve_id()?, source_name, texts.len());
        self.store.save(&job)?;

        match self.process(&mut job, texts, variant) {
            Ok(()) => {
                self.metrics.record_job(JobStatus::Completed);
                info!(
                    job_id = job.id,
                    positive = job.positive_count,
                    negative = job.negative_count,
                    neutral = job.neutral_count,
                    average_confidence = job.average_confidence,
                    "Batch job completed"
                );
                Ok(job)
            }
            Err(e) => {
                error!(job_id = job.id, error = %e, "Batch job failed");
                job.fail(e.to_string())?;
                if let Err(save_err) = self.store.save(&job) {
                    error!(job_id = job.id, error = %save_err, "Could not record job failure");
                }
                self.metrics.record_job(JobStatus::Failed);
                Err(e)
            }
        }
    }

    /// Drive a stored `pending` job to `completed`.
    ///
    /// On error `job` is left `pending` or `processing` with no artifact.
    fn process(&self, job: &mut BatchJobSummary, texts: &[String], variant: Variant) -> Result<()> {
        let start = Instant::now();

        let mut processing = job.clone();
        processing.start_processing()?;
        self.store.save(&processing)?;
        *job = processing;
        self.metrics.record_job(JobStatus::Processing);
        info!(
            job_id = job.id,
            items = texts.len(),
            variant = %variant,
            "Batch job processing"
        );

        let results = self.runner.run(texts, variant);
        let summary = aggregate(&results);
        self.metrics
            .record_items(results.len() as u64, summary.error_count as u64);

        let artifact = self.store.reports_dir().join(job.artifact_file_name());
        write_detail_csv(&artifact, &results)?;

        let mut done = job.clone();
        let finished = done
            .complete(&summary, artifact.clone())
            .and_then(|()| self.store.save(&done));
        if let Err(e) = finished {
            if let Err(rm_err) = std::fs::remove_file(&artifact) {
                warn!(
                    job_id = job.id,
                    error = %rm_err,
                    "Could not discard detail artifact {:?}",
                    artifact
                );
            }
            return Err(e);
        }
        *job = done;

        self.metrics
            .record_latency(start.elapsed().as_micros() as u64);
        Ok(())
    }

    /// A job and the first `limit` rows of its detail artifact
    pub fn detail(&self, id: u64, limit: usize) -> Result<(BatchJobSummary, Vec<DetailRow>)> {
        let job = self.store.get(id)?;
        let rows = match job.detail_artifact {
            Some(ref artifact) => read_detail_csv(artifact, limit)?,
            None => Vec::new(),
        };
        Ok((job, rows))
    }

    /// Delete a job together with its detail artifact
    pub fn delete(&self, id: u64) -> Result<()> {
        self.store.delete(id)
    }
}
