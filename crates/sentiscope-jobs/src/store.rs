//! Batch job persistence
//!
//! Each job summary lives in `<data_dir>/jobs/<id>.json`; detail artifacts
//! live in `<data_dir>/reports/`. A summary and its artifact are removed
//! together. Ids are reserved through marker files in
//! `<data_dir>/job_ids/` so concurrent jobs never share a summary.

use crate::ids::IdAllocator;
use crate::job::BatchJobSummary;
use sentiscope_core::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Storage used by the job service
pub trait JobRepository: Send + Sync {
    /// Reserve an id no other job holds or has held
    fn reserve_id(&self) -> Result<u64>;

    /// Create or overwrite a summary
    fn save(&self, job: &BatchJobSummary) -> Result<()>;

    fn get(&self, id: u64) -> Result<BatchJobSummary>;

    /// All summaries, newest first
    fn list(&self) -> Result<Vec<BatchJobSummary>>;

    /// Delete a summary and its detail artifact
    fn delete(&self, id: u64) -> Result<()>;

    /// Directory detail artifacts are written to
    fn reports_dir(&self) -> &Path;
}

/// File-backed store for batch job summaries
pub struct JobStore {
    jobs_dir: PathBuf,
    reports_dir: PathBuf,
    ids: IdAllocator,
    tmp_seq: AtomicU64,
}

impl JobStore {
    /// Open (or create) the store under `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        let jobs_dir = data_dir.join("jobs");
        let reports_dir = data_dir.join("reports");
        std::fs::create_dir_all(&jobs_dir)?;
        std::fs::create_dir_all(&reports_dir)?;

        // Summaries written before markers existed still bound new ids
        let floor = summary_ids(&jobs_dir)?.into_iter().max().unwrap_or(0);
        let ids = IdAllocator::open(data_dir.join("job_ids"), floor)?;

        Ok(Self {
            jobs_dir,
            reports_dir,
            ids,
            tmp_seq: AtomicU64::new(0),
        })
    }

    /// Directory detail artifacts are written to
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Reserve the id for a new job
    pub fn reserve_id(&self) -> Result<u64> {
        self.ids.reserve()
    }

    /// Create or overwrite a summary.
    ///
    /// Writes go to a temporary file first so readers never see a
    /// half-written summary.
    pub fn save(&self, job: &BatchJobSummary) -> Result<()> {
        let path = self.job_path(job.id);
        let tmp_path = self.jobs_dir.join(format!(
            "{}.json.{}-{}.tmp",
            job.id,
            std::process::id(),
            self.tmp_seq.fetch_add(1, Ordering::Relaxed)
        ));

        let written = (|| -> Result<()> {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, job)?;
            writer.flush()?;
            drop(writer);
            std::fs::rename(&tmp_path, &path)?;
            Ok(())
        })();
        if written.is_err() {
            let _ = std::fs::remove_file(&tmp_path);
        }
        written?;

        debug!(job_id = job.id, status = %job.status, "Saved job summary");
        Ok(())
    }

    /// Load one summary
    pub fn get(&self, id: u64) -> Result<BatchJobSummary> {
        let path = self.job_path(id);
        if !path.exists() {
            return Err(Error::not_found(format!("batch job {id}")));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// All summaries, newest first
    pub fn list(&self) -> Result<Vec<BatchJobSummary>> {
        let mut jobs = Vec::new();
        for id in summary_ids(&self.jobs_dir)? {
            match self.get(id) {
                Ok(job) => jobs.push(job),
                Err(e) => warn!(job_id = id, error = %e, "Skipping unreadable job summary"),
            }
        }
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(jobs)
    }

    /// Delete a summary and its detail artifact
    pub fn delete(&self, id: u64) -> Result<()> {
        let job = self.get(id)?;

        if let Some(ref artifact) = job.detail_artifact {
            match std::fs::remove_file(artifact) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(job_id = id, "Detail artifact {:?} was already gone", artifact);
                }
                Err(e) => return Err(e.into()),
            }
        }
        std::fs::remove_file(self.job_path(id))?;

        info!(job_id = id, "Deleted batch job");
        Ok(())
    }

    fn job_path(&self, id: u64) -> PathBuf {
        self.jobs_dir.join(format!("{id}.json"))
    }
}

impl JobRepository for JobStore {
    fn reserve_id(&self) -> Result<u64> {
        JobStore::reserve_id(self)
    }

    fn save(&self, job: &BatchJobSummary) -> Result<()> {
        JobStore::save(self, job)
    }

    fn get(&self, id: u64) -> Result<BatchJobSummary> {
        JobStore::get(self, id)
    }

    fn list(&self) -> Result<Vec<BatchJobSummary>> {
        JobStore::list(self)
    }

    fn delete(&self, id: u64) -> Result<()> {
        JobStore::delete(self, id)
    }

    fn reports_dir(&self) -> &Path {
        JobStore::reports_dir(self)
    }
}

fn summary_ids(jobs_dir: &Path) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(jobs_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(id) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok())
        {
            ids.push(id);
        }
    }
    Ok(ids)
}
