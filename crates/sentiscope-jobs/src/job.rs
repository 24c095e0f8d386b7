//! Batch job record and its status lifecycle
//!
//! `pending` → `processing` → `completed`, or → `failed` from either
//! non-terminal state. Terminal states accept no further transitions.

use chrono::{DateTime, Utc};
use sentiscope_classifiers::BatchAggregate;
use sentiscope_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Status of a batch job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted summary of one bulk classification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJobSummary {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Name of the uploaded source
    pub source_name: String,

    pub status: JobStatus,

    /// Rows accepted for classification
    pub total_items: usize,

    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,

    pub average_confidence: f64,

    /// Detail CSV written for this job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_artifact: Option<PathBuf>,

    /// Why the job failed, when it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl BatchJobSummary {
    /// Create a pending job
    pub fn new(id: u64, source_name: impl Into<String>, total_items: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            completed_at: None,
            source_name: source_name.into(),
            status: JobStatus::Pending,
            total_items,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            average_confidence: 0.0,
            detail_artifact: None,
            failure_reason: None,
        }
    }

    /// File name of this job's detail artifact
    pub fn artifact_file_name(&self) -> String {
        format!("batch_{}_results.csv", self.id)
    }

    /// `pending` → `processing`
    pub fn start_processing(&mut self) -> Result<()> {
        self.transition(JobStatus::Processing)
    }

    /// `processing` → `completed`, recording the aggregate and artifact
    pub fn complete(&mut self, aggregate: &BatchAggregate, artifact: PathBuf) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(self.rejected(JobStatus::Completed));
        }

        self.positive_count = aggregate.positive_count;
        self.negative_count = aggregate.negative_count;
        self.neutral_count = aggregate.neutral_count;
        self.average_confidence = aggregate.average_confidence;
        self.detail_artifact = Some(artifact);
        self.transition(JobStatus::Completed)?;
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// Any non-terminal state → `failed`
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(JobStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, next: JobStatus) -> Result<()> {
        let allowed = matches!(
            (self.status, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Processing, JobStatus::Failed)
        );
        if !allowed {
            return Err(self.rejected(next));
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn rejected(&self, next: JobStatus) -> Error {
        Error::invalid_state(format!(
            "job {} cannot move from {} to {}",
            self.id, self.status, next
        ))
    }

    /// Rows that received a sentiment label
    pub fn classified_items(&self) -> usize {
        self.positive_count + self.negative_count + self.neutral_count
    }
}
