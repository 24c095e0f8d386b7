//! Single-analysis history
//!
//! Provides file-based persistence for single-text analyses with:
//! - JSON-lines format for append-only writes
//! - Filtering by sentiment, text search and pagination
//! - Aggregate statistics
//! - CSV and JSON export

use crate::artifact::csv_field;
use crate::ids::IdAllocator;
use chrono::{DateTime, Utc};
use sentiscope_core::{ClassificationResult, Error, Result, SentimentLabel};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Default characters of input text kept per record
pub const DEFAULT_STORED_TEXT_LIMIT: usize = 500;

/// Default rows per history page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A stored single analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: u64,
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub model_used: String,
    /// Full classification result
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Filter and page selection for history queries
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Only this sentiment
    pub sentiment: Option<SentimentLabel>,

    /// Case-insensitive substring of the text
    pub search: Option<String>,
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by sentiment
    pub fn sentiment(mut self, sentiment: SentimentLabel) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Filter by text search
    pub fn search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.is_empty()).then(|| search.to_lowercase());
        self
    }

    fn matches(&self, record: &AnalysisRecord) -> bool {
        if let Some(sentiment) = self.sentiment {
            if record.sentiment != sentiment {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            if !record.text.to_lowercase().contains(search.as_str()) {
                return false;
            }
        }
        true
    }
}

/// One page of history, newest first
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub items: Vec<AnalysisRecord>,
    /// 1-based page number actually served
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Aggregate statistics over stored analyses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_analyses: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub average_confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON array
    Json,
    /// CSV format
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("Invalid export format: {other}")),
        }
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Default export file name, e.g. `sentiment_history_20240101_120000.csv`
pub fn export_file_name(format: ExportFormat, at: DateTime<Utc>) -> String {
    format!(
        "sentiment_history_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// History store backed by a JSON-lines file.
///
/// Ids come from marker files in `<data_dir>/history_ids/`; appends and
/// rewrites from one store are serialized.
pub struct HistoryStore {
    path: PathBuf,
    stored_text_limit: usize,
    ids: IdAllocator,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Open (or create) the history file in `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join("history.jsonl");

        // Records written before markers existed still bound new ids
        let floor = read_records(&path)?.iter().map(|r| r.id).max().unwrap_or(0);
        let ids = IdAllocator::open(data_dir.join("history_ids"), floor)?;

        Ok(Self {
            path,
            stored_text_limit: DEFAULT_STORED_TEXT_LIMIT,
            ids,
            write_lock: Mutex::new(()),
        })
    }

    /// Set how many characters of input text are stored
    pub fn with_stored_text_limit(mut self, limit: usize) -> Self {
        self.stored_text_limit = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a classification result
    pub fn record(&self, result: &ClassificationResult) -> Result<AnalysisRecord> {
        let record = AnalysisRecord {
            id: self.ids.reserve()?,
            text: result.text.chars().take(self.stored_text_limit).collect(),
            sentiment: result.label,
            confidence: result.confidence,
            model_used: result.model_name.clone(),
            metadata: serde_json::to_value(result)?,
            created_at: Utc::now(),
        };

        // One write per line keeps appends from other processes whole
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.lock()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        debug!(id = record.id, sentiment = %record.sentiment, "Stored analysis");
        Ok(record)
    }

    /// All records, newest first
    pub fn load_all(&self) -> Result<Vec<AnalysisRecord>> {
        let mut records = read_records(&self.path)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Records matching `query`, newest first
    pub fn query(&self, query: &HistoryQuery) -> Result<Vec<AnalysisRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| query.matches(r))
            .collect())
    }

    /// One page of matching records.
    ///
    /// Pages are 1-based; out-of-range page numbers are clamped to the
    /// nearest valid page.
    pub fn page(&self, query: &HistoryQuery, page: usize, page_size: usize) -> Result<HistoryPage> {
        let page_size = page_size.max(1);
        let records = self.query(query)?;
        let total_items = records.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);

        let items = records
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Ok(HistoryPage {
            items,
            page,
            total_pages,
            total_items,
        })
    }

    /// Look up one record
    pub fn get(&self, id: u64) -> Result<AnalysisRecord> {
        self.load_all()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::not_found(format!("analysis {id}")))
    }

    /// Delete one record
    pub fn delete(&self, id: u64) -> Result<()> {
        let _guard = self.lock()?;
        let records = self.load_all()?;
        if !records.iter().any(|r| r.id == id) {
            return Err(Error::not_found(format!("analysis {id}")));
        }

        // Rewrite oldest first so append order is preserved
        let tmp_path = self
            .path
            .with_extension(format!("jsonl.{}.tmp", std::process::id()));
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for record in records.iter().rev().filter(|r| r.id != id) {
                serde_json::to_writer(&mut writer, record)?;
                writeln!(writer)?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        info!(id, "Deleted analysis");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::storage("history write lock poisoned"))
    }

    /// Totals, distribution and mean confidence across all records
    pub fn stats(&self) -> Result<HistoryStats> {
        let records = self.load_all()?;
        let mut distribution = SentimentDistribution::default();
        let mut confidence_sum = 0.0;

        for record in &records {
            match record.sentiment {
                SentimentLabel::Positive => distribution.positive += 1,
                SentimentLabel::Negative => distribution.negative += 1,
                SentimentLabel::Neutral => distribution.neutral += 1,
            }
            confidence_sum += record.confidence;
        }

        let average_confidence = if records.is_empty() {
            0.0
        } else {
            confidence_sum / records.len() as f64
        };

        Ok(HistoryStats {
            total_analyses: records.len(),
            sentiment_distribution: distribution,
            average_confidence,
        })
    }

    /// Export matching records to a file; returns the number exported
    pub fn export_to_file(
        &self,
        query: &HistoryQuery,
        output_path: &Path,
        format: ExportFormat,
    ) -> Result<usize> {
        let records = self.query(query)?;
        let mut file = BufWriter::new(File::create(output_path)?);

        match format {
            ExportFormat::Json => {
                serde_json::to_writer_pretty(&mut file, &records)?;
            }
            ExportFormat::Csv => {
                writeln!(
                    file,
                    "ID,Text,Sentiment,Confidence,Model Used,Created Date,Created Time"
                )?;

                for record in &records {
                    writeln!(
                        file,
                        "{},{},{},{:.2}%,{},{},{}",
                        record.id,
                        csv_field(&record.text),
                        record.sentiment,
                        record.confidence * 100.0,
                        csv_field(&record.model_used),
                        record.created_at.format("%Y-%m-%d"),
                        record.created_at.format("%H:%M:%S"),
                    )?;
                }
            }
        }

        file.flush()?;
        info!(
            "Exported {} analyses to {:?} as {:?}",
            records.len(),
            output_path,
            format
        );
        Ok(records.len())
    }
}

/// Records in file order, skipping malformed lines
fn read_records(path: &Path) -> Result<Vec<AnalysisRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AnalysisRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                "Skipping malformed history line {} in {:?}: {}",
                line_no + 1,
                path,
                e
            ),
        }
    }
    Ok(records)
}
