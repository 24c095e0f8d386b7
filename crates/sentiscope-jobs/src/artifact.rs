//! Per-row detail artifact for a batch job
//!
//! One CSV row per input row with columns `id,text,sentiment,confidence,model`,
//! plus an `error` column when any row failed.

use crate::tabular::parse_csv;
use sentiscope_core::{BatchItemResult, Error, ItemLabel, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column headers without the optional `error` column
pub const DETAIL_COLUMNS: [&str; 5] = ["id", "text", "sentiment", "confidence", "model"];

/// Write the detail artifact for `results` to `path`
pub fn write_detail_csv(path: &Path, results: &[BatchItemResult]) -> Result<()> {
    let with_errors = results.iter().any(|r| r.error_message.is_some());
    let mut writer = BufWriter::new(File::create(path)?);

    let mut header = DETAIL_COLUMNS.join(",");
    if with_errors {
        header.push_str(",error");
    }
    writeln!(writer, "{header}")?;

    for item in results {
        write!(
            writer,
            "{},{},{},{},{}",
            item.index,
            csv_field(&item.text_preview),
            item.label,
            item.confidence,
            csv_field(&item.model_name)
        )?;
        if with_errors {
            write!(
                writer,
                ",{}",
                csv_field(item.error_message.as_deref().unwrap_or(""))
            )?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// One row read back from a detail artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub id: usize,
    pub text: String,
    pub sentiment: ItemLabel,
    pub confidence: f64,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read up to `limit` rows of a detail artifact
pub fn read_detail_csv(path: &Path, limit: usize) -> Result<Vec<DetailRow>> {
    let content = std::fs::read_to_string(path)?;
    let table = parse_csv(&content)?;

    let column = |name: &str| {
        table
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::input(format!("Detail artifact is missing column \"{name}\"")))
    };
    let id_col = column("id")?;
    let text_col = column("text")?;
    let sentiment_col = column("sentiment")?;
    let confidence_col = column("confidence")?;
    let model_col = column("model")?;
    let error_col = column("error").ok();

    table
        .rows
        .iter()
        .take(limit)
        .map(|row| {
            let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
            Ok(DetailRow {
                id: cell(id_col)
                    .parse()
                    .map_err(|e| Error::input(format!("Bad id in detail artifact: {e}")))?,
                text: cell(text_col).to_string(),
                sentiment: cell(sentiment_col).parse().map_err(Error::input)?,
                confidence: cell(confidence_col)
                    .parse()
                    .map_err(|e| Error::input(format!("Bad confidence in detail artifact: {e}")))?,
                model: cell(model_col).to_string(),
                error: error_col
                    .map(cell)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Quote a CSV field when it contains a delimiter, quote or line break
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
