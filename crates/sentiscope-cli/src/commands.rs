//! Subcommand handlers

use crate::cli::{Commands, HistoryCommands, HistoryFilter, JobCommands, SentimentFilter};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use sentiscope_classifiers::{BatchRunner, KeywordClassifier};
use sentiscope_core::Variant;
use sentiscope_jobs::{
    export_file_name, BatchJobService, BatchJobSummary, DetailRow, HistoryQuery, HistoryStats,
    HistoryStore, JobStatus, JobStore, UploadRequest,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Run one subcommand against the configured data directory
pub fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Analyze {
            text,
            variant,
            no_save,
        } => {
            let variant = variant.unwrap_or(config.classifier.default_variant);
            analyze(config, &text, variant, no_save)
        }

        Commands::Bulk {
            file,
            column,
            variant,
            max_items,
            chunk_size,
        } => {
            let request = UploadRequest {
                source: &file,
                text_column: column.as_deref().unwrap_or(&config.text_column),
                variant: variant.unwrap_or(config.classifier.default_variant),
                max_items: max_items.unwrap_or(config.classifier.max_items),
            };
            bulk(config, &request, chunk_size.unwrap_or(config.classifier.chunk_size))
        }

        Commands::Jobs { command } => jobs(config, command),
        Commands::History { command } => history(config, command),
        Commands::Stats => stats(config),
    }
}

fn analyze(config: &AppConfig, text: &str, variant: Variant, no_save: bool) -> Result<()> {
    let classifier = KeywordClassifier::with_lexicon("keyword", &config.classifier.lexicon)
        .context("Failed to build classifier from configured lexicon")?;
    let result = classifier.analyze(text, variant);

    if !no_save {
        let record = history_store(config)?.record(&result)?;
        info!(id = record.id, "Analysis saved to history");
    }

    print_json(&result)
}

fn bulk(config: &AppConfig, request: &UploadRequest<'_>, chunk_size: usize) -> Result<()> {
    let job = run_bulk(config, request, chunk_size)?;
    print_json(&job)
}

/// Run the upload; stdout is left to the caller
fn run_bulk(
    config: &AppConfig,
    request: &UploadRequest<'_>,
    chunk_size: usize,
) -> Result<BatchJobSummary> {
    let service = job_service(config, chunk_size)?;
    let job = service
        .run_upload(request)
        .with_context(|| format!("Error processing file {}", request.source.display()))?;

    info!(
        job_id = job.id,
        items = job.total_items,
        "Successfully analyzed {} reviews",
        job.total_items
    );
    Ok(job)
}

fn jobs(config: &AppConfig, command: JobCommands) -> Result<()> {
    let service = job_service(config, config.classifier.chunk_size)?;

    match command {
        JobCommands::List => {
            let jobs = service.store().list()?;
            if jobs.is_empty() {
                println!("No batch jobs");
            }
            for job in &jobs {
                print_job_line(job);
            }
            Ok(())
        }
        JobCommands::Show { id, limit } => {
            let (job, rows) = service.detail(id, limit)?;
            #[derive(Serialize)]
            struct JobDetail<'a> {
                job: &'a BatchJobSummary,
                results: &'a [DetailRow],
            }
            print_json(&JobDetail {
                job: &job,
                results: &rows,
            })
        }
        JobCommands::Delete { id } => {
            service.delete(id)?;
            println!("Batch job {id} deleted");
            Ok(())
        }
    }
}

fn history(config: &AppConfig, command: HistoryCommands) -> Result<()> {
    let store = history_store(config)?;

    match command {
        HistoryCommands::List { filter, page } => {
            let page = store.page(&to_query(&filter), page, config.history.page_size)?;
            print_json(&page)
        }
        HistoryCommands::Export {
            filter,
            format,
            output,
        } => {
            let output = output
                .unwrap_or_else(|| export_file_name(format, chrono::Utc::now()).into());
            let count = store.export_to_file(&to_query(&filter), &output, format)?;
            println!("Exported {count} analyses to {}", output.display());
            Ok(())
        }
        HistoryCommands::Delete { id } => {
            store.delete(id)?;
            println!("Analysis {id} deleted");
            Ok(())
        }
    }
}

fn stats(config: &AppConfig) -> Result<()> {
    let history = history_store(config)?.stats()?;
    let jobs = open_job_store(&config.data_dir)?.list()?;

    #[derive(Serialize)]
    struct JobTotals {
        total: usize,
        completed: usize,
        failed: usize,
        items: usize,
    }

    #[derive(Serialize)]
    struct Stats {
        #[serde(flatten)]
        history: HistoryStats,
        batch_jobs: JobTotals,
    }

    let count = |status: JobStatus| jobs.iter().filter(|j| j.status == status).count();
    print_json(&Stats {
        history,
        batch_jobs: JobTotals {
            total: jobs.len(),
            completed: count(JobStatus::Completed),
            failed: count(JobStatus::Failed),
            items: jobs.iter().map(|j| j.total_items).sum(),
        },
    })
}

fn job_service(
    config: &AppConfig,
    chunk_size: usize,
) -> Result<BatchJobService<KeywordClassifier>> {
    let classifier = KeywordClassifier::with_lexicon("keyword", &config.classifier.lexicon)
        .context("Failed to build classifier from configured lexicon")?;
    let store = open_job_store(&config.data_dir)?;
    Ok(BatchJobService::new(
        BatchRunner::new(classifier).with_chunk_size(chunk_size),
        store,
    ))
}

fn open_job_store(data_dir: &Path) -> Result<JobStore> {
    JobStore::open(data_dir)
        .with_context(|| format!("Failed to open job store in {}", data_dir.display()))
}

fn history_store(config: &AppConfig) -> Result<HistoryStore> {
    Ok(HistoryStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open history in {}", config.data_dir.display()))?
        .with_stored_text_limit(config.history.stored_text_limit))
}

fn to_query(filter: &HistoryFilter) -> HistoryQuery {
    let mut query = HistoryQuery::new();
    if let Some(SentimentFilter::Only(sentiment)) = filter.sentiment {
        query = query.sentiment(sentiment);
    }
    if let Some(ref search) = filter.search {
        query = query.search(search.as_str());
    }
    query
}

fn print_job_line(job: &BatchJobSummary) {
    println!(
        "{:>5}  {:<10}  {:<24}  items={:<4} +{} -{} ={}  avg={:.2}  {}",
        job.id,
        job.status.as_str(),
        job.source_name,
        job.total_items,
        job.positive_count,
        job.negative_count,
        job.neutral_count,
        job.average_confidence,
        job.created_at.format("%Y-%m-%d %H:%M:%S"),
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bulk_output_is_one_json_document() {
        let temp_dir = TempDir::new().unwrap();
        let upload = temp_dir.path().join("reviews.csv");
        std::fs::write(&upload, "reviewText\ngreat\nawful\n").unwrap();

        let config = AppConfig {
            data_dir: temp_dir.path().join("data"),
            ..AppConfig::default()
        };
        let request = UploadRequest {
            source: &upload,
            text_column: &config.text_column,
            variant: Variant::Fast,
            max_items: 10,
        };

        let job = run_bulk(&config, &request, 50).unwrap();
        let output = render_json(&job).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["status"], "completed");
        assert_eq!(parsed["total_items"], 2);
        assert_eq!(parsed["positive_count"], 1);
    }
}
