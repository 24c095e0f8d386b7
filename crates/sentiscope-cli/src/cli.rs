use clap::{Parser, Subcommand};
use sentiscope_core::{SentimentLabel, Variant};
use sentiscope_jobs::ExportFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sentiscope")]
#[command(author, version, about = "Keyword sentiment analysis with bulk CSV jobs")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "sentiscope.yaml", env = "SENTISCOPE_CONFIG")]
    pub config: String,

    /// Directory for job summaries, reports and history
    #[arg(long, env = "SENTISCOPE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a single text
    Analyze {
        /// Text to classify
        text: String,

        /// Model variant: fast or accurate
        #[arg(long, value_parser = parse_variant)]
        variant: Option<Variant>,

        /// Do not store the result in history
        #[arg(long)]
        no_save: bool,
    },

    /// Classify one column of an uploaded CSV file as a batch job
    Bulk {
        /// CSV file to classify
        file: PathBuf,

        /// Header of the column holding the texts
        #[arg(long)]
        column: Option<String>,

        /// Model variant: fast or accurate
        #[arg(long, value_parser = parse_variant)]
        variant: Option<Variant>,

        /// Maximum rows to classify (1-1000)
        #[arg(long)]
        max_items: Option<usize>,

        /// Rows per chunk (at least 1)
        #[arg(long, value_parser = parse_chunk_size)]
        chunk_size: Option<usize>,
    },

    /// Inspect and delete batch jobs
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Browse, export and delete single-analysis history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Aggregate statistics over stored analyses and jobs
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// List batch jobs, newest first
    List,

    /// Show a job and the first rows of its detail report
    Show {
        id: u64,

        /// Number of detail rows to show
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Delete a job and its detail report
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// Show one page of history
    List {
        #[command(flatten)]
        filter: HistoryFilter,

        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Export matching history to a file
    Export {
        #[command(flatten)]
        filter: HistoryFilter,

        /// Export format: csv or json
        #[arg(long, default_value = "csv", value_parser = parse_format)]
        format: ExportFormat,

        /// Output path (defaults to a timestamped file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete one stored analysis
    Delete { id: u64 },
}

#[derive(clap::Args, Debug, Default)]
pub struct HistoryFilter {
    /// Only this sentiment (positive, negative, neutral or all)
    #[arg(long, value_parser = parse_sentiment_filter)]
    pub sentiment: Option<SentimentFilter>,

    /// Case-insensitive text search
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentFilter {
    All,
    Only(SentimentLabel),
}

fn parse_variant(s: &str) -> Result<Variant, String> {
    s.parse()
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse()
}

fn parse_chunk_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("chunk size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_sentiment_filter(s: &str) -> Result<SentimentFilter, String> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(SentimentFilter::All);
    }
    s.parse().map(SentimentFilter::Only)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "sentiscope",
            "analyze",
            "great stuff",
            "--variant",
            "deep_learning",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                text,
                variant,
                no_save,
            } => {
                assert_eq!(text, "great stuff");
                assert_eq!(variant, Some(Variant::Accurate));
                assert!(!no_save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_bulk() {
        let cli = Cli::try_parse_from([
            "sentiscope",
            "--data-dir",
            "/tmp/data",
            "bulk",
            "reviews.csv",
            "--column",
            "body",
            "--max-items",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/data")));
        match cli.command {
            Commands::Bulk {
                file,
                column,
                max_items,
                ..
            } => {
                assert_eq!(file, PathBuf::from("reviews.csv"));
                assert_eq!(column.as_deref(), Some("body"));
                assert_eq!(max_items, Some(10));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_history_filter() {
        let cli = Cli::try_parse_from([
            "sentiscope",
            "history",
            "export",
            "--sentiment",
            "Negative",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::History {
                command: HistoryCommands::Export { filter, format, output },
            } => {
                assert_eq!(
                    filter.sentiment,
                    Some(SentimentFilter::Only(SentimentLabel::Negative))
                );
                assert_eq!(format, ExportFormat::Json);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(Cli::try_parse_from(["sentiscope", "analyze", "x", "--variant", "bert"]).is_err());
        assert!(
            Cli::try_parse_from(["sentiscope", "history", "list", "--sentiment", "angry"]).is_err()
        );
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let parse = |size: &str| {
            Cli::try_parse_from(["sentiscope", "bulk", "reviews.csv", "--chunk-size", size])
        };
        assert!(parse("0").is_err());
        assert!(parse("-3").is_err());

        match parse("25").unwrap().command {
            Commands::Bulk { chunk_size, .. } => assert_eq!(chunk_size, Some(25)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
