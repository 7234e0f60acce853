//! CLI argument definitions for the data sweeper.

use clap::Parser;
use clap::ValueEnum;
use clap_verbosity_flag::Verbosity;
use clap_verbosity_flag::WarnLevel;
use data_sweeper::config::SweepConfig;
use data_sweeper::pipeline::ColumnSelection;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "data-sweeper",
    version,
    about = "Preview, clean and convert CSV and Excel files",
    long_about = "Load CSV and XLSX files, optionally remove duplicate rows and fill missing\n\
                  numeric values with the column mean, keep a chosen set of columns, and\n\
                  export the result as CSV or XLSX. Each file is processed on its own."
)]
pub struct Cli {
    /// Files or glob patterns to process (.csv, .xlsx).
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<String>,

    /// TOML file with default settings; flags override it.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remove duplicate rows, keeping the first occurrence.
    #[arg(long = "dedup")]
    pub dedup: bool,

    /// Fill missing numeric cells with the column mean.
    #[arg(long = "fill-mean")]
    pub fill_mean: bool,

    /// Comma-separated columns to keep, in output order.
    #[arg(long = "columns", value_name = "NAMES")]
    pub columns: Option<String>,

    /// Export format: csv, xlsx or excel.
    #[arg(long = "to", value_name = "FORMAT")]
    pub to: Option<String>,

    /// Directory for exported files (default: ./output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of rows shown in each preview; 0 disables previews.
    #[arg(long = "preview", value_name = "ROWS")]
    pub preview: Option<usize>,

    /// Print chart data for the first two numeric columns.
    #[arg(long = "chart")]
    pub chart: bool,

    /// Text encoding of CSV input when it has no byte order mark.
    #[arg(long = "encoding", value_name = "LABEL", conflicts_with = "codepage")]
    pub encoding: Option<String>,

    /// Windows code page of CSV input, e.g. 1252.
    #[arg(long = "codepage", value_name = "NUMBER")]
    pub codepage: Option<u16>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl Cli {
    /// Applies command-line flags on top of the file configuration.
    pub fn apply(&self, mut config: SweepConfig) -> SweepConfig {
        if self.dedup {
            config.cleaning.remove_duplicates = true;
        }
        if self.fill_mean {
            config.cleaning.fill_missing_with_mean = true;
        }
        if let Some(columns) = &self.columns {
            config.columns = match ColumnSelection::parse_list(columns) {
                ColumnSelection::All => Vec::new(),
                ColumnSelection::Columns(names) => names,
            };
        }
        if let Some(to) = &self.to {
            config.export = Some(to.to_owned());
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = Some(output_dir.to_owned());
        }
        if let Some(preview) = self.preview {
            config.preview_rows = preview;
        }
        if self.chart {
            config.chart = true;
        }
        if let Some(encoding) = &self.encoding {
            config.input.encoding = Some(encoding.to_owned());
            config.input.codepage = None;
        }
        if let Some(codepage) = self.codepage {
            config.input.codepage = Some(codepage);
        }
        config
    }
}
