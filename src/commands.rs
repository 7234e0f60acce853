use crate::cli::Cli;
use crate::summary::print_report;
use crate::summary::print_summary;
use crate::summary::FileSummary;
use anyhow::Context;
use anyhow::Result;
use data_sweeper::config::SweepConfig;
use data_sweeper::pipeline::batch::process_upload;
use data_sweeper::pipeline::batch::FileReport;
use data_sweeper::pipeline::batch::Upload;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;
use tracing::info_span;
use tracing::warn;

/// Output directory used when neither the config nor the flags name one.
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Processes every input file and prints the results.
/// Returns whether at least one file failed.
pub fn run_sweep(cli: &Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::default(),
    };
    let config = cli.apply(config);
    let options = config.load_options().context("invalid input settings")?;
    let request = config.file_request().context("invalid export settings")?;
    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let paths = expand_inputs(&cli.inputs)?;
    let sweep_span = info_span!("sweep", files = paths.len());
    let _sweep_guard = sweep_span.enter();

    let mut summaries = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path.display().to_string();
        let outcome = fs::read(&path)
            .with_context(|| format!("read {name}"))
            .and_then(|bytes| {
                process_upload(&Upload::new(name.to_owned(), bytes), &request, &options).map_err(anyhow::Error::from)
            })
            .and_then(|report| {
                print_report(&report, request.preview_rows);
                let output = write_download(&report, &output_dir)?;
                Ok((report, output))
            });
        let summary = match outcome {
            Ok((report, output)) => FileSummary {
                name,
                rows: Some(report.table.num_rows()),
                columns: Some(report.table.num_columns()),
                output,
                error: None,
            },
            Err(error) => {
                warn!(file = %name, "{error:#}");
                FileSummary {
                    name,
                    rows: None,
                    columns: None,
                    output: None,
                    error: Some(format!("{error:#}")),
                }
            }
        };
        summaries.push(summary);
    }

    println!();
    print_summary(&summaries);
    let failed = summaries.iter().filter(|summary| summary.error.is_some()).count();
    info!(processed = summaries.len(), failed, "Sweep finished");
    Ok(failed > 0)
}

/// Expands glob patterns; plain paths are kept as given so a missing file
/// is reported for that file alone.
fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(input));
            continue;
        }
        let mut matched = false;
        for entry in glob::glob(input).with_context(|| format!("invalid pattern {input}"))? {
            match entry {
                Ok(path) if path.is_file() => {
                    paths.push(path);
                    matched = true;
                }
                Ok(_) => {}
                Err(error) => warn!(pattern = %input, "{error}"),
            }
        }
        if !matched {
            warn!(pattern = %input, "Pattern matched no files");
        }
    }
    Ok(paths)
}

fn write_download(report: &FileReport, output_dir: &Path) -> Result<Option<PathBuf>> {
    let Some(download) = &report.download else {
        return Ok(None);
    };
    let file_name = Path::new(&download.file_name)
        .file_name()
        .map(PathBuf::from)
        .with_context(|| format!("no file name in {}", download.file_name))?;
    fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))?;
    let path = output_dir.join(file_name);
    fs::write(&path, &download.bytes).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), mime_type = download.mime_type, bytes = download.bytes.len(), "Wrote download");
    Ok(Some(path))
}
