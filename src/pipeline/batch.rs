//! Per-file processing of uploads: every file is loaded, cleaned and exported on its own,
//! so one broken or unsupported file never stops the others.

use crate::error::SweeperError;
use crate::pipeline::chart_data;
use crate::pipeline::ChartData;
use crate::pipeline::CleaningOptions;
use crate::pipeline::ColumnSelection;
use crate::pipeline::Stage;
use crate::pipeline::TablePipeline;
use crate::spreadsheet::export;
use crate::spreadsheet::load_file;
use crate::spreadsheet::FileFormat;
use crate::spreadsheet::LoadOptions;
use crate::table::Table;
use tracing::info;
use tracing::info_span;
use tracing::warn;

/// A named byte buffer supplied by the uploader.
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// What to do with one uploaded file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileRequest {
    pub cleaning: CleaningOptions,
    pub selection: ColumnSelection,
    /// Target format of the download; `None` only previews
    pub export: Option<FileFormat>,
    /// Rows kept in each preview
    pub preview_rows: usize,
    /// Whether to extract chart data from the result
    pub chart: bool,
}

impl Default for FileRequest {
    fn default() -> Self {
        Self {
            cleaning: CleaningOptions::default(),
            selection: ColumnSelection::default(),
            export: None,
            preview_rows: 5,
            chart: false,
        }
    }
}

/// Exported bytes with the name and media type to offer them under.
#[derive(Clone, Debug, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Everything produced for one file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileReport {
    pub name: String,
    pub size_bytes: usize,
    /// Head of the table after each step that ran, in pipeline order
    pub previews: Vec<(Stage, Table)>,
    /// The cleaned and projected table
    pub table: Table,
    pub chart: Option<ChartData>,
    pub download: Option<Download>,
}

/// Outcome of one file of a batch.
pub type FileOutcome = (String, Result<FileReport, SweeperError>);

/// Suggested download name: the original name with its extension replaced.
pub fn download_name(original: &str, format: FileFormat) -> String {
    let base_start = original.rfind(['/', '\\']).map(|index| index + 1).unwrap_or(0);
    let stem = match original[base_start..].rfind('.') {
        Some(dot) if dot > 0 => &original[..base_start + dot],
        _ => original,
    };
    format!("{stem}.{}", format.extension())
}

/// Loads, cleans, previews and optionally exports a single upload.
pub fn process_upload(upload: &Upload, request: &FileRequest, options: &LoadOptions) -> Result<FileReport, SweeperError> {
    let span = info_span!("file", name = %upload.name, size = upload.bytes.len());
    let _guard = span.enter();

    let loaded = load_file(&upload.name, &upload.bytes, options)?;
    info!(rows = loaded.num_rows(), columns = loaded.num_columns(), "Loaded file");

    let pipeline = TablePipeline::new(request.cleaning, request.selection.clone());
    let mut previews = Vec::new();
    let table = pipeline.run_inspect(&loaded, |stage, table| previews.push((stage, table.head(request.preview_rows))))?;

    let chart = if request.chart { chart_data(&table) } else { None };
    let download = match request.export {
        Some(format) => {
            let bytes = export(&table, format)?;
            let file_name = download_name(&upload.name, format);
            info!(file_name = %file_name, bytes = bytes.len(), "Exported file");
            Some(Download {
                file_name,
                mime_type: format.mime_type(),
                bytes,
            })
        }
        None => None,
    };

    Ok(FileReport {
        name: upload.name.to_owned(),
        size_bytes: upload.bytes.len(),
        previews,
        table,
        chart,
        download,
    })
}

/// Processes every upload with its own request. Failures are returned per file
/// and never abort the remaining files.
pub fn process_batch<I>(items: I, options: &LoadOptions) -> Vec<FileOutcome>
where
    I: IntoIterator<Item = (Upload, FileRequest)>,
{
    items
        .into_iter()
        .map(|(upload, request)| {
            let result = process_upload(&upload, &request, options);
            if let Err(error) = &result {
                warn!(file = %upload.name, "{error}");
            }
            (upload.name, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_names() {
        assert_eq!(download_name("report.CSV", FileFormat::Xlsx), "report.xlsx");
        assert_eq!(download_name("a.b.xlsx", FileFormat::Csv), "a.b.csv");
        assert_eq!(download_name("data", FileFormat::Csv), "data.csv");
        assert_eq!(download_name(".hidden", FileFormat::Csv), ".hidden.csv");
        assert_eq!(download_name("dir.v2/data", FileFormat::Xlsx), "dir.v2/data.xlsx");
    }

    #[test]
    fn report_carries_previews_chart_and_download() {
        let upload = Upload::new("scores.csv", "name,score\nx,1\ny,\nx,1\n");
        let request = FileRequest {
            cleaning: CleaningOptions {
                remove_duplicates: true,
                fill_missing_with_mean: true,
            },
            export: Some(FileFormat::Csv),
            preview_rows: 1,
            chart: true,
            ..FileRequest::default()
        };

        let report = process_upload(&upload, &request, &LoadOptions::default()).unwrap();
        assert_eq!(report.size_bytes, upload.bytes.len());
        assert_eq!(report.previews.len(), 4);
        assert!(report.previews.iter().all(|(_, preview)| preview.num_rows() == 1));
        assert_eq!(report.table.num_rows(), 2);
        assert_eq!(report.chart.unwrap().series[0].points, vec![Some(1.0), Some(1.0)]);

        let download = report.download.unwrap();
        assert_eq!(download.file_name, "scores.csv");
        assert_eq!(download.mime_type, "text/csv");
        assert_eq!(download.bytes, b"name,score\nx,1.0\ny,1.0\n");
    }

    #[test]
    fn failures_stay_with_their_file() {
        let outcomes = process_batch(
            vec![
                (Upload::new("report.pdf", "%PDF"), FileRequest::default()),
                (Upload::new("ok.csv", "a\n1\n"), FileRequest::default()),
            ],
            &LoadOptions::default(),
        );
        assert_eq!(outcomes.len(), 2);
        let error = outcomes[0].1.as_ref().unwrap_err();
        assert!(matches!(error, SweeperError::UnsupportedFormat(extension) if extension == "pdf"));
        assert_eq!(outcomes[1].1.as_ref().unwrap().table.num_rows(), 1);
    }
}
