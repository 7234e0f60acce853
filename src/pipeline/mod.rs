//! # Cleaning Pipeline
//!
//! The fixed sequence applied to every loaded table:
//! load → remove duplicates → fill missing numbers → select columns → preview, chart or export.
//! Duplicate removal and filling are opt-in; column selection always runs and defaults to all columns.

pub mod batch;
pub mod chart;
pub mod stages;

use crate::error::SweeperError;
use crate::spreadsheet::FileFormat;
use crate::table::Table;
pub use chart::chart_data;
pub use chart::ChartData;
use serde::Deserialize;
use serde::Serialize;
pub use stages::fill_missing_numeric;
pub use stages::remove_duplicate_rows;
pub use stages::select_columns;
pub use stages::ColumnSelection;
use std::fmt::Display;
use tracing::info;

/// Opt-in cleaning steps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    pub remove_duplicates: bool,
    pub fill_missing_with_mean: bool,
}

/// Points in the pipeline where the intermediate table can be observed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Deduplicated,
    Filled,
    Selected,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Loaded => "loaded",
            Stage::Deduplicated => "duplicates removed",
            Stage::Filled => "missing values filled",
            Stage::Selected => "columns selected",
        })
    }
}

/// Cleaning options plus column selection for one table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TablePipeline {
    pub cleaning: CleaningOptions,
    pub selection: ColumnSelection,
}

impl TablePipeline {
    pub fn new(cleaning: CleaningOptions, selection: ColumnSelection) -> Self {
        Self { cleaning, selection }
    }

    /// Runs the pipeline on a loaded table.
    pub fn run(&self, table: &Table) -> Result<Table, SweeperError> {
        self.run_inspect(table, |_, _| ())
    }

    /// Runs the pipeline, handing each intermediate table to `inspect`.
    /// Skipped steps are not reported.
    pub fn run_inspect<F>(&self, table: &Table, mut inspect: F) -> Result<Table, SweeperError>
    where
        F: FnMut(Stage, &Table),
    {
        inspect(Stage::Loaded, table);

        let mut current = None::<Table>;
        if self.cleaning.remove_duplicates {
            let deduplicated = remove_duplicate_rows(table);
            info!(rows_before = table.num_rows(), rows_after = deduplicated.num_rows(), "Removed duplicate rows");
            inspect(Stage::Deduplicated, &deduplicated);
            current = Some(deduplicated);
        }
        if self.cleaning.fill_missing_with_mean {
            let source = current.as_ref().unwrap_or(table);
            let missing_before = count_missing(source);
            let filled = fill_missing_numeric(source);
            info!(missing_before, missing_after = count_missing(&filled), "Filled missing numeric values");
            inspect(Stage::Filled, &filled);
            current = Some(filled);
        }

        let selected = select_columns(current.as_ref().unwrap_or(table), &self.selection)?;
        info!(columns = selected.num_columns(), rows = selected.num_rows(), "Selected columns");
        inspect(Stage::Selected, &selected);
        Ok(selected)
    }

    /// Runs the pipeline and serializes the result.
    pub fn run_and_export(&self, table: &Table, format: FileFormat) -> Result<(Table, Vec<u8>), SweeperError> {
        let result = self.run(table)?;
        let bytes = crate::spreadsheet::export(&result, format)?;
        Ok((result, bytes))
    }
}

fn count_missing(table: &Table) -> usize {
    table.columns().iter().map(|column| column.null_count()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::load;
    use crate::table::value::Value;

    #[test]
    fn stages_run_in_order() {
        let table = load(b"a,b\n1,\n1,\n,4\n", FileFormat::Csv).unwrap();
        let pipeline = TablePipeline::new(
            CleaningOptions {
                remove_duplicates: true,
                fill_missing_with_mean: true,
            },
            ColumnSelection::Columns(vec!["b".to_owned()]),
        );

        let mut stages = Vec::new();
        let result = pipeline.run_inspect(&table, |stage, table| stages.push((stage, table.num_rows()))).unwrap();
        assert_eq!(stages, vec![
            (Stage::Loaded, 3),
            (Stage::Deduplicated, 2),
            (Stage::Filled, 2),
            (Stage::Selected, 2),
        ]);
        assert_eq!(result.column_names(), vec!["b"]);
        assert_eq!(result.column("b").unwrap().values, vec![Value::Float(4.0), Value::Float(4.0)]);
    }

    #[test]
    fn default_pipeline_only_selects() {
        let table = load(b"a\n1\n1\n", FileFormat::Csv).unwrap();
        let mut stages = Vec::new();
        let result = TablePipeline::default().run_inspect(&table, |stage, _| stages.push(stage)).unwrap();
        assert_eq!(stages, vec![Stage::Loaded, Stage::Selected]);
        assert_eq!(result, table);
    }

    #[test]
    fn unknown_column_stops_the_pipeline() {
        let table = load(b"a\n1\n", FileFormat::Csv).unwrap();
        let pipeline = TablePipeline::new(CleaningOptions::default(), ColumnSelection::Columns(vec!["x".to_owned()]));
        assert!(matches!(pipeline.run(&table), Err(SweeperError::UnknownColumn(_))));
    }

    #[test]
    fn export_after_run() {
        let table = load(b"col1,col2\n1,x\n2,y\n", FileFormat::Csv).unwrap();
        let (_, bytes) = TablePipeline::default().run_and_export(&table, FileFormat::Csv).unwrap();
        assert_eq!(bytes, b"col1,col2\n1,x\n2,y\n");
    }
}
