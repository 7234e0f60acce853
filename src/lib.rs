//! # Data Sweeper
//!
//! Loads CSV and Excel (.xlsx) files into typed in-memory tables, cleans them and
//! converts them between the two formats.
//!
//! ## Pipeline
//!
//! Every file goes through the same fixed sequence:
//!
//! 1. **Load**: the format is taken from the file extension; the first row names the columns
//! 2. **Remove duplicates** (opt-in): keep the first of each set of identical rows
//! 3. **Fill missing** (opt-in): replace nulls in numeric columns with the column mean
//! 4. **Select columns**: keep a chosen ordered subset, all columns by default
//! 5. **Preview, chart or export**: show the head of each stage, extract up to two
//!    numeric series, or serialize to CSV or XLSX
//!
//! Files are independent: [`process_batch`] reports one outcome per file and a failing
//! file never stops the others.
//!
//! ```no_run
//! use data_sweeper::{export, load, CleaningOptions, ColumnSelection, FileFormat, TablePipeline};
//!
//! # fn main() -> Result<(), data_sweeper::SweeperError> {
//! let table = load(b"a,b\n1,\n1,\n,4\n", FileFormat::Csv)?;
//! let cleaning = CleaningOptions {
//!     remove_duplicates: true,
//!     fill_missing_with_mean: true,
//! };
//! let pipeline = TablePipeline::new(cleaning, ColumnSelection::Columns(vec!["b".to_owned()]));
//! let cleaned = pipeline.run(&table)?;
//! let bytes = export(&cleaned, FileFormat::Xlsx)?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub(crate) mod helpers;
pub mod logging;
pub mod pipeline;
pub mod spreadsheet;
pub mod table;

pub use crate::error::SweeperError;
pub use crate::pipeline::batch::process_batch;
pub use crate::pipeline::batch::process_upload;
pub use crate::pipeline::batch::FileOutcome;
pub use crate::pipeline::batch::FileReport;
pub use crate::pipeline::batch::FileRequest;
pub use crate::pipeline::batch::Upload;
pub use crate::pipeline::chart_data;
pub use crate::pipeline::CleaningOptions;
pub use crate::pipeline::ColumnSelection;
pub use crate::pipeline::Stage;
pub use crate::pipeline::TablePipeline;
pub use crate::spreadsheet::export;
pub use crate::spreadsheet::load;
pub use crate::spreadsheet::load_file;
pub use crate::spreadsheet::load_with;
pub use crate::spreadsheet::FileFormat;
pub use crate::spreadsheet::LoadOptions;
pub use crate::table::column::Column;
pub use crate::table::column::ColumnType;
pub use crate::table::value::Value;
pub use crate::table::Table;
