//! # Spreadsheet Formats
//!
//! Reading and writing of the two supported tabular formats, comma-separated text
//! and Office Open XML workbooks (.xlsx). Both readers produce a sparse [`Sheet`]
//! which is turned into a typed [`Table`]: the first grid row names the columns and
//! each column's type is inferred from its cells.

pub(crate) mod cell;
pub(crate) mod delimited;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;
pub(crate) mod xlsx_writer;

use crate::error::ResultMessage;
use crate::error::SweeperError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use crate::table::column::Column;
use crate::table::column::ColumnType;
use crate::table::Table;
use encoding_rs::Encoding;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Errors raised while parsing input that claims a supported format.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("File '{0}' is empty")]
    EmptyFile(String),

    #[error("File '{file}' line {line}: expected {expected} fields, saw {found}")]
    MalformedRow {
        file: String,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("File '{file}' is not valid {encoding} text")]
    UndecodableText { file: String, encoding: String },

    #[error("Unknown text encoding '{0}'")]
    UnknownEncoding(String),

    #[error("Workbook '{0}' is encrypted or in the legacy binary format")]
    EncryptedWorkbook(String),

    #[error("Workbook '{0}' has no worksheet")]
    NoWorksheet(String),

    #[error("Workbook part '{0}' is missing")]
    MissingPart(String),

    #[error("Invalid cell value at '{0}': {1}")]
    CellValueError(String, String),

    #[error("Invalid date serial '{0}'")]
    InvalidDate(String),
}

/// Tabular file formats accepted for loading and export.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Resolves a format from a file extension (case-insensitive, without the dot).
    pub fn from_extension(extension: &str) -> Result<Self, SweeperError> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            _ => Err(SweeperError::UnsupportedFormat(extension.to_owned())),
        }
    }

    /// Resolves a format from the extension of a file name.
    /// A name without an extension is unsupported.
    pub fn from_file_name(file_name: &str) -> Result<Self, SweeperError> {
        let base_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
        match base_name.rsplit_once('.') {
            Some((_, extension)) => Self::from_extension(extension),
            None => Err(SweeperError::UnsupportedFormat(base_name.to_owned())),
        }
    }

    /// File extension written for this format, without the dot.
    pub const fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for FileFormat {
    type Err = SweeperError;

    /// Parses an export tag: a file extension or one of the labels `CSV` and `Excel`.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "excel" => Ok(FileFormat::Xlsx),
            _ => Self::from_extension(tag.trim()),
        }
    }
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Strings read as missing cells in delimited text.
pub const DEFAULT_NULL_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Options controlling how delimited text is decoded and which fields count as missing.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Field contents treated as missing; matched exactly
    pub null_values: HashSet<String>,
    /// Text encoding used when the input carries no byte order mark
    pub encoding: &'static Encoding,
}

impl LoadOptions {
    /// Looks up an encoding by WHATWG label, e.g. `utf-8`, `latin1`, `shift_jis`.
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self, SweeperError> {
        self.encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| SpreadsheetError::UnknownEncoding(label.to_owned()))?;
        Ok(self)
    }

    /// Looks up an encoding by Windows code page number, e.g. 1252 or 936.
    pub fn with_codepage(mut self, codepage: u16) -> Result<Self, SweeperError> {
        self.encoding = codepage::to_encoding(codepage)
            .ok_or_else(|| SpreadsheetError::UnknownEncoding(format!("code page {codepage}")))?;
        Ok(self)
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            null_values: DEFAULT_NULL_VALUES.iter().map(|value| value.to_string()).collect(),
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// Parses raw bytes of the declared format into a table, with default options.
pub fn load(bytes: &[u8], format: FileFormat) -> Result<Table, SweeperError> {
    load_with(bytes, format, &LoadOptions::default())
}

/// Parses raw bytes of the declared format into a table.
pub fn load_with(bytes: &[u8], format: FileFormat, options: &LoadOptions) -> Result<Table, SweeperError> {
    load_named(&format!("<{format}>"), bytes, format, options)
}

/// Parses an uploaded file, deriving its format from the file name.
/// Unsupported extensions fail before any byte is parsed.
pub fn load_file(file_name: &str, bytes: &[u8], options: &LoadOptions) -> Result<Table, SweeperError> {
    let format = FileFormat::from_file_name(file_name)?;
    load_named(file_name, bytes, format, options)
}

fn load_named(file_name: &str, bytes: &[u8], format: FileFormat, options: &LoadOptions) -> Result<Table, SweeperError> {
    let sheet = match format {
        FileFormat::Csv => delimited::read_sheet(file_name, bytes, options)?,
        FileFormat::Xlsx => XlsxWorkbook::open(file_name, bytes)?.read_first_sheet()?,
    };
    let context = match sheet.name.as_str() {
        "" => file_name.to_owned(),
        sheet_name => format!("{file_name} [{sheet_name}]"),
    };
    let table = sheet_to_table(&sheet).with_prefix(&context)?;
    debug!(file = file_name, %format, rows = table.num_rows(), columns = table.num_columns(), "Loaded table");
    Ok(table)
}

/// Serializes a table to the bytes of the target format.
pub fn export(table: &Table, format: FileFormat) -> Result<Vec<u8>, SweeperError> {
    match format {
        FileFormat::Csv => delimited::write_table(table),
        FileFormat::Xlsx => xlsx_writer::write_table(table),
    }
}

/// Builds a typed table from a sheet: the first grid row is the header.
pub(crate) fn sheet_to_table(sheet: &Sheet) -> Result<Table, SweeperError> {
    if sheet.is_empty() {
        return Ok(Table::default());
    }
    let grid = sheet.grid();
    let Some((header, records)) = grid.split_first() else {
        return Ok(Table::default());
    };

    let names = normalize_header(header);
    let mut columns = Vec::with_capacity(names.len());
    for (col, name) in names.into_iter().enumerate() {
        let cells: Vec<Option<&Cell>> = records.iter().map(|record| record.get(col).copied().flatten()).collect();
        let kind = ColumnType::detect(cells.iter().map(|cell| cell.and_then(Cell::candidate_type)));
        let values = cells
            .iter()
            .map(|cell| match cell {
                Some(cell) => cell.to_value(kind),
                None => Ok(Default::default()),
            })
            .collect::<Result<Vec<_>, SweeperError>>()?;
        columns.push(Column::new(name, kind, values));
    }
    Ok(Table::new(columns)?)
}

/// Column names from the header row. Blank cells become `Unnamed: <index>`;
/// repeated names get `.1`, `.2`, ... suffixes in order of appearance.
fn normalize_header(header: &[Option<&Cell>]) -> Vec<String> {
    let mut counts = HashMap::<String, usize>::new();
    let mut names = Vec::with_capacity(header.len());
    for (index, cell) in header.iter().enumerate() {
        let mut name = cell
            .map(|cell| cell.to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Unnamed: {index}"));
        let mut count = counts.get(&name).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(name.to_owned(), count + 1);
            name = format!("{name}.{count}");
            count = counts.get(&name).copied().unwrap_or(0);
        }
        counts.insert(name.to_owned(), count + 1);
        names.push(name);
    }
    names
}
