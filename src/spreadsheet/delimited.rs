use crate::error::SweeperError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::sheet::Extent;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::LoadOptions;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Table;
use encoding_rs::Encoding;
use std::borrow::Cow;
use tracing::debug;

/// Decodes raw bytes into text. A byte order mark overrides the configured encoding.
fn decode<'a>(file_name: &str, bytes: &'a [u8], encoding: &'static Encoding) -> Result<Cow<'a, str>, SweeperError> {
    let (encoding, bom_length) = Encoding::for_bom(bytes).unwrap_or((encoding, 0));
    let text = encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_length..])
        .ok_or_else(|| SpreadsheetError::UndecodableText {
            file: file_name.to_owned(),
            encoding: encoding.name().to_owned(),
        })?;
    Ok(text)
}

/// Reads comma-separated text into a sheet.
/// Row 0 holds the header; fields matching a null literal are left out.
pub(crate) fn read_sheet(file_name: &str, bytes: &[u8], options: &LoadOptions) -> Result<Sheet, SweeperError> {
    let text = decode(file_name, bytes, options.encoding)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| SpreadsheetError::EmptyFile(file_name.to_owned()))?;

    let mut sheet = Sheet::new("");
    let width = header.len();
    for (col, name) in header.iter().enumerate() {
        if !name.is_empty() {
            sheet.push(Cell {
                row: 0,
                col,
                kind: CellType::String,
                value: name.to_owned(),
            });
        }
    }

    let mut rows = 1;
    for record in records {
        let record = record?;
        if record.len() > width {
            return Err(SpreadsheetError::MalformedRow {
                file: file_name.to_owned(),
                line: record.position().map(|position| position.line()).unwrap_or(rows as u64 + 1),
                expected: width,
                found: record.len(),
            }.into());
        }
        for (col, field) in record.iter().enumerate() {
            if !options.null_values.contains(field) {
                sheet.push(Cell {
                    row: rows,
                    col,
                    kind: CellType::Raw,
                    value: field.to_owned(),
                });
            }
        }
        rows += 1;
    }

    sheet.extent = Some(Extent { rows, cols: width });
    debug!(file = file_name, rows = rows - 1, columns = width, "Read delimited text");
    Ok(sheet)
}

/// Writes the table as UTF-8 comma-separated text with a header row.
/// Missing cells are written as empty fields.
pub(crate) fn write_table(table: &Table) -> Result<Vec<u8>, SweeperError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    if table.num_columns() == 0 {
        return Ok(Vec::new());
    }

    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    let bytes = writer.into_inner().map_err(|error| error.into_error())?;
    Ok(bytes)
}
