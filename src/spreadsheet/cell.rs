use crate::error::SweeperError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use crate::table::column::ColumnType;
use crate::table::value::Value;
use chrono::Duration;
use chrono::NaiveDate;
use std::fmt::Display;

/// Types of cell data read from a source file.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Untyped text from a delimited file; its type is inferred from the content
    Raw,
    /// Boolean values stored as 1/0
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Typed string values (inline or shared)
    String,
    /// Error values such as `#DIV/0!`
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// Represents a single cell in a source sheet with position, type, and value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as string
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Column type this cell alone would suggest; `None` for missing cells.
    pub(crate) fn candidate_type(&self) -> Option<ColumnType> {
        match self.kind {
            CellType::Empty | CellType::Error => None,
            CellType::Boolean => Some(ColumnType::Boolean),
            CellType::Number if ColumnType::is_integer(&self.value) && self.value.parse::<i64>().is_ok() => {
                Some(ColumnType::Integer)
            }
            CellType::Number => Some(ColumnType::Float),
            CellType::Raw => Some(infer_raw_type(&self.value)),
            _ => Some(ColumnType::Text),
        }
    }

    /// Converts the cell into a value of the column's detected type.
    pub(crate) fn to_value(&self, kind: ColumnType) -> Result<Value, SweeperError> {
        let mapper = |message: String| SpreadsheetError::CellValueError(self.reference(), message);
        let value = match (kind, self.kind) {
            (_, CellType::Empty | CellType::Error) | (ColumnType::Null, _) => Value::Null,
            (ColumnType::Text, _) => Value::Text(self.to_string()),
            (ColumnType::Boolean, _) => Value::Boolean(self.to_boolean()),
            (ColumnType::Integer, _) => Value::Integer(self.to_bigint().map_err(mapper)?),
            (ColumnType::Float, _) => Value::Float(self.to_double().map_err(mapper)?),
        };
        Ok(value)
    }

    /// Converts cell value to boolean (1 or a case-insensitive `true`).
    pub(crate) fn to_boolean(&self) -> bool {
        match self.kind {
            CellType::Boolean => self.value == "1",
            _ => self.value.trim().eq_ignore_ascii_case("true"),
        }
    }

    /// Converts cell value to 64-bit integer.
    pub(crate) fn to_bigint(&self) -> Result<i64, String> {
        let value = self.value.trim();
        value.parse::<i64>()
            .or_else(|_| value.parse::<f64>().map(|number| number as i64))
            .map_err(|_| format!("parse '{}' to integer failed", self.value))
    }

    /// Converts cell value to double-precision floating point.
    pub(crate) fn to_double(&self) -> Result<f64, String> {
        self.value.trim().parse::<f64>().map_err(|_| format!("parse '{}' to float failed", self.value))
    }
}

/// Infers the type of a free-text cell: integer, then float, then boolean, else text.
fn infer_raw_type(value: &str) -> ColumnType {
    let value = value.trim();
    if value.parse::<i64>().is_ok() {
        ColumnType::Integer
    } else if value.parse::<f64>().map(|number| !number.is_nan()).unwrap_or(false) {
        ColumnType::Float
    } else if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        ColumnType::Boolean
    } else {
        ColumnType::Text
    }
}

impl Display for Cell {
    /// Renders the cell as text; date and time serials become ISO strings.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formatted = match self.kind {
            CellType::Boolean => Ok(if self.value == "1" { "True" } else { "False" }.to_owned()),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false),
            CellType::NumberDate1900 => to_date_string(&self.value, false),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true),
            CellType::NumberDate1904 => to_date_string(&self.value, true),
            CellType::NumberTime1900 | CellType::NumberTime1904 => to_time_string(&self.value),
            CellType::IsoDateTime => Ok(self.value.replace('T', " ")),
            _ => Ok(self.value.to_owned()),
        };
        // Serials that fail to convert are shown as stored.
        write!(f, "{}", formatted.unwrap_or_else(|_| self.value.to_owned()))
    }
}

/// Converts Excel numeric date to ISO date string.
/// Handles Lotus 1-2-3 leap year bug for 1900 epoch.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, SweeperError> {
    let days = value.parse::<f64>()?.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let date = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(days + offset)))
        .ok_or_else(|| SpreadsheetError::InvalidDate(value.to_owned()))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts Excel numeric time (fraction of a day) to ISO time string.
fn to_time_string(value: &str) -> Result<String, SweeperError> {
    let factor = value.parse::<f64>()?.fract();
    let mut hours = (factor * 86_400_000f64).round() as i64;
    let milliseconds = hours % 1_000; hours /= 1_000;
    let seconds = hours % 60; hours /= 60;
    let minutes = hours % 60; hours /= 60;
    let timestamp = if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };
    Ok(timestamp)
}

/// Converts Excel numeric datetime to ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, SweeperError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}
