use thiserror::Error;

/// Main error type for the data sweeper.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("{0}")]
    WithContextError(String),

    /// File extension or export target is neither CSV nor XLSX
    #[error("Unsupported file format '{0}'")]
    UnsupportedFormat(String),

    /// Column selection names a column the table does not have
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    // Third-party library errors
    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Internal module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    TableError(#[from] crate::table::TableError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

impl SweeperError {
    /// True for the two errors a presentation layer reports as user mistakes
    /// rather than broken input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, SweeperError::UnsupportedFormat(_) | SweeperError::UnknownColumn(_))
    }
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SweeperError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SweeperError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_wraps_message() {
        let result: Result<(), SweeperError> = Err(SweeperError::UnknownColumn("c".to_owned()));
        let error = result.with_prefix("data.csv").unwrap_err();
        assert_eq!(error.to_string(), "data.csv: Unknown column 'c'");
    }

    #[test]
    fn user_errors() {
        assert!(SweeperError::UnsupportedFormat("pdf".to_owned()).is_user_error());
        assert!(!SweeperError::WithContextError("x".to_owned()).is_user_error());
    }
}
