//! # In-memory Table
//!
//! Column-major tabular data: an ordered list of uniquely named, typed columns
//! sharing one row count. Tables are values; every pipeline stage builds a new one.

pub mod column;
pub mod value;

use crate::table::column::Column;
use crate::table::column::ColumnType;
use crate::table::value::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised when assembling a table from columns.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("Column '{name}' has {found} rows, expected {expected}")]
    RowCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{name}' of type {kind} cannot hold {value:?} at row {row}")]
    TypeMismatch {
        name: String,
        kind: ColumnType,
        row: usize,
        value: Value,
    },
}

/// Ordered collection of named, typed columns with a uniform row count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Builds a table, checking that names are unique, row counts agree and
    /// every value fits its column type.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(|column| column.values.len()).unwrap_or(0);
        let mut names = HashSet::new();
        for column in &columns {
            if !names.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.to_owned()));
            }
            if column.values.len() != rows {
                return Err(TableError::RowCountMismatch {
                    name: column.name.to_owned(),
                    expected: rows,
                    found: column.values.len(),
                });
            }
            if let Some((row, value)) = column.values.iter().enumerate().find(|(_, value)| !column.kind.accepts(value)) {
                return Err(TableError::TypeMismatch {
                    name: column.name.to_owned(),
                    kind: column.kind,
                    row,
                    value: value.clone(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table from values whose column types are inferred from the cells.
    pub fn from_values<N, I>(columns: I) -> Result<Self, TableError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<Value>)>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let kind = ColumnType::detect(values.iter().map(value_type));
                Column::new(name, kind, values)
            })
            .collect();
        Self::new(columns)
    }

    /// Internal constructor for stages that preserve the table invariants by construction.
    pub(crate) fn from_parts(columns: Vec<Column>, rows: usize) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        (index < self.rows).then(|| self.columns.iter().map(|column| &column.values[index]).collect())
    }

    /// Iterates over rows as vectors of cell references.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.rows).map(move |index| self.columns.iter().map(|column| &column.values[index]).collect())
    }

    /// Returns a new table with the given rows, in the given order.
    pub(crate) fn take_rows(&self, indexes: &[usize]) -> Table {
        let columns = self.columns
            .iter()
            .map(|column| Column {
                name: column.name.to_owned(),
                kind: column.kind,
                values: indexes.iter().map(|index| column.values[*index].clone()).collect(),
            })
            .collect();
        Table::from_parts(columns, indexes.len())
    }

    /// First `n` rows, used for previews.
    pub fn head(&self, n: usize) -> Table {
        let indexes: Vec<usize> = (0..self.rows.min(n)).collect();
        self.take_rows(&indexes)
    }
}

/// Candidate type contributed by an already typed value.
fn value_type(value: &Value) -> Option<ColumnType> {
    match value {
        Value::Null => None,
        Value::Boolean(_) => Some(ColumnType::Boolean),
        Value::Integer(_) => Some(ColumnType::Integer),
        Value::Float(_) => Some(ColumnType::Float),
        Value::Text(_) => Some(ColumnType::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_values(vec![
            ("id", vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
            ("name", vec![Value::Text("x".to_owned()), Value::Null, Value::Text("z".to_owned())]),
        ])
        .unwrap()
    }

    #[test]
    fn infers_types_from_values() {
        let table = sample();
        assert_eq!(table.column("id").unwrap().kind, ColumnType::Integer);
        assert_eq!(table.column("name").unwrap().kind, ColumnType::Text);
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = Table::from_values(vec![("a", vec![Value::Null]), ("a", vec![Value::Null])]);
        assert!(matches!(result, Err(TableError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn rejects_ragged_columns() {
        let result = Table::from_values(vec![("a", vec![Value::Null]), ("b", vec![])]);
        assert!(matches!(result, Err(TableError::RowCountMismatch { expected: 1, found: 0, .. })));
    }

    #[test]
    fn rejects_values_of_another_type() {
        let column = Column::new("a", ColumnType::Integer, vec![Value::Text("keep me".to_owned()), Value::Integer(4), Value::Null]);
        let result = Table::new(vec![column]);
        assert!(matches!(result, Err(TableError::TypeMismatch { row: 0, kind: ColumnType::Integer, .. })));

        let mixed = Column::new("f", ColumnType::Float, vec![Value::Integer(1), Value::Float(0.5)]);
        assert!(Table::new(vec![mixed]).is_ok());
    }

    #[test]
    fn head_truncates_rows() {
        let table = sample();
        let head = table.head(2);
        assert_eq!(head.num_rows(), 2);
        assert_eq!(head.row(1).unwrap(), vec![&Value::Integer(2), &Value::Null]);
        assert_eq!(table.head(10), table);
    }

    #[test]
    fn row_out_of_range() {
        assert!(sample().row(3).is_none());
    }
}
