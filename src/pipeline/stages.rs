//! The individual table transformations. Each returns a new table and leaves its input untouched.

use crate::error::SweeperError;
use crate::table::column::Column;
use crate::table::column::ColumnType;
use crate::table::value::Value;
use crate::table::Table;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;

/// Which columns to keep, and in which order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSelection {
    /// Every column in load order
    #[default]
    All,
    /// Exactly these columns, in this order
    Columns(Vec<String>),
}

impl ColumnSelection {
    /// Builds a selection from a comma-separated list; an empty list selects everything.
    pub fn parse_list(list: &str) -> Self {
        let names: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();
        if names.is_empty() {
            ColumnSelection::All
        } else {
            ColumnSelection::Columns(names)
        }
    }
}

/// Keeps the first occurrence of every distinct row, preserving order.
pub fn remove_duplicate_rows(table: &Table) -> Table {
    let mut seen = HashSet::with_capacity(table.num_rows());
    let indexes: Vec<usize> = table
        .rows()
        .enumerate()
        .filter_map(|(index, row)| seen.insert(row).then_some(index))
        .collect();
    table.take_rows(&indexes)
}

/// Replaces missing cells of numeric columns with the column mean.
///
/// The mean is taken over the non-missing cells before filling. A filled column
/// becomes a float column; columns with nothing to fill, or nothing to average,
/// are returned as they are.
pub fn fill_missing_numeric(table: &Table) -> Table {
    let columns = table
        .columns()
        .iter()
        .map(|column| match column.mean() {
            Some(mean) if column.kind.is_numeric() && column.null_count() > 0 => Column::new(
                column.name.to_owned(),
                ColumnType::Float,
                column.values.iter().map(|value| fill_value(value, mean)).collect(),
            ),
            _ => column.clone(),
        })
        .collect();
    Table::from_parts(columns, table.num_rows())
}

/// Missing cells take the mean; numbers are widened to floats; anything else is kept.
fn fill_value(value: &Value, mean: f64) -> Value {
    match value {
        Value::Null => Value::Float(mean),
        Value::Integer(value) => Value::Float(*value as f64),
        Value::Float(value) => Value::Float(*value),
        other => other.clone(),
    }
}

/// Projects the table onto the selected columns, keeping every row.
/// Fails on the first name the table does not have; a repeated name is kept once.
pub fn select_columns(table: &Table, selection: &ColumnSelection) -> Result<Table, SweeperError> {
    let names = match selection {
        ColumnSelection::All => return Ok(table.clone()),
        ColumnSelection::Columns(names) => names,
    };

    let mut seen = HashSet::with_capacity(names.len());
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let column = table
            .column(name)
            .ok_or_else(|| SweeperError::UnknownColumn(name.to_owned()))?;
        if seen.insert(name.as_str()) {
            columns.push(column.clone());
        }
    }
    Ok(Table::from_parts(columns, table.num_rows()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_values(vec![
            ("a", vec![Value::Integer(1), Value::Integer(1), Value::Null, Value::Integer(1)]),
            ("b", vec![Value::Null, Value::Null, Value::Integer(4), Value::Null]),
            ("c", vec![Value::Text("x".to_owned()), Value::Text("x".to_owned()), Value::Null, Value::Text("y".to_owned())]),
        ])
        .unwrap()
    }

    #[test]
    fn dedup_keeps_first_occurrences_in_order() {
        let deduped = remove_duplicate_rows(&table());
        assert_eq!(deduped.num_rows(), 3);
        assert_eq!(deduped.column("c").unwrap().values[2], Value::Text("y".to_owned()));
        assert_eq!(remove_duplicate_rows(&deduped), deduped);
    }

    #[test]
    fn dedup_treats_signed_zeros_as_equal() {
        let table = Table::from_values(vec![("f", vec![Value::Float(0.0), Value::Float(-0.0)])]).unwrap();
        assert_eq!(remove_duplicate_rows(&table).num_rows(), 1);
    }

    #[test]
    fn fill_uses_mean_of_present_cells() {
        let filled = fill_missing_numeric(&table());
        let a = filled.column("a").unwrap();
        assert_eq!(a.kind, ColumnType::Float);
        assert_eq!(a.values, vec![Value::Float(1.0); 4]);
        assert_eq!(filled.column("b").unwrap().values, vec![Value::Float(4.0); 4]);
        assert_eq!(filled.column("c").unwrap(), table().column("c").unwrap());
        assert_eq!(fill_missing_numeric(&filled), filled);
    }

    #[test]
    fn fill_replaces_only_missing_cells() {
        assert_eq!(fill_value(&Value::Null, 2.5), Value::Float(2.5));
        assert_eq!(fill_value(&Value::Integer(3), 2.5), Value::Float(3.0));
        assert_eq!(fill_value(&Value::Float(-1.0), 2.5), Value::Float(-1.0));
        assert_eq!(fill_value(&Value::Text("keep me".to_owned()), 2.5), Value::Text("keep me".to_owned()));
    }

    #[test]
    fn fill_leaves_complete_and_empty_columns_alone() {
        let table = Table::from_values(vec![
            ("full", vec![Value::Integer(2), Value::Integer(3)]),
            ("none", vec![Value::Null, Value::Null]),
        ])
        .unwrap();
        assert_eq!(fill_missing_numeric(&table), table);
    }

    #[test]
    fn select_orders_and_validates() {
        let selected = select_columns(&table(), &ColumnSelection::Columns(vec!["c".to_owned(), "a".to_owned()])).unwrap();
        assert_eq!(selected.column_names(), vec!["c", "a"]);
        assert_eq!(selected.num_rows(), 4);

        let error = select_columns(&table(), &ColumnSelection::Columns(vec!["a".to_owned(), "zz".to_owned()])).unwrap_err();
        assert!(matches!(error, SweeperError::UnknownColumn(name) if name == "zz"));

        let repeated = ColumnSelection::Columns(vec!["a".to_owned(), "c".to_owned(), "a".to_owned()]);
        assert_eq!(select_columns(&table(), &repeated).unwrap().column_names(), vec!["a", "c"]);

        assert_eq!(select_columns(&table(), &ColumnSelection::All).unwrap(), table());
    }

    #[test]
    fn parse_list() {
        assert_eq!(ColumnSelection::parse_list(" b, a ,"), ColumnSelection::Columns(vec!["b".to_owned(), "a".to_owned()]));
        assert_eq!(ColumnSelection::parse_list(""), ColumnSelection::All);
    }
}
