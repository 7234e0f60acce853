use crate::table::value::Value;
use std::fmt::Display;

/// Inferred data type of a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Every cell is missing
    Null,
    /// Boolean values (true/false)
    Boolean,
    /// 64-bit signed integers
    Integer,
    /// Double-precision floating point numbers
    Float,
    /// Variable-length strings
    Text,
}

/// A named column holding one value per row.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Column name (from header row or generated)
    pub name: String,
    /// Column data type
    pub kind: ColumnType,
    /// Cell values, one per row
    pub values: Vec<Value>,
}

impl ColumnType {
    /// Returns the string representation of the column type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Null => "null",
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        }
    }

    /// Integer and float columns take part in mean filling and charting.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Whether a value may be stored in a column of this type.
    /// Missing cells fit every type; float columns also hold integers.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (ColumnType::Boolean, Value::Boolean(_))
                | (ColumnType::Integer, Value::Integer(_))
                | (ColumnType::Float, Value::Integer(_) | Value::Float(_))
                | (ColumnType::Text, Value::Text(_))
        )
    }

    /// Checks if a numeric string represents an integer value.
    /// Returns true if the decimal part contains only zeros or no decimal point.
    pub(crate) fn is_integer(value: &str) -> bool {
        if value.contains(['e', 'E']) {
            return false;
        }
        match value.find('.') {
            Some(index) => value[(index + 1)..].chars().all(|char| char == '0'),
            None => true,
        }
    }

    /// Detects the most specific common type from per-cell candidate types.
    /// Missing cells contribute `None`; an all-missing column is [`ColumnType::Null`].
    pub(crate) fn detect<I>(types: I) -> ColumnType
    where
        I: IntoIterator<Item = Option<ColumnType>>,
    {
        let types: Vec<ColumnType> = types.into_iter().flatten().collect();
        if types.is_empty() {
            ColumnType::Null
        } else if types.iter().all(|kind| *kind == ColumnType::Boolean) {
            ColumnType::Boolean
        } else if types.iter().all(|kind| *kind == ColumnType::Integer) {
            ColumnType::Integer
        } else if types.iter().all(ColumnType::is_numeric) {
            ColumnType::Float
        } else {
            ColumnType::Text
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Number of missing cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_null()).count()
    }

    /// Arithmetic mean of the non-missing numeric cells, `None` when there are none.
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self.values
            .iter()
            .filter_map(Value::as_f64)
            .fold((0f64, 0usize), |(sum, count), value| (sum + value, count + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_prefers_most_specific_type() {
        use ColumnType::*;
        assert_eq!(ColumnType::detect(vec![]), Null);
        assert_eq!(ColumnType::detect(vec![None, None]), Null);
        assert_eq!(ColumnType::detect(vec![Some(Boolean), None]), Boolean);
        assert_eq!(ColumnType::detect(vec![Some(Integer), None, Some(Integer)]), Integer);
        assert_eq!(ColumnType::detect(vec![Some(Integer), Some(Float)]), Float);
        assert_eq!(ColumnType::detect(vec![Some(Integer), Some(Text)]), Text);
        assert_eq!(ColumnType::detect(vec![Some(Boolean), Some(Integer)]), Text);
    }

    #[test]
    fn accepted_values() {
        assert!(ColumnType::Float.accepts(&Value::Integer(1)));
        assert!(ColumnType::Null.accepts(&Value::Null));
        assert!(!ColumnType::Null.accepts(&Value::Integer(1)));
        assert!(!ColumnType::Integer.accepts(&Value::Float(1.0)));
        assert!(!ColumnType::Integer.accepts(&Value::Text("1".to_owned())));
        assert!(!ColumnType::Text.accepts(&Value::Boolean(true)));
    }

    #[test]
    fn integer_detection() {
        assert!(ColumnType::is_integer("12"));
        assert!(ColumnType::is_integer("12.000"));
        assert!(!ColumnType::is_integer("12.5"));
        assert!(!ColumnType::is_integer("1e3"));
    }

    #[test]
    fn mean_skips_missing_cells() {
        let column = Column::new("b", ColumnType::Integer, vec![Value::Null, Value::Integer(4), Value::Integer(6)]);
        assert_eq!(column.mean(), Some(5.0));
        assert_eq!(column.null_count(), 1);

        let empty = Column::new("c", ColumnType::Null, vec![Value::Null]);
        assert_eq!(empty.mean(), None);
    }
}
