use crate::table::Table;
use serde::Serialize;

/// Maximum number of numeric columns charted.
pub const MAX_CHART_SERIES: usize = 2;

/// One numeric column prepared for plotting against the row index.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    /// One point per row; missing cells are gaps
    pub points: Vec<Option<f64>>,
}

/// Data for a bar chart of the leading numeric columns, x being the row position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    /// Number of points on the x axis.
    pub fn len(&self) -> usize {
        self.series.first().map(|series| series.points.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracts the first two numeric columns; `None` when the table has no numeric column.
pub fn chart_data(table: &Table) -> Option<ChartData> {
    let series: Vec<ChartSeries> = table
        .columns()
        .iter()
        .filter(|column| column.kind.is_numeric())
        .take(MAX_CHART_SERIES)
        .map(|column| ChartSeries {
            name: column.name.to_owned(),
            points: column.values.iter().map(|value| value.as_f64()).collect(),
        })
        .collect();
    (!series.is_empty()).then_some(ChartData { series })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::value::Value;

    #[test]
    fn takes_leading_numeric_columns() {
        let table = Table::from_values(vec![
            ("label", vec![Value::Text("x".to_owned()), Value::Text("y".to_owned())]),
            ("a", vec![Value::Integer(1), Value::Null]),
            ("flag", vec![Value::Boolean(true), Value::Boolean(false)]),
            ("b", vec![Value::Float(0.5), Value::Float(1.5)]),
            ("c", vec![Value::Integer(7), Value::Integer(8)]),
        ])
        .unwrap();

        let chart = chart_data(&table).unwrap();
        assert_eq!(chart.len(), 2);
        assert_eq!(chart.series.iter().map(|series| series.name.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(chart.series[0].points, vec![Some(1.0), None]);
    }

    #[test]
    fn nothing_to_chart_without_numbers() {
        let table = Table::from_values(vec![("label", vec![Value::Text("x".to_owned())])]).unwrap();
        assert!(chart_data(&table).is_none());
    }
}
