use data_sweeper::error::SweeperError;
use data_sweeper::export;
use data_sweeper::load;
use data_sweeper::process_batch;
use data_sweeper::CleaningOptions;
use data_sweeper::ColumnSelection;
use data_sweeper::FileFormat;
use data_sweeper::FileRequest;
use data_sweeper::LoadOptions;
use data_sweeper::Table;
use data_sweeper::TablePipeline;
use data_sweeper::Upload;
use data_sweeper::Value;
use proptest::prelude::*;
use std::collections::HashSet;

fn cleaning(remove_duplicates: bool, fill_missing_with_mean: bool) -> CleaningOptions {
    CleaningOptions {
        remove_duplicates,
        fill_missing_with_mean,
    }
}

fn columns(names: &[&str]) -> ColumnSelection {
    ColumnSelection::Columns(names.iter().map(|name| name.to_string()).collect())
}

#[test]
fn dedup_fill_and_select() {
    let table = load(b"a,b\n1,\n1,\n,4\n", FileFormat::Csv).unwrap();
    let pipeline = TablePipeline::new(cleaning(true, true), columns(&["b"]));
    let result = pipeline.run(&table).unwrap();
    assert_eq!(result.column_names(), vec!["b"]);
    assert_eq!(result.column("b").unwrap().values, vec![Value::Float(4.0), Value::Float(4.0)]);
}

#[test]
fn csv_export_of_cleaned_table() {
    let table = load(b"a,b\n1,\n1,\n,4\n", FileFormat::Csv).unwrap();
    let pipeline = TablePipeline::new(cleaning(true, true), ColumnSelection::All);
    let (_, bytes) = pipeline.run_and_export(&table, FileFormat::Csv).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "a,b\n1.0,4.0\n1.0,4.0\n");
}

#[test]
fn csv_export_has_no_index_column() {
    let table = Table::from_values([
        ("col1", vec![Value::Integer(1), Value::Integer(2)]),
        ("col2", vec![Value::Text("x".to_owned()), Value::Text("y".to_owned())]),
    ])
    .unwrap();
    let bytes = export(&table, FileFormat::Csv).unwrap();
    assert_eq!(bytes, b"col1,col2\n1,x\n2,y\n");
}

#[test]
fn without_cleaning_only_selection_applies() {
    let table = load(b"x,y,z\n1,a,\n1,a,\n", FileFormat::Csv).unwrap();
    let pipeline = TablePipeline::new(cleaning(false, false), columns(&["z", "x"]));
    let result = pipeline.run(&table).unwrap();
    assert_eq!(result.column_names(), vec!["z", "x"]);
    assert_eq!(result.num_rows(), 2);
    assert_eq!(result.column("z").unwrap().values, vec![Value::Null, Value::Null]);
}

#[test]
fn unknown_column_fails_the_file() {
    let table = load(b"a,b\n1,2\n", FileFormat::Csv).unwrap();
    let pipeline = TablePipeline::new(cleaning(false, false), columns(&["a", "c"]));
    let error = pipeline.run(&table).unwrap_err();
    assert!(matches!(&error, SweeperError::UnknownColumn(name) if name == "c"));
    assert!(error.is_user_error());
}

#[test]
fn batch_isolates_unsupported_files() {
    let request = FileRequest {
        export: Some(FileFormat::Xlsx),
        ..FileRequest::default()
    };
    let items = vec![
        (Upload::new("report.pdf", b"%PDF-1.7".to_vec()), request.clone()),
        (Upload::new("scores.csv", b"name,score\nann,3\nbob,5\n".to_vec()), request),
    ];
    let outcomes = process_batch(items, &LoadOptions::default());
    assert_eq!(outcomes.len(), 2);

    let (name, result) = &outcomes[0];
    assert_eq!(name, "report.pdf");
    assert!(matches!(result, Err(SweeperError::UnsupportedFormat(_))));

    let (name, result) = &outcomes[1];
    assert_eq!(name, "scores.csv");
    let report = result.as_ref().unwrap();
    let download = report.download.as_ref().unwrap();
    assert_eq!(download.file_name, "scores.xlsx");
    assert_eq!(download.mime_type, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet");
    assert_eq!(load(&download.bytes, FileFormat::Xlsx).unwrap(), report.table);
}

#[test]
fn xlsx_round_trip_keeps_values() {
    let table = Table::from_values([
        ("name", vec![Value::Text("ann".to_owned()), Value::Text("bob".to_owned()), Value::Null]),
        ("score", vec![Value::Integer(3), Value::Null, Value::Integer(-7)]),
        ("ratio", vec![Value::Float(0.5), Value::Float(2.25), Value::Null]),
        ("active", vec![Value::Boolean(true), Value::Null, Value::Boolean(false)]),
    ])
    .unwrap();
    let bytes = export(&table, FileFormat::Xlsx).unwrap();
    assert_eq!(load(&bytes, FileFormat::Xlsx).unwrap(), table);
}

#[test]
fn chart_uses_first_two_numeric_columns() {
    let request = FileRequest {
        chart: true,
        ..FileRequest::default()
    };
    let items = vec![(Upload::new("m.csv", b"label,x,y,z\na,1,2.5,9\nb,,3.5,9\n".to_vec()), request)];
    let outcomes = process_batch(items, &LoadOptions::default());
    let chart = outcomes[0].1.as_ref().unwrap().chart.clone().unwrap();
    let names: Vec<&str> = chart.series.iter().map(|series| series.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(chart.series[0].points, vec![Some(1.0), None]);
    assert_eq!(chart.series[1].points, vec![Some(2.5), Some(3.5)]);
}

fn integer_table() -> impl Strategy<Value = Table> {
    (2usize..5, 0usize..12).prop_flat_map(|(cols, rows)| {
        prop::collection::vec(prop::collection::vec(prop::option::of(-3i64..3), rows), cols).prop_map(|columns| {
            Table::from_values(columns.into_iter().enumerate().map(|(index, values)| {
                let values = values.into_iter().map(|value| value.map_or(Value::Null, Value::Integer)).collect();
                (format!("c{index}"), values)
            }))
            .unwrap()
        })
    })
}

/// Cells of one column kind; floats always carry a fraction so they are never read back as integers.
fn typed_cell(kind: usize) -> BoxedStrategy<Value> {
    let present = match kind {
        0 => (-1000i64..1000).prop_map(Value::Integer).boxed(),
        1 => (-400i64..400, 1i64..4).prop_map(|(whole, quarter)| Value::Float(whole as f64 + quarter as f64 / 4.0)).boxed(),
        2 => any::<bool>().prop_map(Value::Boolean).boxed(),
        _ => "x[a-z ,\"\n]{0,6}".prop_map(Value::Text).boxed(),
    };
    prop_oneof![1 => Just(Value::Null), 3 => present].boxed()
}

fn mixed_table() -> impl Strategy<Value = Table> {
    (prop::collection::vec(0usize..4, 2..5), 0usize..10).prop_flat_map(|(kinds, rows)| {
        kinds
            .into_iter()
            .map(|kind| prop::collection::vec(typed_cell(kind), rows))
            .collect::<Vec<_>>()
            .prop_map(|columns| {
                Table::from_values(columns.into_iter().enumerate().map(|(index, values)| (format!("c{index}"), values)))
                    .unwrap()
            })
    })
}

proptest! {
    #[test]
    fn dedup_is_idempotent_and_keeps_distinct_rows(table in integer_table()) {
        let pipeline = TablePipeline::new(cleaning(true, false), ColumnSelection::All);
        let once = pipeline.run(&table).unwrap();
        let twice = pipeline.run(&once).unwrap();
        prop_assert_eq!(&once, &twice);

        let distinct: HashSet<Vec<&Value>> = table.rows().collect();
        prop_assert_eq!(once.num_rows(), distinct.len());
    }

    #[test]
    fn fill_leaves_no_numeric_nulls(table in integer_table()) {
        let pipeline = TablePipeline::new(cleaning(false, true), ColumnSelection::All);
        let filled = pipeline.run(&table).unwrap();
        prop_assert_eq!(filled.num_rows(), table.num_rows());
        for (before, after) in table.columns().iter().zip(filled.columns()) {
            if before.mean().is_some() {
                prop_assert_eq!(after.null_count(), 0);
            } else {
                prop_assert_eq!(&after.values, &before.values);
            }
        }
    }

    #[test]
    fn selection_is_a_projection(table in integer_table(), picks in prop::collection::vec(0usize..5, 0..4)) {
        let mut names: Vec<String> = Vec::new();
        for pick in picks {
            let name = format!("c{}", pick % table.num_columns());
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let selection = if names.is_empty() { ColumnSelection::All } else { ColumnSelection::Columns(names.clone()) };
        let selected = TablePipeline::new(cleaning(false, false), selection).run(&table).unwrap();
        prop_assert_eq!(selected.num_rows(), table.num_rows());
        if names.is_empty() {
            prop_assert_eq!(&selected, &table);
        } else {
            prop_assert_eq!(selected.column_names(), names.iter().map(String::as_str).collect::<Vec<_>>());
            for column in selected.columns() {
                prop_assert_eq!(Some(column), table.column(&column.name));
            }
        }
    }

    #[test]
    fn csv_round_trip_preserves_cells(table in mixed_table()) {
        let bytes = export(&table, FileFormat::Csv).unwrap();
        let reloaded = load(&bytes, FileFormat::Csv).unwrap();
        prop_assert_eq!(&reloaded, &table);

        let again = load(&export(&reloaded, FileFormat::Csv).unwrap(), FileFormat::Csv).unwrap();
        prop_assert_eq!(&again, &reloaded);
    }
}
