use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::modifiers::UTF8_SOLID_INNER_BORDERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Attribute;
use comfy_table::Cell;
use comfy_table::CellAlignment;
use comfy_table::Color;
use comfy_table::ContentArrangement;
use comfy_table::Table;
use data_sweeper::pipeline::batch::FileReport;
use data_sweeper::pipeline::ChartData;
use data_sweeper::table::value::Value;
use std::path::PathBuf;

/// Result of one input file as seen by the command line.
pub struct FileSummary {
    pub name: String,
    pub rows: Option<usize>,
    pub columns: Option<usize>,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

/// Prints the per-stage previews and chart data of one file.
pub fn print_report(report: &FileReport, preview_rows: usize) {
    println!();
    println!("{} ({:.2} KB)", report.name, report.size_bytes as f64 / 1024.0);
    if preview_rows > 0 {
        for (stage, preview) in &report.previews {
            println!("Preview, {stage}:");
            println!("{}", preview_table(preview));
        }
    }
    if let Some(chart) = &report.chart {
        println!("Chart data:");
        println!("{}", chart_table(chart));
    }
}

/// Prints one line per file with its outcome.
pub fn print_summary(summaries: &[FileSummary]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Output"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for summary in summaries {
        let status = match &summary.error {
            Some(error) => Cell::new(error).fg(Color::Red),
            None => Cell::new("ok").fg(Color::Green),
        };
        table.add_row(vec![
            Cell::new(&summary.name),
            Cell::new(count(summary.rows)),
            Cell::new(count(summary.columns)),
            Cell::new(summary.output.as_ref().map(|path| path.display().to_string()).unwrap_or_else(|| "-".to_owned())),
            status,
        ]);
    }
    println!("{table}");
}

fn preview_table(preview: &data_sweeper::Table) -> Table {
    let mut table = Table::new();
    table.set_header(preview.column_names().into_iter().map(header_cell).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for row in preview.rows() {
        table.add_row(row.into_iter().map(value_cell).collect::<Vec<_>>());
    }
    table
}

fn chart_table(chart: &ChartData) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("#")];
    header.extend(chart.series.iter().map(|series| header_cell(&series.name)));
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 0..chart.len() {
        let mut row = vec![Cell::new(index)];
        row.extend(chart.series.iter().map(|series| match series.points.get(index).copied().flatten() {
            Some(point) => Cell::new(point).set_alignment(CellAlignment::Right),
            None => Cell::new(""),
        }));
        table.add_row(row);
    }
    table
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::new("null").fg(Color::DarkGrey),
        Value::Integer(_) | Value::Float(_) => Cell::new(value).set_alignment(CellAlignment::Right),
        _ => Cell::new(value),
    }
}

fn count(value: Option<usize>) -> String {
    value.map(|value| value.to_string()).unwrap_or_else(|| "-".to_owned())
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
