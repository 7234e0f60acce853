//! Minimal SpreadsheetML writer producing a single-sheet `.xlsx` package.

use crate::error::SweeperError;
use crate::helpers::xml::part_writer;
use crate::helpers::xml::sanitize_text;
use crate::helpers::zip::ZipPartWriter;
use crate::spreadsheet::reference::index_to_reference;
use crate::table::value::Value;
use crate::table::Table;
use quick_xml::events::BytesText;
use quick_xml::Writer;
use std::io::Cursor;
use zip::ZipWriter;

/// Name of the only worksheet in exported workbooks.
pub(crate) const SHEET_NAME: &str = "Sheet1";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Style index of the bold header cells in [`STYLES`].
const HEADER_STYLE: &str = "1";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Serializes the table into an XLSX package with one sheet named `Sheet1`.
/// Row 1 holds the column names; missing cells are omitted.
pub(crate) fn write_table(table: &Table) -> Result<Vec<u8>, SweeperError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.write_part("[Content_Types].xml", CONTENT_TYPES.as_bytes())?;
    zip.write_part("_rels/.rels", ROOT_RELATIONSHIPS.as_bytes())?;
    zip.write_part("xl/workbook.xml", &workbook_part()?)?;
    zip.write_part("xl/_rels/workbook.xml.rels", WORKBOOK_RELATIONSHIPS.as_bytes())?;
    zip.write_part("xl/styles.xml", STYLES.as_bytes())?;
    zip.write_part("xl/worksheets/sheet1.xml", &worksheet_part(table)?)?;
    Ok(zip.finish()?.into_inner())
}

fn workbook_part() -> std::io::Result<Vec<u8>> {
    let mut writer = part_writer(Vec::new())?;
    writer
        .create_element("workbook")
        .with_attribute(("xmlns", NS_MAIN))
        .with_attribute(("xmlns:r", NS_RELATIONSHIPS))
        .write_inner_content(|writer| {
            writer.create_element("sheets").write_inner_content(|writer| {
                writer
                    .create_element("sheet")
                    .with_attribute(("name", SHEET_NAME))
                    .with_attribute(("sheetId", "1"))
                    .with_attribute(("r:id", "rId1"))
                    .write_empty()?;
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(writer.into_inner())
}

fn worksheet_part(table: &Table) -> std::io::Result<Vec<u8>> {
    let dimension = match table.num_columns() {
        0 => "A1".to_owned(),
        columns => format!("A1:{}", index_to_reference(table.num_rows(), columns - 1)),
    };

    let mut writer = part_writer(Vec::new())?;
    writer
        .create_element("worksheet")
        .with_attribute(("xmlns", NS_MAIN))
        .write_inner_content(|writer| {
            writer.create_element("dimension").with_attribute(("ref", dimension.as_str())).write_empty()?;
            writer.create_element("sheetData").write_inner_content(|writer| {
                if table.num_columns() == 0 {
                    return Ok(());
                }
                let header: Vec<Value> = table.column_names().into_iter().map(|name| Value::Text(name.to_owned())).collect();
                write_row(writer, 0, header.iter(), Some(HEADER_STYLE))?;
                for (index, row) in table.rows().enumerate() {
                    write_row(writer, index + 1, row.into_iter(), None)?;
                }
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(writer.into_inner())
}

fn write_row<'v, I>(writer: &mut Writer<Vec<u8>>, row: usize, values: I, style: Option<&str>) -> std::io::Result<()>
where
    I: Iterator<Item = &'v Value>,
{
    let number = (row + 1).to_string();
    writer
        .create_element("row")
        .with_attribute(("r", number.as_str()))
        .write_inner_content(|writer| {
            for (col, value) in values.enumerate() {
                write_cell(writer, &index_to_reference(row, col), value, style)?;
            }
            Ok(())
        })?;
    Ok(())
}

/// Writes one `<c>` element. Text uses inline strings so no shared string table is needed.
fn write_cell(writer: &mut Writer<Vec<u8>>, reference: &str, value: &Value, style: Option<&str>) -> std::io::Result<()> {
    let mut element = writer.create_element("c").with_attribute(("r", reference));
    if let Some(style) = style {
        element = element.with_attribute(("s", style));
    }
    match value {
        Value::Null => {}
        Value::Boolean(flag) => {
            element
                .with_attribute(("t", "b"))
                .write_inner_content(|writer| {
                    writer.create_element("v").write_text_content(BytesText::new(if *flag { "1" } else { "0" }))?;
                    Ok(())
                })?;
        }
        Value::Integer(_) | Value::Float(_) if value.as_f64().map(f64::is_finite).unwrap_or(false) => {
            let number = match value {
                Value::Float(number) => number.to_string(),
                other => other.to_string(),
            };
            element.write_inner_content(|writer| {
                writer.create_element("v").write_text_content(BytesText::new(&number))?;
                Ok(())
            })?;
        }
        // Infinite and NaN floats have no numeric cell representation.
        Value::Integer(_) | Value::Float(_) | Value::Text(_) => {
            let text = value.to_string();
            let text = sanitize_text(&text);
            element
                .with_attribute(("t", "inlineStr"))
                .write_inner_content(|writer| {
                    writer.create_element("is").write_inner_content(|writer| {
                        let mut element = writer.create_element("t");
                        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                            element = element.with_attribute(("xml:space", "preserve"));
                        }
                        element.write_text_content(BytesText::new(&text))?;
                        Ok(())
                    })?;
                    Ok(())
                })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn part(bytes: &[u8], name: &str) -> String {
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    fn sample() -> Table {
        Table::from_values(vec![
            ("name", vec![Value::Text(" padded".to_owned()), Value::Text("b&c".to_owned())]),
            ("score", vec![Value::Float(1.5), Value::Null]),
            ("ok", vec![Value::Boolean(true), Value::Boolean(false)]),
        ])
        .unwrap()
    }

    #[test]
    fn package_has_required_parts() {
        let bytes = write_table(&sample()).unwrap();
        let zip = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(names.contains(&name), "missing {name}");
        }
        assert!(part(&bytes, "xl/workbook.xml").contains(r#"name="Sheet1""#));
    }

    #[test]
    fn worksheet_cells() {
        let bytes = write_table(&sample()).unwrap();
        let sheet = part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<dimension ref="A1:C3"/>"#));
        assert!(sheet.contains(r#"<c r="A1" s="1" t="inlineStr"><is><t>name</t></is></c>"#));
        assert!(sheet.contains(r#"<t xml:space="preserve"> padded</t>"#));
        assert!(sheet.contains("b&amp;c"));
        assert!(sheet.contains(r#"<c r="B2"><v>1.5</v></c>"#));
        assert!(sheet.contains(r#"<c r="C2" t="b"><v>1</v></c>"#));
        assert!(!sheet.contains(r#"r="B3""#));
    }

    #[test]
    fn table_without_columns_has_empty_sheet_data() {
        let bytes = write_table(&Table::default()).unwrap();
        let sheet = part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<dimension ref="A1"/>"#));
        assert!(!sheet.contains("<row"));
    }
}
