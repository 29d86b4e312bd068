//! content.xml serialization.
//!
//! Single-pass string assembly: the document is written top-down with
//! explicit escaping, repeat attributes emitted for stored runs.

use super::{push_escaped_attr, push_escaped_text};
use crate::constants::{NAMESPACES, OFFICE_VERSION};
use crate::table::{Cell, Column, Repeatable, Row, Table};
use crate::value::{CellValue, format_number};
use crate::datatype::{Boolean, Date, DateTimeOdf, DurationOdf};

/// Serialize tables into a complete content.xml document.
pub(crate) fn write_content(tables: &[Table]) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push_str("<office:document-content");
    for (name, uri) in NAMESPACES {
        push_attr(&mut out, name, uri);
    }
    push_attr(&mut out, "office:version", OFFICE_VERSION);
    out.push('>');
    out.push_str("<office:scripts/><office:font-face-decls/><office:automatic-styles/>");
    out.push_str("<office:body><office:spreadsheet>");

    for table in tables {
        write_table(&mut out, table);
    }

    out.push_str("</office:spreadsheet></office:body></office:document-content>");
    out
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    push_escaped_attr(out, value);
    out.push('"');
}

fn push_repeat_attr(out: &mut String, name: &str, repeated: Option<usize>) {
    if let Some(repeated) = repeated {
        let mut buffer = itoa::Buffer::new();
        push_attr(out, name, buffer.format(repeated));
    }
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<table:table");
    push_attr(out, "table:name", table.name());
    if let Some(style) = table.style() {
        push_attr(out, "table:style-name", style);
    }
    out.push('>');

    if table.columns().is_empty() {
        // Every table declares at least one column.
        out.push_str("<table:table-column/>");
    } else {
        for column in table.columns() {
            write_column(out, column);
        }
    }

    for row in table.rows() {
        write_row(out, row);
    }

    out.push_str("</table:table>");
}

fn write_column(out: &mut String, column: &Column) {
    out.push_str("<table:table-column");
    push_repeat_attr(out, "table:number-columns-repeated", column.repeated());
    if let Some(style) = column.style() {
        push_attr(out, "table:style-name", style);
    }
    if let Some(style) = column.default_cell_style() {
        push_attr(out, "table:default-cell-style-name", style);
    }
    out.push_str("/>");
}

fn write_row(out: &mut String, row: &Row) {
    out.push_str("<table:table-row");
    push_repeat_attr(out, "table:number-rows-repeated", row.repeated());
    if let Some(style) = row.style() {
        push_attr(out, "table:style-name", style);
    }

    if row.cells().is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    for cell in row.cells() {
        write_cell(out, cell);
    }

    out.push_str("</table:table-row>");
}

fn write_cell(out: &mut String, cell: &Cell) {
    let tag = if cell.is_covered() {
        "table:covered-table-cell"
    } else {
        "table:table-cell"
    };
    out.push('<');
    out.push_str(tag);

    push_repeat_attr(out, "table:number-columns-repeated", cell.repeated());
    if let Some(style) = cell.style() {
        push_attr(out, "table:style-name", style);
    }
    if let Some(formula) = cell.formula() {
        push_attr(out, "table:formula", formula);
    }
    let (columns_spanned, rows_spanned) = cell.span();
    if columns_spanned > 1 || rows_spanned > 1 {
        let mut buffer = itoa::Buffer::new();
        push_attr(out, "table:number-columns-spanned", buffer.format(columns_spanned));
        push_attr(out, "table:number-rows-spanned", buffer.format(rows_spanned));
    }

    write_value_attributes(out, cell.value());

    let text = cell.text();
    if text.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for paragraph in text.split('\n') {
        out.push_str("<text:p>");
        push_escaped_text(out, paragraph);
        out.push_str("</text:p>");
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_value_attributes(out: &mut String, value: &CellValue) {
    let Some(value_type) = value.value_type() else {
        return;
    };
    push_attr(out, "office:value-type", value_type.as_odf());

    match value {
        CellValue::Float(n) | CellValue::Percentage(n) => {
            push_attr(out, "office:value", &format_number(*n));
        },
        CellValue::Currency(n, code) => {
            push_attr(out, "office:value", &format_number(*n));
            if !code.is_empty() {
                push_attr(out, "office:currency", code);
            }
        },
        CellValue::Boolean(b) => {
            push_attr(out, "office:boolean-value", Boolean::encode(*b));
        },
        CellValue::Date(d) => {
            push_attr(out, "office:date-value", &Date::encode(d));
        },
        CellValue::DateTime(dt) => {
            push_attr(out, "office:date-value", &DateTimeOdf::encode(dt));
        },
        CellValue::Time(t) => {
            push_attr(out, "office:time-value", &DurationOdf::encode(t));
        },
        CellValue::Empty | CellValue::Text(_) => {},
    }
}

/// A minimal styles.xml for documents created from scratch; loaded
/// documents carry their original styles through instead.
pub(crate) fn default_styles_xml() -> String {
    let mut out = String::with_capacity(512);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push_str("<office:document-styles");
    for (name, uri) in NAMESPACES {
        push_attr(&mut out, name, uri);
    }
    push_attr(&mut out, "office:version", OFFICE_VERSION);
    out.push('>');
    out.push_str(
        "<office:font-face-decls/><office:styles/>\
         <office:automatic-styles/><office:master-styles/>",
    );
    out.push_str("</office:document-styles>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_content;

    fn table_with_runs() -> Table {
        let mut table = Table::new("Data");
        let mut row = Row::new();
        row.append_cell(Cell::with_value("head"));
        row.append_cell_repeated(Cell::new(), Some(9));
        table.append_row(row);

        let mut repeated = Row::new();
        repeated.append_cell(Cell::with_value(1.5));
        repeated.set_repeated(Some(3));
        table.append_row(repeated);
        table
    }

    #[test]
    fn test_repeat_attributes_round_trip() {
        let xml = write_content(&[table_with_runs()]);
        assert!(xml.contains(r#"table:number-columns-repeated="9""#));
        assert!(xml.contains(r#"table:number-rows-repeated="3""#));

        let tables = parse_content(&xml).unwrap();
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.height(), 4);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].width(), 10);
        assert_eq!(table.get_value((0, 3)).unwrap(), CellValue::Float(1.5));
    }

    #[test]
    fn test_escaping() {
        let mut table = Table::new(r#"A<B>&"C""#);
        table.set_value("A1", "x < y & z").unwrap();

        let xml = write_content(&[table]);
        assert!(xml.contains("A&lt;B&gt;&amp;&quot;C&quot;"));
        assert!(xml.contains("x &lt; y &amp; z"));

        let tables = parse_content(&xml).unwrap();
        assert_eq!(tables[0].name(), r#"A<B>&"C""#);
    }

    #[test]
    fn test_typed_values_round_trip() {
        use chrono::NaiveDate;

        let mut table = Table::new("Types");
        table.set_value("A1", 3.25).unwrap();
        table.set_value("A2", true).unwrap();
        table
            .set_value("A3", NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
            .unwrap();
        table
            .set_cell("A4", Cell::with_value(CellValue::Currency(9.5, "EUR".into())))
            .unwrap();

        let xml = write_content(&[table]);
        let tables = parse_content(&xml).unwrap();
        let table = &tables[0];

        assert_eq!(table.get_value("A1").unwrap(), CellValue::Float(3.25));
        assert_eq!(table.get_value("A2").unwrap(), CellValue::Boolean(true));
        assert_eq!(
            table.get_value("A3").unwrap(),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
        );
        assert_eq!(
            table.get_value("A4").unwrap(),
            CellValue::Currency(9.5, "EUR".to_string()),
        );
    }

    #[test]
    fn test_empty_row_is_self_closing() {
        let mut table = Table::new("T");
        table.append_row(Row::new());
        let xml = write_content(&[table]);
        assert!(xml.contains("<table:table-row/>"));
    }
}
