//! Streaming content.xml parser.
//!
//! Event-driven over quick-xml. Repeated cells and rows are kept as single
//! stored items with their repeat attributes; the dense addressing layer
//! owns the expansion.

use crate::table::{Cell, Column, Repeatable, Row, Table};
use crate::value::CellValue;
use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};

/// Parse every `table:table` out of a content.xml document.
pub(crate) fn parse_content(xml_content: &str) -> Result<Vec<Table>> {
    let mut reader = Reader::from_str(xml_content);
    let mut buf = Vec::new();
    let mut tables = Vec::new();

    let mut current_table: Option<Table> = None;
    let mut current_row: Option<Row> = None;
    let mut current_cell: Option<CellBuilder> = None;
    let mut text_depth = 0usize;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"table:table" => {
                    current_table = Some(parse_table_attributes(e)?);
                },
                b"table:table-column" => {
                    if let Some(table) = current_table.as_mut() {
                        table.append_column(parse_column_attributes(e)?);
                    }
                },
                b"table:table-row" => {
                    if current_table.is_some() {
                        current_row = Some(parse_row_attributes(e)?);
                    }
                },
                b"table:table-cell" | b"table:covered-table-cell" => {
                    if current_row.is_some() {
                        let mut builder = parse_cell_attributes(e)?;
                        builder.covered = e.name().as_ref() == b"table:covered-table-cell";
                        current_cell = Some(builder);
                        text.clear();
                    }
                },
                b"text:p" => {
                    if current_cell.is_some() {
                        if text_depth == 0 && !text.is_empty() {
                            // Paragraph boundary inside one cell.
                            text.push('\n');
                        }
                        text_depth += 1;
                    }
                },
                b"text:span" | b"text:a" => {
                    if current_cell.is_some() {
                        text_depth += 1;
                    }
                },
                _ => {},
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"table:table" => {
                    tables.push(parse_table_attributes(e)?);
                },
                b"table:table-column" => {
                    if let Some(table) = current_table.as_mut() {
                        table.append_column(parse_column_attributes(e)?);
                    }
                },
                b"table:table-cell" | b"table:covered-table-cell" => {
                    if let Some(row) = current_row.as_mut() {
                        let mut builder = parse_cell_attributes(e)?;
                        builder.covered = e.name().as_ref() == b"table:covered-table-cell";
                        row.append_cell(builder.build(""));
                    }
                },
                b"table:table-row" => {
                    if let Some(table) = current_table.as_mut() {
                        table.append_row(parse_row_attributes(e)?);
                    }
                },
                _ => {},
            },
            Ok(Event::Text(ref t)) => {
                if current_cell.is_some() && text_depth > 0 {
                    let fragment = t
                        .unescape()
                        .map_err(|e| Error::Xml(format!("invalid text content: {}", e)))?;
                    text.push_str(&fragment);
                }
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"text:p" | b"text:span" | b"text:a" => {
                    if current_cell.is_some() {
                        text_depth = text_depth.saturating_sub(1);
                    }
                },
                b"table:table-cell" | b"table:covered-table-cell" => {
                    if let Some(builder) = current_cell.take()
                        && let Some(row) = current_row.as_mut()
                    {
                        row.append_cell(builder.build(&text));
                    }
                },
                b"table:table-row" => {
                    if let Some(row) = current_row.take()
                        && let Some(table) = current_table.as_mut()
                    {
                        table.append_row(row);
                    }
                },
                b"table:table" => {
                    if let Some(table) = current_table.take() {
                        tables.push(table);
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("content parsing error: {}", e)));
            },
            _ => {},
        }
        buf.clear();
    }

    Ok(tables)
}

fn attribute_string(attr: &Attribute) -> Result<String> {
    Ok(attr
        .unescape_value()
        .map_err(|e| Error::Xml(format!("invalid attribute value: {}", e)))?
        .into_owned())
}

/// Parse a repeat attribute leniently: absent, unparseable or zero all
/// mean "not repeated".
fn parse_repeat(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|&r| r > 1)
}

fn parse_table_attributes(e: &BytesStart) -> Result<Table> {
    let mut name = None;
    let mut style = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|_| Error::Xml("invalid table attribute".to_string()))?;
        let value = attribute_string(&attr)?;
        match attr.key.as_ref() {
            b"table:name" => name = Some(value),
            b"table:style-name" => style = Some(value),
            _ => {},
        }
    }

    let mut table = Table::new(name.unwrap_or_else(|| "Sheet1".to_string()));
    table.set_style(style);
    Ok(table)
}

fn parse_column_attributes(e: &BytesStart) -> Result<Column> {
    let mut column = Column::new();

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|_| Error::Xml("invalid column attribute".to_string()))?;
        let value = attribute_string(&attr)?;
        match attr.key.as_ref() {
            b"table:style-name" => column.set_style(Some(value)),
            b"table:default-cell-style-name" => column.set_default_cell_style(Some(value)),
            b"table:number-columns-repeated" => column.set_repeated(parse_repeat(&value)),
            _ => {},
        }
    }

    Ok(column)
}

fn parse_row_attributes(e: &BytesStart) -> Result<Row> {
    let mut row = Row::new();

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|_| Error::Xml("invalid row attribute".to_string()))?;
        let value = attribute_string(&attr)?;
        match attr.key.as_ref() {
            b"table:style-name" => row.set_style(Some(value)),
            b"table:number-rows-repeated" => row.set_repeated(parse_repeat(&value)),
            _ => {},
        }
    }

    Ok(row)
}

/// Collected cell attributes, pending the embedded text.
struct CellBuilder {
    value_type: Option<String>,
    value: Option<String>,
    boolean_value: Option<String>,
    date_value: Option<String>,
    time_value: Option<String>,
    currency: Option<String>,
    formula: Option<String>,
    style: Option<String>,
    repeated: Option<usize>,
    columns_spanned: usize,
    rows_spanned: usize,
    covered: bool,
}

impl CellBuilder {
    fn build(self, text: &str) -> Cell {
        // The typed office:*-value attributes take precedence over the
        // generic office:value.
        let value = self
            .boolean_value
            .as_deref()
            .or(self.date_value.as_deref())
            .or(self.time_value.as_deref())
            .or(self.value.as_deref());

        let mut cell = Cell::with_value(CellValue::from_parts(
            self.value_type.as_deref(),
            value,
            self.currency.as_deref(),
            text,
        ));
        cell.set_formula(self.formula);
        cell.set_style(self.style);
        cell.set_repeated(self.repeated);
        cell.set_span(self.columns_spanned, self.rows_spanned);
        cell.set_covered(self.covered);
        cell
    }
}

fn parse_cell_attributes(e: &BytesStart) -> Result<CellBuilder> {
    let mut builder = CellBuilder {
        value_type: None,
        value: None,
        boolean_value: None,
        date_value: None,
        time_value: None,
        currency: None,
        formula: None,
        style: None,
        repeated: None,
        columns_spanned: 1,
        rows_spanned: 1,
        covered: false,
    };

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|_| Error::Xml("invalid cell attribute".to_string()))?;
        let value = attribute_string(&attr)?;
        match attr.key.as_ref() {
            b"office:value-type" => builder.value_type = Some(value),
            b"office:value" => builder.value = Some(value),
            b"office:boolean-value" => builder.boolean_value = Some(value),
            b"office:date-value" => builder.date_value = Some(value),
            b"office:time-value" => builder.time_value = Some(value),
            b"office:currency" => builder.currency = Some(value),
            b"table:formula" => builder.formula = Some(value),
            b"table:style-name" => builder.style = Some(value),
            b"table:number-columns-repeated" => builder.repeated = parse_repeat(&value),
            b"table:number-columns-spanned" => {
                builder.columns_spanned = value.parse().unwrap_or(1);
            },
            b"table:number-rows-spanned" => {
                builder.rows_spanned = value.parse().unwrap_or(1);
            },
            _ => {},
        }
    }

    Ok(builder)
}
