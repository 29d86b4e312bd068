//! Document metadata (meta.xml) parsing and regeneration.

use crate::constants::{NAMESPACES, OFFICE_VERSION};
use crate::content::{push_escaped_attr, push_escaped_text};
use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// Generator string stamped into documents this crate writes.
const GENERATOR: &str = concat!("longan/", env!("CARGO_PKG_VERSION"));

/// Document metadata carried in meta.xml.
///
/// Dates are kept in their ODF lexical form; [`crate::datatype::DateTimeOdf`]
/// decodes them on demand.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,
    /// Document description
    pub description: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Keywords
    pub keywords: Vec<String>,
    /// Creator/author
    pub creator: Option<String>,
    /// Document language
    pub language: Option<String>,
    /// Creation date (ISO 8601)
    pub creation_date: Option<String>,
    /// Last modification date (ISO 8601)
    pub modification_date: Option<String>,
    /// Generator application
    pub generator: Option<String>,
    /// Statistics recorded by the last editor
    pub statistics: DocumentStatistics,
    /// User-defined properties (`meta:user-defined`)
    pub user_defined: HashMap<String, String>,
}

/// Document statistics from `meta:document-statistic`.
#[derive(Debug, Clone, Default)]
pub struct DocumentStatistics {
    pub table_count: Option<u32>,
    pub cell_count: Option<u32>,
    pub object_count: Option<u32>,
}

impl Metadata {
    /// Parse metadata out of meta.xml content.
    pub fn from_xml(xml_content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml_content);
        let mut buf = Vec::new();
        let mut metadata = Metadata::default();

        // Path-free state machine: meta.xml is flat under office:meta.
        let mut current: Option<Field> = None;
        let mut text = String::new();
        let mut user_defined_name: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    current = match e.name().as_ref() {
                        b"dc:title" => Some(Field::Title),
                        b"dc:description" => Some(Field::Description),
                        b"dc:subject" => Some(Field::Subject),
                        b"dc:creator" => Some(Field::Creator),
                        b"dc:language" => Some(Field::Language),
                        b"dc:date" => Some(Field::ModificationDate),
                        b"meta:keyword" => Some(Field::Keyword),
                        b"meta:creation-date" => Some(Field::CreationDate),
                        b"meta:generator" => Some(Field::Generator),
                        b"meta:user-defined" => {
                            user_defined_name = None;
                            for attr_result in e.attributes() {
                                let attr = attr_result.map_err(|_| {
                                    Error::Xml("invalid metadata attribute".to_string())
                                })?;
                                if attr.key.as_ref() == b"meta:name" {
                                    user_defined_name = Some(
                                        attr.unescape_value()
                                            .map_err(|e| Error::Xml(e.to_string()))?
                                            .into_owned(),
                                    );
                                }
                            }
                            Some(Field::UserDefined)
                        },
                        _ => None,
                    };
                    text.clear();
                },
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"meta:document-statistic" {
                        metadata.statistics = Self::parse_statistics(e)?;
                    }
                },
                Ok(Event::Text(ref t)) => {
                    if current.is_some() {
                        let fragment = t
                            .unescape()
                            .map_err(|e| Error::Xml(format!("invalid metadata text: {}", e)))?;
                        text.push_str(&fragment);
                    }
                },
                Ok(Event::End(_)) => {
                    if let Some(field) = current.take() {
                        let value = text.trim();
                        if !value.is_empty() {
                            metadata.assign(field, value, user_defined_name.take());
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("metadata parsing error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(metadata)
    }

    fn assign(&mut self, field: Field, value: &str, user_defined_name: Option<String>) {
        let value = value.to_string();
        match field {
            Field::Title => self.title = Some(value),
            Field::Description => self.description = Some(value),
            Field::Subject => self.subject = Some(value),
            Field::Creator => self.creator = Some(value),
            Field::Language => self.language = Some(value),
            Field::Keyword => self.keywords.push(value),
            Field::CreationDate => self.creation_date = Some(value),
            Field::ModificationDate => self.modification_date = Some(value),
            Field::Generator => self.generator = Some(value),
            Field::UserDefined => {
                if let Some(name) = user_defined_name {
                    self.user_defined.insert(name, value);
                }
            },
        }
    }

    fn parse_statistics(e: &quick_xml::events::BytesStart) -> Result<DocumentStatistics> {
        let mut statistics = DocumentStatistics::default();

        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|_| Error::Xml("invalid statistics attribute".to_string()))?;
            let Ok(value) = attr
                .unescape_value()
                .map_err(|e| Error::Xml(e.to_string()))?
                .parse::<u32>()
            else {
                continue;
            };
            match attr.key.as_ref() {
                b"meta:table-count" => statistics.table_count = Some(value),
                b"meta:cell-count" => statistics.cell_count = Some(value),
                b"meta:object-count" => statistics.object_count = Some(value),
                _ => {},
            }
        }

        Ok(statistics)
    }

    /// Serialize back to a complete meta.xml document. The modification
    /// date is stamped with the current time and the generator with this
    /// crate's signature.
    pub fn to_xml(&self) -> String {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        let mut out = String::with_capacity(1024);
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        out.push_str("<office:document-meta");
        for (name, uri) in NAMESPACES {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            push_escaped_attr(&mut out, uri);
            out.push('"');
        }
        out.push_str(" office:version=\"");
        out.push_str(OFFICE_VERSION);
        out.push_str("\"><office:meta>");

        push_element(&mut out, "meta:generator", GENERATOR);
        push_optional(&mut out, "dc:title", self.title.as_deref());
        push_optional(&mut out, "dc:description", self.description.as_deref());
        push_optional(&mut out, "dc:subject", self.subject.as_deref());
        push_optional(&mut out, "dc:creator", self.creator.as_deref());
        push_optional(&mut out, "dc:language", self.language.as_deref());
        for keyword in &self.keywords {
            push_element(&mut out, "meta:keyword", keyword);
        }
        push_optional(&mut out, "meta:creation-date", self.creation_date.as_deref());
        push_element(&mut out, "dc:date", &now);

        let mut names: Vec<&String> = self.user_defined.keys().collect();
        names.sort();
        for name in names {
            out.push_str("<meta:user-defined meta:name=\"");
            push_escaped_attr(&mut out, name);
            out.push_str("\">");
            push_escaped_text(&mut out, &self.user_defined[name]);
            out.push_str("</meta:user-defined>");
        }

        out.push_str("</office:meta></office:document-meta>");
        out
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Description,
    Subject,
    Creator,
    Language,
    Keyword,
    CreationDate,
    ModificationDate,
    Generator,
    UserDefined,
}

fn push_element(out: &mut String, tag: &str, value: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    push_escaped_text(out, value);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn push_optional(out: &mut String, tag: &str, value: Option<&str>) {
    if let Some(value) = value {
        push_element(out, tag, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0" office:version="1.3">
  <office:meta>
    <meta:generator>SomeOffice/7.6</meta:generator>
    <dc:title>Budget &amp; Forecast</dc:title>
    <dc:creator>A. Person</dc:creator>
    <meta:keyword>budget</meta:keyword>
    <meta:keyword>2024</meta:keyword>
    <meta:creation-date>2024-01-01T09:00:00Z</meta:creation-date>
    <dc:date>2024-02-01T10:30:00Z</dc:date>
    <meta:document-statistic meta:table-count="2" meta:cell-count="40"/>
    <meta:user-defined meta:name="Department">Finance</meta:user-defined>
  </office:meta>
</office:document-meta>"#;

    #[test]
    fn test_parse() {
        let metadata = Metadata::from_xml(SAMPLE).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Budget & Forecast"));
        assert_eq!(metadata.creator.as_deref(), Some("A. Person"));
        assert_eq!(metadata.keywords, vec!["budget", "2024"]);
        assert_eq!(metadata.generator.as_deref(), Some("SomeOffice/7.6"));
        assert_eq!(
            metadata.creation_date.as_deref(),
            Some("2024-01-01T09:00:00Z"),
        );
        assert_eq!(metadata.statistics.table_count, Some(2));
        assert_eq!(metadata.statistics.cell_count, Some(40));
        assert_eq!(metadata.user_defined.get("Department").unwrap(), "Finance");
    }

    #[test]
    fn test_round_trip() {
        let metadata = Metadata::from_xml(SAMPLE).unwrap();
        let xml = metadata.to_xml();
        let reparsed = Metadata::from_xml(&xml).unwrap();

        assert_eq!(reparsed.title, metadata.title);
        assert_eq!(reparsed.keywords, metadata.keywords);
        assert_eq!(reparsed.creation_date, metadata.creation_date);
        assert_eq!(reparsed.user_defined, metadata.user_defined);
        // The writer stamps its own generator.
        assert_eq!(reparsed.generator.as_deref(), Some(GENERATOR));
    }

    #[test]
    fn test_empty_document() {
        let metadata = Metadata::from_xml(
            r#"<office:document-meta><office:meta/></office:document-meta>"#,
        )
        .unwrap();
        assert!(metadata.title.is_none());
        assert!(metadata.keywords.is_empty());

        // A default metadata block still serializes to a valid document.
        assert!(metadata.to_xml().contains("meta:generator"));
    }
}
