//! ODF manifest (META-INF/manifest.xml) parsing.

use crate::constants::{MANIFEST_PATH, ODF_SPREADSHEET};
use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{Read, Seek};

/// The package manifest: one entry per file in the package.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Media type of the root document entry ("/")
    pub mimetype: String,
    /// Entries keyed by full path
    pub entries: HashMap<String, ManifestEntry>,
}

/// One manifest file entry.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub full_path: String,
    pub media_type: String,
}

impl Manifest {
    /// Read and parse the manifest out of a ZIP archive.
    pub fn from_archive<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Result<Self> {
        let mut file = archive
            .by_name(MANIFEST_PATH)
            .map_err(|_| Error::InvalidFormat("no manifest.xml found in ODF package".to_string()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        drop(file);

        Self::parse(&content)
    }

    /// Parse manifest XML content.
    pub fn parse(xml_content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml_content);
        let mut buf = Vec::new();
        let mut entries = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"manifest:file-entry"
                        && let Some(entry) = Self::parse_file_entry(e)?
                    {
                        entries.insert(entry.full_path.clone(), entry);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("manifest parsing error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        let mimetype = entries
            .get("/")
            .map(|entry| entry.media_type.clone())
            .unwrap_or_else(|| ODF_SPREADSHEET.to_string());

        Ok(Self { mimetype, entries })
    }

    fn parse_file_entry(e: &quick_xml::events::BytesStart) -> Result<Option<ManifestEntry>> {
        let mut full_path = String::new();
        let mut media_type = String::new();

        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|_| Error::Xml("invalid attribute in manifest".to_string()))?;
            let value = String::from_utf8(attr.value.to_vec())
                .map_err(|_| Error::Xml("invalid UTF-8 in manifest".to_string()))?;

            match attr.key.as_ref() {
                b"manifest:full-path" => full_path = value,
                b"manifest:media-type" => media_type = value,
                _ => {},
            }
        }

        if full_path.is_empty() {
            return Ok(None);
        }

        Ok(Some(ManifestEntry {
            full_path,
            media_type,
        }))
    }

    /// Media type recorded for a path.
    pub fn media_type(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(|entry| entry.media_type.as_str())
    }

    /// Check whether a path is listed.
    pub fn has_path(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.3">
  <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
  <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="styles.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#;

    #[test]
    fn test_parse() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.mimetype, ODF_SPREADSHEET);
        assert!(manifest.has_path("content.xml"));
        assert_eq!(manifest.media_type("styles.xml"), Some("text/xml"));
        assert!(!manifest.has_path("meta.xml"));
    }

    #[test]
    fn test_parse_without_root_entry() {
        let manifest = Manifest::parse(
            r#"<manifest:manifest><manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/></manifest:manifest>"#,
        )
        .unwrap();
        assert_eq!(manifest.mimetype, ODF_SPREADSHEET);
    }
}
