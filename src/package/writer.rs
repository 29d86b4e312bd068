//! ODF package writing.
//!
//! Builds a valid ODF ZIP archive: the `mimetype` entry comes first and is
//! stored uncompressed so format sniffers can read it from the raw bytes,
//! every other part is deflated, and a manifest is generated from the
//! parts added.

use crate::constants::{MANIFEST_PATH, MIMETYPE_PATH};
use crate::{Error, Result};
use std::io::{Cursor, Seek, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Builder for ODF packages.
///
/// # Examples
///
/// ```
/// use longan::package::PackageWriter;
///
/// # fn main() -> longan::Result<()> {
/// let mut writer = PackageWriter::new();
/// writer.set_mimetype("application/vnd.oasis.opendocument.spreadsheet")?;
/// writer.add_part("content.xml", b"<office:document-content/>")?;
/// let bytes = writer.finish_to_bytes()?;
/// assert!(!bytes.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct PackageWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    mimetype: Option<String>,
    manifest_entries: Vec<(String, String)>,
}

impl PackageWriter<Cursor<Vec<u8>>> {
    /// Create a package writer that writes to memory.
    pub fn new() -> Self {
        Self::with_writer(Cursor::new(Vec::new()))
    }

    /// Finish writing and return the package bytes.
    pub fn finish_to_bytes(self) -> Result<Vec<u8>> {
        Ok(self.finish()?.into_inner())
    }
}

impl Default for PackageWriter<Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Seek> PackageWriter<W> {
    /// Create a package writer over a custom writer.
    pub fn with_writer(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            mimetype: None,
            manifest_entries: Vec::new(),
        }
    }

    /// Set the document MIME type. Writes the `mimetype` entry on the
    /// spot: call this before adding parts so it lands first in the
    /// archive, stored uncompressed, per the ODF packaging specification.
    pub fn set_mimetype(&mut self, mimetype: &str) -> Result<()> {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        self.zip.start_file(MIMETYPE_PATH, options)?;
        self.zip.write_all(mimetype.as_bytes())?;

        self.mimetype = Some(mimetype.to_string());
        self.manifest_entries
            .push(("/".to_string(), mimetype.to_string()));
        Ok(())
    }

    /// Add a part with a media type guessed from its extension.
    pub fn add_part(&mut self, path: &str, content: &[u8]) -> Result<()> {
        self.add_part_with_media_type(path, content, Self::guess_media_type(path))
    }

    /// Add a part with an explicit manifest media type.
    pub fn add_part_with_media_type(
        &mut self,
        path: &str,
        content: &[u8],
        media_type: &str,
    ) -> Result<()> {
        self.manifest_entries
            .push((path.to_string(), media_type.to_string()));

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        self.zip.start_file(path, options)?;
        self.zip.write_all(content)?;
        Ok(())
    }

    fn guess_media_type(path: &str) -> &'static str {
        if path.ends_with(".xml") {
            "text/xml"
        } else if path.ends_with(".png") {
            "image/png"
        } else if path.ends_with(".jpg") || path.ends_with(".jpeg") {
            "image/jpeg"
        } else {
            "application/octet-stream"
        }
    }

    fn generate_manifest(&self) -> String {
        let mut manifest = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.3">
"#,
        );

        for (full_path, media_type) in &self.manifest_entries {
            manifest.push_str("  <manifest:file-entry manifest:full-path=\"");
            push_escaped(&mut manifest, full_path);
            manifest.push_str("\" manifest:media-type=\"");
            push_escaped(&mut manifest, media_type);
            manifest.push_str("\"/>\n");
        }

        manifest.push_str("</manifest:manifest>\n");
        manifest
    }

    /// Finalize the archive: write the manifest and the ZIP directory.
    /// Fails if no MIME type was set.
    pub fn finish(mut self) -> Result<W> {
        if self.mimetype.is_none() {
            return Err(Error::InvalidFormat("MIME type not set".to_string()));
        }

        let manifest = self.generate_manifest();
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        self.zip.start_file(MANIFEST_PATH, options)?;
        self.zip.write_all(manifest.as_bytes())?;

        Ok(self.zip.finish()?)
    }
}

fn push_escaped(output: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '"' => output.push_str("&quot;"),
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ODF_SPREADSHEET;
    use crate::package::Package;

    #[test]
    fn test_round_trip() {
        let mut writer = PackageWriter::new();
        writer.set_mimetype(ODF_SPREADSHEET).unwrap();
        writer.add_part("content.xml", b"<x/>").unwrap();
        let bytes = writer.finish_to_bytes().unwrap();

        let package = Package::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(package.mimetype(), ODF_SPREADSHEET);
        assert!(package.has_part("content.xml"));
        assert_eq!(package.part("content.xml").unwrap(), b"<x/>");
        assert!(package.manifest().has_path("content.xml"));
        assert!(package.part("missing.xml").is_err());
    }

    #[test]
    fn test_mimetype_required() {
        let writer = PackageWriter::new();
        assert!(writer.finish().is_err());
    }
}
