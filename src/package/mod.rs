//! ODF package (ZIP archive) handling.
//!
//! An ODF document is a ZIP archive: a `mimetype` marker (first entry,
//! stored uncompressed), the XML parts (`content.xml`, `styles.xml`,
//! `meta.xml`), and a `META-INF/manifest.xml` listing everything.

mod manifest;
mod writer;

pub use manifest::{Manifest, ManifestEntry};
pub use writer::PackageWriter;

use crate::constants::MIMETYPE_PATH;
use crate::{Error, Result};
use std::cell::RefCell;
use std::io::{Read, Seek};

/// A read-open ODF package.
pub struct Package<R> {
    archive: RefCell<zip::ZipArchive<R>>,
    manifest: Manifest,
    mimetype: String,
}

impl<R: Read + Seek> Package<R> {
    /// Open an ODF package from a reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|_| Error::InvalidFormat("not a ZIP archive".to_string()))?;

        let mimetype = Self::read_mimetype(&mut archive)?;
        let manifest = Manifest::from_archive(&mut archive)?;

        Ok(Self {
            archive: RefCell::new(archive),
            manifest,
            mimetype,
        })
    }

    /// Read the MIME type from the `mimetype` entry.
    fn read_mimetype(archive: &mut zip::ZipArchive<R>) -> Result<String> {
        let mut file = archive.by_name(MIMETYPE_PATH).map_err(|_| {
            Error::InvalidFormat("no mimetype entry found in ODF package".to_string())
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content.trim().to_string())
    }

    /// The package MIME type.
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// The parsed manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Read a part from the package by path.
    pub fn part(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::ComponentNotFound(path.to_string()))?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Read a part as UTF-8 text.
    pub fn part_str(&self, path: &str) -> Result<String> {
        String::from_utf8(self.part(path)?)
            .map_err(|_| Error::InvalidFormat(format!("part '{}' is not valid UTF-8", path)))
    }

    /// Check whether a part exists.
    pub fn has_part(&self, path: &str) -> bool {
        self.archive.borrow_mut().by_name(path).is_ok()
    }

    /// List all part paths in the package.
    pub fn parts(&self) -> Result<Vec<String>> {
        let mut archive = self.archive.borrow_mut();
        let mut paths = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            paths.push(archive.by_index(i)?.name().to_string());
        }
        Ok(paths)
    }
}
