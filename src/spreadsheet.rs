//! The top-level spreadsheet document.

use crate::constants::{
    CONTENT_PATH, META_PATH, ODF_SPREADSHEET, STYLES_PATH, is_spreadsheet_mimetype,
};
use crate::content::{default_styles_xml, parse_content, write_content};
use crate::metadata::Metadata;
use crate::package::{Package, PackageWriter};
use crate::table::Table;
use crate::{Error, Result};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// An OpenDocument spreadsheet: the mutable DOM over a .ods package.
///
/// Open one, address its tables densely, and save it back; the compact
/// repeat-compressed XML representation is preserved across the trip.
///
/// # Examples
///
/// ```no_run
/// use longan::{Cell, Spreadsheet};
///
/// # fn main() -> longan::Result<()> {
/// let mut doc = Spreadsheet::open("budget.ods")?;
/// let table = doc.table_mut("Sheet1")?;
/// table.set_value("B3", 42.0)?;
/// doc.save("budget-out.ods")?;
/// # Ok(())
/// # }
/// ```
pub struct Spreadsheet {
    tables: Vec<Table>,
    metadata: Metadata,
    mimetype: String,
    /// styles.xml carried through save/load untouched
    styles_xml: Option<String>,
}

impl Spreadsheet {
    /// Create a new empty spreadsheet.
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            metadata: Metadata::default(),
            mimetype: ODF_SPREADSHEET.to_string(),
            styles_xml: None,
        }
    }

    /// Open a .ods file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    /// Read a spreadsheet out of in-memory package bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Read a spreadsheet from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let package = Package::from_reader(reader)?;

        let mimetype = package.mimetype().to_string();
        if !is_spreadsheet_mimetype(&mimetype) {
            return Err(Error::InvalidFormat(format!(
                "not a spreadsheet document: {}",
                mimetype
            )));
        }

        let content = package.part_str(CONTENT_PATH)?;
        let tables = parse_content(&content)?;

        let styles_xml = package.part_str(STYLES_PATH).ok();
        let metadata = match package.part_str(META_PATH) {
            Ok(meta) => Metadata::from_xml(&meta)?,
            Err(_) => Metadata::default(),
        };

        Ok(Self {
            tables,
            metadata,
            mimetype,
            styles_xml,
        })
    }

    /// The document MIME type.
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// The document metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Mutable access to the document metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// All tables, in document order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Mutable access to all tables.
    pub fn tables_mut(&mut self) -> &mut Vec<Table> {
        &mut self.tables
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| Error::ComponentNotFound(format!("table '{}'", name)))
    }

    /// Look up a table by name, mutably.
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .iter_mut()
            .find(|table| table.name() == name)
            .ok_or_else(|| Error::ComponentNotFound(format!("table '{}'", name)))
    }

    /// Append a table. Table names must be unique within a document.
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.tables.iter().any(|t| t.name() == table.name()) {
            return Err(Error::InvalidArgument(format!(
                "a table named '{}' already exists",
                table.name()
            )));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Remove and return the table at `index`.
    pub fn remove_table(&mut self, index: usize) -> Result<Table> {
        if index >= self.tables.len() {
            return Err(Error::ComponentNotFound(format!("table index {}", index)));
        }
        Ok(self.tables.remove(index))
    }

    /// Save to a .ods file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Serialize to in-memory package bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PackageWriter::new();
        writer.set_mimetype(&self.mimetype)?;

        let content = write_content(&self.tables);
        writer.add_part(CONTENT_PATH, content.as_bytes())?;

        let default_styles;
        let styles = match &self.styles_xml {
            Some(styles) => styles.as_str(),
            None => {
                default_styles = default_styles_xml();
                &default_styles
            },
        };
        writer.add_part(STYLES_PATH, styles.as_bytes())?;

        let meta = self.metadata.to_xml();
        writer.add_part(META_PATH, meta.as_bytes())?;

        writer.finish_to_bytes()
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use crate::value::CellValue;

    fn sample_document() -> Spreadsheet {
        let mut doc = Spreadsheet::new();
        let mut table = Table::new("Data");
        table.set_value("A1", "name").unwrap();
        table.set_value("B1", "amount").unwrap();
        table.set_value("A2", "widget").unwrap();
        table.set_value("B2", 12.5).unwrap();
        doc.add_table(table).unwrap();
        doc.metadata_mut().title = Some("Inventory".to_string());
        doc
    }

    #[test]
    fn test_package_round_trip() {
        let doc = sample_document();
        let bytes = doc.to_bytes().unwrap();

        let reopened = Spreadsheet::from_bytes(bytes).unwrap();
        assert_eq!(reopened.mimetype(), ODF_SPREADSHEET);
        assert_eq!(reopened.tables().len(), 1);
        assert_eq!(reopened.metadata().title.as_deref(), Some("Inventory"));

        let table = reopened.table("Data").unwrap();
        assert_eq!(
            table.get_value("A2").unwrap(),
            CellValue::Text("widget".to_string()),
        );
        assert_eq!(table.get_value("B2").unwrap(), CellValue::Float(12.5));
    }

    #[test]
    fn test_repeat_runs_survive_round_trip() {
        let mut doc = Spreadsheet::new();
        let mut table = Table::new("Sparse");
        table.set_value("A1", 1.0).unwrap();
        // A sparse write far away pads with repeated fillers.
        table.set_value("AZ100", 2.0).unwrap();
        doc.add_table(table).unwrap();

        let reopened = Spreadsheet::from_bytes(doc.to_bytes().unwrap()).unwrap();
        let table = reopened.table("Sparse").unwrap();

        assert_eq!(table.height(), 100);
        assert_eq!(table.get_value("AZ100").unwrap(), CellValue::Float(2.0));
        // The 98-row gap is still two stored rows (filler + target)
        // after one stored data row.
        assert_eq!(table.rows().len(), 3);
    }

    #[test]
    fn test_mutate_and_save() {
        let mut doc = sample_document();
        doc.table_mut("Data")
            .unwrap()
            .set_cell("C1", Cell::with_value(true))
            .unwrap();

        let reopened = Spreadsheet::from_bytes(doc.to_bytes().unwrap()).unwrap();
        assert_eq!(
            reopened.table("Data").unwrap().get_value("C1").unwrap(),
            CellValue::Boolean(true),
        );
    }

    #[test]
    fn test_duplicate_table_name_rejected() {
        let mut doc = Spreadsheet::new();
        doc.add_table(Table::new("One")).unwrap();
        assert!(doc.add_table(Table::new("One")).is_err());
        assert!(doc.table("Two").is_err());
    }

    #[test]
    fn test_save_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ods");

        sample_document().save(&path).unwrap();
        let reopened = Spreadsheet::open(&path).unwrap();
        assert_eq!(reopened.tables().len(), 1);
    }

    #[test]
    fn test_rejects_non_spreadsheet() {
        let mut writer = PackageWriter::new();
        writer
            .set_mimetype("application/vnd.oasis.opendocument.text")
            .unwrap();
        writer.add_part(CONTENT_PATH, b"<x/>").unwrap();
        let bytes = writer.finish_to_bytes().unwrap();

        assert!(matches!(
            Spreadsheet::from_bytes(bytes),
            Err(Error::InvalidFormat(_)),
        ));
    }
}
