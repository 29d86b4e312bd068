//! longan: a document object model for OpenDocument spreadsheets.
//!
//! This library reads a .ods package into a typed, mutable tree of tables,
//! rows and cells, and serializes it back to a valid ODF package.
//!
//! The distinguishing piece is the coordinate-addressing layer: ODF stores
//! consecutive identical cells and rows run-length-encoded
//! (`table:number-columns-repeated`, `table:number-rows-repeated`), and
//! longan presents that compact form as an ordinary dense grid, addressed
//! by `(column, row)` pairs or `"A1"` strings, while keeping edits
//! incremental and the underlying runs intact. A region of thousands of
//! identical cells costs one stored element, and writing into the middle
//! of it splits exactly that element.
//!
//! # Example: creating a spreadsheet
//!
//! ```
//! use longan::{Spreadsheet, Table};
//!
//! # fn main() -> longan::Result<()> {
//! let mut doc = Spreadsheet::new();
//!
//! let mut table = Table::new("Inventory");
//! table.set_value("A1", "item")?;
//! table.set_value("B1", "count")?;
//! table.set_value("A2", "widget")?;
//! table.set_value("B2", 12.0)?;
//! doc.add_table(table)?;
//!
//! let bytes = doc.to_bytes()?;
//! assert!(!bytes.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Example: dense addressing over repeated runs
//!
//! ```
//! use longan::{Cell, CellValue, Row};
//!
//! # fn main() -> longan::Result<()> {
//! // One stored cell covering ten columns.
//! let mut row = Row::new();
//! row.append_cell_repeated(Cell::new(), Some(10));
//! assert_eq!(row.width(), 10);
//!
//! // Writing inside the run splits it; the width is unchanged.
//! row.set_cell(5, Cell::with_value("X"))?;
//! assert_eq!(row.width(), 10);
//! assert_eq!(*row.get_cell(5)?.value(), CellValue::Text("X".into()));
//! assert!(row.get_cell(4)?.value().is_empty());
//! # Ok(())
//! # }
//! ```

/// ODF constants, MIME types and part paths
pub mod constants;
/// Cell coordinate conversions (A1 notation)
pub mod coordinates;
/// ODF lexical data type conversions
pub mod datatype;
/// Document metadata (meta.xml)
pub mod metadata;
/// ODF package (ZIP container) reading and writing
pub mod package;

mod content;
mod error;
mod spreadsheet;
mod table;
mod value;

pub use coordinates::{CellCoord, CellRange};
pub use error::{Error, Result};
pub use metadata::{DocumentStatistics, Metadata};
pub use spreadsheet::Spreadsheet;
pub use table::{Cell, CellFilter, Column, Repeatable, Row, Table};
pub use value::{CellValue, ValueType};
