//! Table structures: the dense-addressed view over repeat-compressed rows,
//! columns and cells.

mod cache_map;
mod cell;
mod column;
mod row;
mod vault;

pub use cell::Cell;
pub use column::Column;
pub use row::{CellFilter, Row};
pub use vault::Repeatable;

use crate::coordinates::{CellCoordinate, ColumnIndex};
use crate::value::CellValue;
use crate::Result;
use cache_map::CacheMap;

/// A spreadsheet table (`table:table`).
///
/// The table owns its rows in the compact stored form (consecutive
/// identical rows are one stored row with a `table:number-rows-repeated`
/// count) plus a cache map presenting them densely, exactly as each
/// [`Row`] does one level down for its cells. Rows of different widths
/// coexist: short rows are conceptually padded with trailing empty cells
/// and only materialized on write.
///
/// # Examples
///
/// ```
/// use longan::{Cell, CellValue, Table};
///
/// let mut table = Table::new("Sheet1");
/// table.set_value("B3", 42.0).unwrap();
/// assert_eq!(table.get_value((1, 2)).unwrap(), CellValue::Float(42.0));
/// assert_eq!(table.size(), (2, 3));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    name: String,
    style: Option<String>,
    columns: Vec<Column>,
    colmap: CacheMap,
    rows: Vec<Row>,
    rowmap: CacheMap,
}

impl Table {
    /// Create a new empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The table name (`table:name`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the table.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The table style name (`table:style-name`), if any.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Set or clear the table style name.
    pub fn set_style(&mut self, style: Option<String>) {
        self.style = style;
    }

    /// Number of logical rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.rowmap.width()
    }

    /// Number of logical columns: the maximum width over all rows.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Row::width).max().unwrap_or(0)
    }

    /// `(width, height)` of the table.
    pub fn size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Whether the table stores no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    /// The stored rows, runs unexpanded. Dense access goes through
    /// [`Table::get_row`].
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get a copy of the logical row at `y`, stamped with its index.
    /// Reading past the end returns an empty row.
    pub fn get_row<C: ColumnIndex>(&self, y: C) -> Result<Row> {
        let y = y.resolve(self.height())?;
        let mut row = match self.rowmap.find_stored_index(y) {
            Some(index) => {
                let mut row = self.rows[index].clone();
                row.set_repeated(None);
                row
            },
            None => Row::new(),
        };
        row.stamp(Some(y));
        Ok(row)
    }

    /// Put `row` at index `y`, replacing the logical row there. Setting at
    /// the current height appends; setting past it pads with one repeated
    /// empty row first.
    pub fn set_row<C: ColumnIndex>(&mut self, y: C, mut row: Row) -> Result<()> {
        let y = y.resolve(self.height())?;
        row.stamp(None);

        let height = self.height();
        if y >= height {
            if y > height {
                let mut filler = Row::new();
                filler.set_repeated(Some(y - height));
                self.append_row(filler);
            }
            self.append_row(row);
            return Ok(());
        }

        vault::set_item(&mut self.rows, &mut self.rowmap, y, row)
    }

    /// Insert `row` at index `y`, shifting every row at or after `y` down
    /// by the row's repeat count. Inserting at or past the current height
    /// behaves like [`Table::set_row`].
    pub fn insert_row<C: ColumnIndex>(&mut self, y: C, mut row: Row) -> Result<()> {
        let y = y.resolve(self.height())?;
        row.stamp(None);

        if y >= self.height() {
            return self.set_row(y, row);
        }

        vault::insert_item(&mut self.rows, &mut self.rowmap, y, row)
    }

    /// Delete the logical row at `y`, shifting the rest of the table up.
    /// Deleting past the end is a no-op.
    pub fn delete_row<C: ColumnIndex>(&mut self, y: C) -> Result<()> {
        let y = y.resolve(self.height())?;
        if y >= self.height() {
            return Ok(());
        }
        vault::delete_item(&mut self.rows, &mut self.rowmap, y)
    }

    /// Append a row after the last stored row. The fast path for building
    /// tables top to bottom.
    pub fn append_row(&mut self, row: Row) {
        let repeat = row.repeat();
        self.rows.push(row);
        self.rowmap
            .insert_run(self.rowmap.len(), repeat)
            .expect("appending a run at the map tail");
    }

    /// Iterate one cloned, index-stamped row per logical position,
    /// expanding repeated rows. Each call returns a fresh iterator.
    pub fn traverse_rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.rows.iter().enumerate().flat_map(|(index, stored)| {
            let start = self.rowmap.run_start(index);
            let mut template = stored.clone();
            template.set_repeated(None);
            (0..stored.repeat()).map(move |offset| {
                let mut row = template.clone();
                row.stamp(Some(start + offset));
                row
            })
        })
    }

    /// All values of the logical row at `y`, repeats expanded.
    pub fn row_values<C: ColumnIndex>(&self, y: C) -> Result<Vec<CellValue>> {
        Ok(self.get_row(y)?.values())
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    /// Get a copy of the cell at `coord` (an `(x, y)` pair or an `"A1"`
    /// string), stamped with both coordinates. Reading past the edges
    /// returns an empty cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::Table;
    ///
    /// let table = Table::new("Sheet1");
    /// assert!(table.get_cell("AZ99").unwrap().value().is_empty());
    /// ```
    pub fn get_cell<C: CellCoordinate>(&self, coord: C) -> Result<Cell> {
        let (x, y) = coord.resolve(self.width(), self.height())?;
        match self.rowmap.find_stored_index(y) {
            Some(index) => {
                let mut cell = self.rows[index].get_cell(x)?;
                cell.stamp(Some(x), Some(y));
                Ok(cell)
            },
            None => {
                let mut cell = Cell::new();
                cell.stamp(Some(x), Some(y));
                Ok(cell)
            },
        }
    }

    /// Get a copy of the value at `coord`.
    pub fn get_value<C: CellCoordinate>(&self, coord: C) -> Result<CellValue> {
        Ok(self.get_cell(coord)?.value().clone())
    }

    /// Put `cell` at `coord`, splitting repeated rows and cells as needed
    /// and padding when the coordinate lies outside the current extent.
    pub fn set_cell<C: CellCoordinate>(&mut self, coord: C, cell: Cell) -> Result<()> {
        let (x, y) = coord.resolve(self.width(), self.height())?;
        self.with_row_mut(y, |row| row.set_cell(x, cell))
    }

    /// Put `value` in a fresh cell at `coord`.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::{CellValue, Table};
    ///
    /// let mut table = Table::new("Sheet1");
    /// table.set_value("A1", "title").unwrap();
    /// table.set_value((0, 1), 3.5).unwrap();
    /// assert_eq!(table.get_value("A2").unwrap(), CellValue::Float(3.5));
    /// ```
    pub fn set_value<C: CellCoordinate>(
        &mut self,
        coord: C,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        self.set_cell(coord, Cell::with_value(value))
    }

    /// Write a 2-D block of values with its top-left corner at `coord`.
    /// Rows of the block may have different lengths.
    pub fn set_values<C, I, J, V>(&mut self, coord: C, block: I) -> Result<()>
    where
        C: CellCoordinate,
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let (x, y) = coord.resolve(self.width(), self.height())?;
        for (dy, row_values) in block.into_iter().enumerate() {
            self.with_row_mut(y + dy, |row| {
                for (dx, value) in row_values.into_iter().enumerate() {
                    row.set_cell(x + dx, Cell::with_value(value))?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    /// Run a mutation against the logical row at `y`, materializing it
    /// first: the gap is padded when `y` lies past the end, and a row run
    /// is split when `y` addresses one occurrence of a repeated row.
    fn with_row_mut<F>(&mut self, y: usize, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Row) -> Result<()>,
    {
        let height = self.height();
        if y >= height {
            if y > height {
                let mut filler = Row::new();
                filler.set_repeated(Some(y - height));
                self.append_row(filler);
            }
            let mut row = Row::new();
            mutate(&mut row)?;
            self.append_row(row);
            return Ok(());
        }

        let index = self
            .rowmap
            .find_stored_index(y)
            .expect("dense index within height resolves");

        if self.rowmap.run_len(index) == 1 {
            // Sole occurrence: mutate the stored row in place.
            return mutate(&mut self.rows[index]);
        }

        // One occurrence of a repeated row: split the run around a
        // mutated copy.
        let mut row = self.rows[index].clone();
        row.set_repeated(None);
        mutate(&mut row)?;
        vault::set_item(&mut self.rows, &mut self.rowmap, y, row)
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// The stored column descriptors, runs unexpanded.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a copy of the column descriptor at `x`. Reading past the
    /// declared columns returns a default descriptor.
    pub fn get_column<C: ColumnIndex>(&self, x: C) -> Result<Column> {
        let x = x.resolve(self.colmap.width())?;
        Ok(match self.colmap.find_stored_index(x) {
            Some(index) => {
                let mut column = self.columns[index].clone();
                column.set_repeated(None);
                column
            },
            None => Column::new(),
        })
    }

    /// Put a column descriptor at `x`, padding with default descriptors
    /// when `x` lies past the declared columns.
    pub fn set_column<C: ColumnIndex>(&mut self, x: C, mut column: Column) -> Result<()> {
        let x = x.resolve(self.colmap.width())?;

        let declared = self.colmap.width();
        if x >= declared {
            if x > declared {
                let mut filler = Column::new();
                filler.set_repeated(Some(x - declared));
                self.append_column(filler);
            }
            column.set_repeated(None);
            self.append_column(column);
            return Ok(());
        }

        vault::set_item(&mut self.columns, &mut self.colmap, x, column)
    }

    /// Append a column descriptor after the last declared one.
    pub fn append_column(&mut self, column: Column) {
        let repeat = column.repeat();
        self.columns.push(column);
        self.colmap
            .insert_run(self.colmap.len(), repeat)
            .expect("appending a run at the map tail");
    }

    /// Insert a column at `x`: a descriptor slides into the declared
    /// columns, and every row wide enough to reach `x` has an empty cell
    /// inserted there. Shorter rows are left alone; their missing tail is
    /// already implicit empty cells.
    pub fn insert_column<C: ColumnIndex>(&mut self, x: C, column: Column) -> Result<()> {
        let x = x.resolve(self.width())?;

        if x < self.colmap.width() {
            vault::insert_item(&mut self.columns, &mut self.colmap, x, column)?;
        } else if !self.columns.is_empty() || !column.eq(&Column::new()) {
            self.set_column(x, column)?;
        }

        for row in &mut self.rows {
            if row.width() > x {
                row.insert_cell(x, Cell::new())?;
            }
        }
        Ok(())
    }

    /// Delete the column at `x`: the descriptor run shrinks, and every row
    /// wide enough to reach `x` has its cell there deleted.
    pub fn delete_column<C: ColumnIndex>(&mut self, x: C) -> Result<()> {
        let x = x.resolve(self.width())?;

        if x < self.colmap.width() {
            vault::delete_item(&mut self.columns, &mut self.colmap, x)?;
        }

        for row in &mut self.rows {
            if row.width() > x {
                row.delete_cell(x)?;
            }
        }
        Ok(())
    }

    /// All values of the logical column at `x`, one per row, top to
    /// bottom. Rows not reaching `x` contribute an empty value.
    pub fn column_values<C: ColumnIndex>(&self, x: C) -> Result<Vec<CellValue>> {
        let x = x.resolve(self.width())?;
        self.traverse_rows()
            .map(|row| row.get_value(x))
            .collect()
    }

    // ------------------------------------------------------------------
    // Normalization
    // ------------------------------------------------------------------

    /// Trim the table: every row loses its trailing empty cells, then
    /// trailing blank rows are dropped. A styled empty cell or row stops
    /// the trim unless `aggressive` is set. This is the width-optimizing
    /// pass run before serialization by size-conscious writers.
    pub fn rstrip(&mut self, aggressive: bool) {
        for row in &mut self.rows {
            row.rstrip(aggressive);
        }
        while matches!(self.rows.last(), Some(row) if row.is_blank(aggressive)) {
            self.rows.pop();
        }
        self.rebuild_row_map();
    }

    /// Recompute the row map from the stored rows' repeat attributes.
    pub(crate) fn rebuild_row_map(&mut self) {
        self.rowmap = CacheMap::from_runs(
            self.rows
                .iter()
                .map(|row| row.repeat())
                .enumerate(),
        )
        .expect("runs scanned in order rebuild cleanly");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new("Sample");
        table
            .set_values(
                "A1",
                [
                    vec!["a1", "b1", "c1"],
                    vec!["a2", "b2", "c2"],
                    vec!["a3", "b3", "c3"],
                ],
            )
            .unwrap();
        table
    }

    fn text(value: &CellValue) -> String {
        value.display_text()
    }

    #[test]
    fn test_build_and_size() {
        let table = sample_table();
        assert_eq!(table.size(), (3, 3));
        assert_eq!(text(&table.get_value("B2").unwrap()), "b2");
        assert_eq!(text(&table.get_value((2, 0)).unwrap()), "c1");
    }

    #[test]
    fn test_get_cell_past_edges_is_empty() {
        let table = sample_table();
        let cell = table.get_cell((10, 10)).unwrap();
        assert!(cell.value().is_empty());
        assert_eq!((cell.x(), cell.y()), (Some(10), Some(10)));
    }

    #[test]
    fn test_set_cell_pads_rows() {
        let mut table = Table::new("T");
        table.set_value("C5", 1.5).unwrap();

        assert_eq!(table.height(), 5);
        // One repeated filler row plus the written one.
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].repeat(), 4);
        assert_eq!(table.get_value((2, 4)).unwrap(), CellValue::Float(1.5));
        assert!(table.get_value("A1").unwrap().is_empty());
    }

    #[test]
    fn test_set_cell_splits_repeated_row() {
        let mut table = Table::new("T");
        let mut row = Row::new();
        row.set_values([0.0, 0.0]);
        row.set_repeated(Some(6));
        table.append_row(row);
        assert_eq!(table.height(), 6);

        table.set_value((0, 3), 9.0).unwrap();

        assert_eq!(table.height(), 6);
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.rows()[0].repeat(), 3);
        assert_eq!(table.rows()[2].repeat(), 2);
        assert_eq!(table.get_value((0, 3)).unwrap(), CellValue::Float(9.0));
        assert_eq!(table.get_value((0, 2)).unwrap(), CellValue::Float(0.0));
        assert_eq!(table.get_value((0, 4)).unwrap(), CellValue::Float(0.0));
    }

    #[test]
    fn test_row_round_trip() {
        let table = sample_table();
        let row = table.get_row(1).unwrap();
        assert_eq!(row.y(), Some(1));
        assert_eq!(row.values().len(), 3);
        assert_eq!(text(&row.get_value(0).unwrap()), "a2");
    }

    #[test]
    fn test_insert_and_delete_row() {
        let mut table = sample_table();
        let mut row = Row::new();
        row.set_values(["x", "y", "z"]);

        table.insert_row(1, row).unwrap();
        assert_eq!(table.height(), 4);
        assert_eq!(text(&table.get_value("A2").unwrap()), "x");
        assert_eq!(text(&table.get_value("A3").unwrap()), "a2");

        table.delete_row(1).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(text(&table.get_value("A2").unwrap()), "a2");
    }

    #[test]
    fn test_delete_row_shrinks_repeated_run() {
        let mut table = Table::new("T");
        let mut row = Row::new();
        row.set_values([1.0]);
        row.set_repeated(Some(4));
        table.append_row(row);

        table.delete_row(2).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].repeat(), 3);
    }

    #[test]
    fn test_insert_column() {
        let mut table = sample_table();
        table.insert_column(1, Column::new()).unwrap();

        assert_eq!(table.width(), 4);
        assert_eq!(text(&table.get_value("A1").unwrap()), "a1");
        assert!(table.get_value("B1").unwrap().is_empty());
        assert_eq!(text(&table.get_value("C1").unwrap()), "b1");
        assert_eq!(text(&table.get_value("D3").unwrap()), "c3");
    }

    #[test]
    fn test_delete_column() {
        let mut table = sample_table();
        table.delete_column("B").unwrap();

        assert_eq!(table.width(), 2);
        assert_eq!(text(&table.get_value("B1").unwrap()), "c1");
        assert_eq!(table.column_values(1).unwrap().len(), 3);
    }

    #[test]
    fn test_column_ops_skip_short_rows() {
        let mut table = Table::new("T");
        let mut long = Row::new();
        long.set_values([1.0, 2.0, 3.0, 4.0]);
        table.append_row(long);
        let mut short = Row::new();
        short.set_values([5.0]);
        table.append_row(short);

        table.insert_column(2, Column::new()).unwrap();
        assert_eq!(table.rows()[0].width(), 5);
        // The short row was not physically padded.
        assert_eq!(table.rows()[1].width(), 1);
        assert!(table.get_value((2, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_column_values_with_ragged_rows() {
        let mut table = Table::new("T");
        let mut long = Row::new();
        long.set_values(["a", "b"]);
        table.append_row(long);
        table.append_row(Row::new());

        let values = table.column_values("B").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(text(&values[0]), "b");
        assert!(values[1].is_empty());
    }

    #[test]
    fn test_traverse_rows_expands_repeats() {
        let mut table = Table::new("T");
        let mut row = Row::new();
        row.set_values([1.0]);
        row.set_repeated(Some(5));
        table.append_row(row);
        table.append_row(Row::new());

        assert_eq!(table.traverse_rows().count(), 6);
        let indices: Vec<Option<usize>> = table.traverse_rows().map(|r| r.y()).collect();
        assert_eq!(indices, (0..6).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn test_rstrip() {
        let mut table = Table::new("T");
        table.set_value("B2", "x").unwrap();
        table.set_value("E9", "").unwrap();
        // E9 got an empty text value: an actual value, kept.
        assert_eq!(table.size(), (5, 9));

        table.set_cell("E9", Cell::new()).unwrap();
        table.rstrip(false);
        assert_eq!(table.size(), (2, 2));
    }

    #[test]
    fn test_set_values_block() {
        let mut table = Table::new("T");
        table
            .set_values((1, 1), [vec![1.0, 2.0], vec![3.0, 4.0]])
            .unwrap();
        assert_eq!(table.size(), (3, 3));
        assert_eq!(table.get_value("B2").unwrap(), CellValue::Float(1.0));
        assert_eq!(table.get_value("C3").unwrap(), CellValue::Float(4.0));
        assert!(table.get_value("A1").unwrap().is_empty());
    }
}
