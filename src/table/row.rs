//! Row structures for spreadsheet tables.

use super::cache_map::CacheMap;
use super::cell::Cell;
use super::vault::{self, Repeatable};
use crate::coordinates::ColumnIndex;
use crate::value::{CellValue, ValueType};
use crate::{Error, Result};
use regex::Regex;

/// A table row.
///
/// A row owns its cells in the compact stored form (consecutive identical
/// cells are one stored cell with a repeat count) together with the cache
/// map that presents them as a dense, 0-based sequence of columns. All
/// public accessors address dense columns; the repeat compression is not
/// observable through them except via [`Row::cells`].
///
/// Reading past the end yields empty cells rather than erroring, and
/// writing past the end pads, matching the infinite sparse grid ODF tables
/// conceptually are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
    cmap: CacheMap,
    repeated: Option<usize>,
    style: Option<String>,
    y: Option<usize>,
}

impl Row {
    /// Create a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of logical cells in the row.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::{Cell, Row};
    ///
    /// let mut row = Row::new();
    /// row.append_cell_repeated(Cell::new(), Some(10));
    /// assert_eq!(row.width(), 10);
    /// ```
    #[inline]
    pub fn width(&self) -> usize {
        self.cmap.width()
    }

    /// Whether the row stores no cells at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The row style name (`table:style-name`), if any.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Set or clear the row style name.
    pub fn set_style(&mut self, style: Option<String>) {
        self.style = style;
    }

    /// The logical row index, stamped on rows returned by
    /// [`crate::table::Table`] getters. `None` on free-standing rows.
    #[inline]
    pub fn y(&self) -> Option<usize> {
        self.y
    }

    pub(crate) fn stamp(&mut self, y: Option<usize>) {
        self.y = y;
    }

    /// The stored cells, runs unexpanded. Mostly useful to serialization
    /// and tests; dense access goes through [`Row::get_cell`].
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get a copy of the cell at column `x`, stamped with its coordinates.
    ///
    /// Columns accept non-negative integers, negative integers (resolved
    /// from the end of the row) and column names (`"C"`). Reading past the
    /// end returns an empty cell. The returned cell is independent of the
    /// row: mutate it freely, then write it back with [`Row::set_cell`].
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::{Cell, CellValue, Row};
    ///
    /// let mut row = Row::new();
    /// row.set_cell(2, Cell::with_value("x")).unwrap();
    /// assert_eq!(*row.get_cell("C").unwrap().value(), CellValue::Text("x".into()));
    /// assert_eq!(*row.get_cell(-1).unwrap().value(), CellValue::Text("x".into()));
    /// assert!(row.get_cell(99).unwrap().value().is_empty());
    /// ```
    pub fn get_cell<C: ColumnIndex>(&self, x: C) -> Result<Cell> {
        let x = x.resolve(self.width())?;
        let mut cell = match self.cmap.find_stored_index(x) {
            Some(index) => {
                let mut cell = self.cells[index].clone();
                cell.set_repeated(None);
                cell
            },
            None => Cell::new(),
        };
        cell.stamp(Some(x), self.y);
        Ok(cell)
    }

    /// Get a copy of the value at column `x`.
    pub fn get_value<C: ColumnIndex>(&self, x: C) -> Result<CellValue> {
        Ok(self.get_cell(x)?.value().clone())
    }

    /// Put `cell` at column `x`, replacing whatever logical cell was there.
    ///
    /// Setting at the current width appends; setting past it pads the gap
    /// with one repeated empty cell first. Inside the row, the covering
    /// run is split around the new cell.
    pub fn set_cell<C: ColumnIndex>(&mut self, x: C, mut cell: Cell) -> Result<()> {
        let x = x.resolve(self.width())?;
        cell.stamp(None, None);

        let width = self.width();
        if x >= width {
            if x > width {
                let mut filler = Cell::new();
                filler.set_repeated(Some(x - width));
                self.append_cell(filler);
            }
            self.append_cell(cell);
            return Ok(());
        }

        vault::set_item(&mut self.cells, &mut self.cmap, x, cell)
    }

    /// Put `value` in a fresh cell at column `x`.
    pub fn set_value<C: ColumnIndex>(&mut self, x: C, value: impl Into<CellValue>) -> Result<()> {
        self.set_cell(x, Cell::with_value(value))
    }

    /// Insert `cell` at column `x`, shifting every cell at or after `x`
    /// right by the cell's repeat count. Inserting at or past the current
    /// width behaves like [`Row::set_cell`].
    pub fn insert_cell<C: ColumnIndex>(&mut self, x: C, mut cell: Cell) -> Result<()> {
        let x = x.resolve(self.width())?;
        cell.stamp(None, None);

        if x >= self.width() {
            return self.set_cell(x, cell);
        }

        vault::insert_item(&mut self.cells, &mut self.cmap, x, cell)
    }

    /// Delete the logical cell at column `x`, shifting the remainder of
    /// the row left. Deleting past the end is a no-op.
    pub fn delete_cell<C: ColumnIndex>(&mut self, x: C) -> Result<()> {
        let x = x.resolve(self.width())?;
        if x >= self.width() {
            return Ok(());
        }
        vault::delete_item(&mut self.cells, &mut self.cmap, x)
    }

    /// Append a cell after the last stored cell.
    ///
    /// The fast path for building rows left to right: one push and one
    /// incremental map extension, no searching.
    pub fn append_cell(&mut self, cell: Cell) {
        let repeat = cell.repeat();
        self.cells.push(cell);
        // Appending at the tail cannot fail: the index equals the map length.
        self.cmap
            .insert_run(self.cmap.len(), repeat)
            .expect("appending a run at the map tail");
    }

    /// Append a cell with an explicit repeat count.
    pub fn append_cell_repeated(&mut self, mut cell: Cell, repeated: Option<usize>) {
        cell.set_repeated(repeated);
        self.append_cell(cell);
    }

    /// Iterate one cloned, coordinate-stamped cell per logical column,
    /// expanding repeats. Each call returns a fresh iterator starting at
    /// column 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::{Cell, Row};
    ///
    /// let mut row = Row::new();
    /// row.append_cell_repeated(Cell::new(), Some(4));
    /// row.append_cell(Cell::with_value(1.0));
    /// assert_eq!(row.traverse().count(), row.width());
    /// ```
    pub fn traverse(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().enumerate().flat_map(|(index, stored)| {
            let start = self.cmap.run_start(index);
            let y = self.y;
            let mut template = stored.clone();
            template.set_repeated(None);
            (0..stored.repeat()).map(move |offset| {
                let mut cell = template.clone();
                cell.stamp(Some(start + offset), y);
                cell
            })
        })
    }

    /// Iterate cells over the inclusive column range `start..=end`,
    /// expanding repeats and clamping to the current width.
    pub fn traverse_range(
        &self,
        start: usize,
        end: usize,
    ) -> impl Iterator<Item = Cell> + '_ {
        let last = self.width().min(end.saturating_add(1));
        (start..last).map(move |x| {
            self.get_cell(x)
                .expect("dense index within width resolves")
        })
    }

    /// All logical cell values, repeats expanded.
    pub fn values(&self) -> Vec<CellValue> {
        self.traverse().map(|cell| cell.value().clone()).collect()
    }

    /// Set the values of the row left to right, replacing current content.
    pub fn set_values<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.cells.clear();
        self.cmap = CacheMap::new();
        for value in values {
            self.append_cell(Cell::with_value(value));
        }
    }

    /// Iterate the cells selected by `filter`, repeats expanded.
    pub fn filtered_cells<'a>(&'a self, filter: &'a CellFilter) -> impl Iterator<Item = Cell> + 'a {
        self.traverse().filter(|cell| filter.matches(cell))
    }

    /// Delete trailing empty cells. A styled empty cell stops the trim
    /// unless `aggressive` is set. The cache map is rebuilt wholesale
    /// afterwards, trimming being an inherently bulk edit.
    pub fn rstrip(&mut self, aggressive: bool) {
        while matches!(self.cells.last(), Some(cell) if cell.is_empty(aggressive)) {
            self.cells.pop();
        }
        self.rebuild_map();
    }

    /// Recompute the cache map from the stored cells' repeat attributes.
    pub(crate) fn rebuild_map(&mut self) {
        self.cmap = CacheMap::from_runs(
            self.cells
                .iter()
                .map(|cell| cell.repeat())
                .enumerate(),
        )
        .expect("runs scanned in order rebuild cleanly");
    }

    /// Emptiness test used by table-level trimming: no stored cell
    /// survives its own emptiness test, and no row style (unless
    /// `aggressive`).
    pub(crate) fn is_blank(&self, aggressive: bool) -> bool {
        (aggressive || self.style.is_none())
            && self.cells.iter().all(|cell| cell.is_empty(aggressive))
    }
}

impl Repeatable for Row {
    #[inline]
    fn repeated(&self) -> Option<usize> {
        self.repeated
    }

    fn set_repeated(&mut self, repeated: Option<usize>) {
        self.repeated = repeated.filter(|&r| r > 1);
    }
}

/// Cell selection criteria for [`Row::filtered_cells`]: all present
/// criteria must match.
#[derive(Debug, Default)]
pub struct CellFilter {
    value_type: Option<ValueType>,
    style: Option<String>,
    content: Option<Regex>,
}

impl CellFilter {
    /// A filter matching every cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only cells of the given value type.
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Keep only cells carrying the given style name.
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Keep only cells whose display text matches the regex `pattern`.
    pub fn content(mut self, pattern: &str) -> Result<Self> {
        self.content = Some(Regex::new(pattern).map_err(|e| {
            Error::InvalidArgument(format!("invalid content pattern '{}': {}", pattern, e))
        })?);
        Ok(self)
    }

    fn matches(&self, cell: &Cell) -> bool {
        if let Some(value_type) = self.value_type
            && cell.value().value_type() != Some(value_type)
        {
            return false;
        }
        if let Some(style) = &self.style
            && cell.style() != Some(style.as_str())
        {
            return false;
        }
        if let Some(content) = &self.content
            && !content.is_match(&cell.text())
        {
            return false;
        }
        true
    }
}
