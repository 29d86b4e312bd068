//! Cell data structures for spreadsheet tables.

use crate::table::vault::Repeatable;
use crate::value::CellValue;

/// A cell as stored in a table row.
///
/// A stored cell may represent several consecutive logical cells through
/// its repeat count; the dense-addressing layer of [`crate::table::Row`]
/// splits and merges such runs transparently. Cells handed out by getters
/// are independent copies stamped with their logical coordinates; mutating
/// one has no effect until it is passed back through a setter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    value: CellValue,
    formula: Option<String>,
    style: Option<String>,
    repeated: Option<usize>,
    /// `(columns, rows)` spanned when the cell is merged over neighbors
    span: Option<(usize, usize)>,
    /// Hidden under a span of another cell (`table:covered-table-cell`)
    covered: bool,
    x: Option<usize>,
    y: Option<usize>,
}

impl Cell {
    /// Create a new empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell holding `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::{Cell, CellValue};
    ///
    /// let cell = Cell::with_value(3.25);
    /// assert_eq!(*cell.value(), CellValue::Float(3.25));
    /// ```
    pub fn with_value(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Get the typed value.
    #[inline]
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Set the typed value.
    pub fn set_value(&mut self, value: impl Into<CellValue>) {
        self.value = value.into();
    }

    /// Take the value out, leaving the cell empty.
    pub fn take_value(&mut self) -> CellValue {
        std::mem::take(&mut self.value)
    }

    /// The formula attached to the cell, in ODF notation, if any.
    ///
    /// Formulas are carried as opaque strings; this crate does not
    /// evaluate them.
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    /// Attach or clear a formula.
    pub fn set_formula(&mut self, formula: Option<String>) {
        self.formula = formula;
    }

    /// The cell style name (`table:style-name`), if any.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Set or clear the cell style name.
    pub fn set_style(&mut self, style: Option<String>) {
        self.style = style;
    }

    /// Column/row span for merged cells, `(1, 1)` when not merged.
    pub fn span(&self) -> (usize, usize) {
        self.span.unwrap_or((1, 1))
    }

    /// Set the column/row span. Values of `(1, 1)` or less clear the span.
    pub fn set_span(&mut self, columns: usize, rows: usize) {
        self.span = (columns > 1 || rows > 1).then_some((columns.max(1), rows.max(1)));
    }

    /// Whether the cell is hidden under the span of a merged neighbor.
    #[inline]
    pub fn is_covered(&self) -> bool {
        self.covered
    }

    pub(crate) fn set_covered(&mut self, covered: bool) {
        self.covered = covered;
    }

    /// The display text for the cell content.
    pub fn text(&self) -> String {
        self.value.display_text()
    }

    /// The logical column of the cell, stamped on cells returned by the
    /// dense-addressing getters. `None` on free-standing cells.
    #[inline]
    pub fn x(&self) -> Option<usize> {
        self.x
    }

    /// The logical row of the cell, when known.
    #[inline]
    pub fn y(&self) -> Option<usize> {
        self.y
    }

    pub(crate) fn stamp(&mut self, x: Option<usize>, y: Option<usize>) {
        self.x = x;
        self.y = y;
    }

    /// Emptiness test used by trimming: no value and no formula; the style
    /// keeps a cell alive unless `aggressive` is set.
    pub fn is_empty(&self, aggressive: bool) -> bool {
        self.value.is_empty() && self.formula.is_none() && (aggressive || self.style.is_none())
    }
}

impl Repeatable for Cell {
    #[inline]
    fn repeated(&self) -> Option<usize> {
        self.repeated
    }

    fn set_repeated(&mut self, repeated: Option<usize>) {
        self.repeated = repeated.filter(|&r| r > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::vault::Repeatable;

    #[test]
    fn test_repeat_normalization() {
        let mut cell = Cell::new();
        assert_eq!(cell.repeat(), 1);

        cell.set_repeated(Some(4));
        assert_eq!(cell.repeated(), Some(4));
        assert_eq!(cell.repeat(), 4);

        cell.set_repeated(Some(1));
        assert_eq!(cell.repeated(), None);

        cell.set_repeated(Some(0));
        assert_eq!(cell.repeated(), None);
    }

    #[test]
    fn test_emptiness() {
        let mut cell = Cell::new();
        assert!(cell.is_empty(false));

        cell.set_style(Some("ce1".to_string()));
        assert!(!cell.is_empty(false));
        assert!(cell.is_empty(true));

        cell.set_value("x");
        assert!(!cell.is_empty(true));
    }

    #[test]
    fn test_span() {
        let mut cell = Cell::new();
        assert_eq!(cell.span(), (1, 1));
        cell.set_span(2, 3);
        assert_eq!(cell.span(), (2, 3));
        cell.set_span(1, 1);
        assert_eq!(cell.span(), (1, 1));
    }
}
