//! Column descriptors for spreadsheet tables.

use super::vault::Repeatable;

/// A column descriptor (`table:table-column`).
///
/// Columns carry no cells (cells live in rows), only presentation
/// defaults, and may be repeated just like cells and rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    style: Option<String>,
    default_cell_style: Option<String>,
    repeated: Option<usize>,
}

impl Column {
    /// Create a new column descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// The column style name (`table:style-name`), if any.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Set or clear the column style name.
    pub fn set_style(&mut self, style: Option<String>) {
        self.style = style;
    }

    /// The default style for cells in this column
    /// (`table:default-cell-style-name`), if any.
    pub fn default_cell_style(&self) -> Option<&str> {
        self.default_cell_style.as_deref()
    }

    /// Set or clear the default cell style.
    pub fn set_default_cell_style(&mut self, style: Option<String>) {
        self.default_cell_style = style;
    }
}

impl Repeatable for Column {
    #[inline]
    fn repeated(&self) -> Option<usize> {
        self.repeated
    }

    fn set_repeated(&mut self, repeated: Option<usize>) {
        self.repeated = repeated.filter(|&r| r > 1);
    }
}
