//! Record - sparse rows x cells grid
//!
//! Rows are addressed by record-relative row index, cells by the global cell
//! index handed out by the allocator. An absent cell is `None`.

use super::value::CellValue;

/// One row of a record, indexed by global cell index
pub type SparseRow = Vec<Option<CellValue>>;

/// Grid assembled while traversing one record's subtree
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Record {
    rows: Vec<SparseRow>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value, growing the grid as needed
    ///
    /// Missing rows are appended empty and the addressed row is padded with
    /// `None` up to `cell_index`. Never fails.
    pub fn set(&mut self, row_index: usize, cell_index: usize, value: CellValue) {
        if row_index >= self.rows.len() {
            self.rows.resize_with(row_index + 1, Vec::new);
        }
        let row = &mut self.rows[row_index];
        if cell_index >= row.len() {
            row.resize(cell_index + 1, None);
        }
        row[cell_index] = Some(value);
    }

    /// Get the value at a position, `None` when absent or out of bounds
    pub fn get(&self, row_index: usize, cell_index: usize) -> Option<&CellValue> {
        self.rows
            .get(row_index)
            .and_then(|row| row.get(cell_index))
            .and_then(Option::as_ref)
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }
}
