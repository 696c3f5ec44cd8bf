//! Projection output
//!
//! `Projection` is what an import job hands back: the column model, the
//! index translation and the raw records addressed by global cell index.
//! `Table` is the dense form the BEAM side receives.

use indexmap::IndexSet;

use super::materialize::{ColumnModel, IndexTranslation};
use super::record::{Record, SparseRow};
use super::value::CellValue;

/// One output row, in output column order
pub type Row = Vec<Option<CellValue>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub column_model: ColumnModel,
    pub index_translation: IndexTranslation,
    pub records: Vec<Record>,
}

impl Projection {
    /// Reorder a sparse row into output column order
    pub fn remap_row(&self, row: &SparseRow) -> Row {
        self.index_translation
            .iter()
            .map(|&cell_index| row.get(cell_index).cloned().flatten())
            .collect()
    }

    /// Dense table; rows without any cell and records left empty are dropped
    pub fn into_table(self) -> Table {
        let records = self
            .records
            .iter()
            .map(|record| {
                record
                    .rows()
                    .iter()
                    .filter(|row| row.iter().any(Option::is_some))
                    .map(|row| self.remap_row(row))
                    .collect::<Vec<_>>()
            })
            .filter(|rows| !rows.is_empty())
            .collect();

        Table {
            columns: self.column_model.names(),
            records,
        }
    }
}

/// Dense projection result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    /// Records, each a group of rows
    pub records: Vec<Vec<Row>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row_count(&self) -> usize {
        self.records.iter().map(Vec::len).sum()
    }

    /// All rows, record boundaries flattened
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.records.iter().flatten()
    }

    /// Concatenate tables, aligning columns by name
    ///
    /// Columns keep the order in which they are first seen across the
    /// inputs. Records keep input order.
    pub fn concat<I: IntoIterator<Item = Table>>(tables: I) -> Table {
        let mut columns: IndexSet<String> = IndexSet::new();
        let mut records: Vec<Vec<Row>> = Vec::new();

        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .into_iter()
                .map(|name| columns.insert_full(name).0)
                .collect();

            for record in table.records {
                let rows = record
                    .into_iter()
                    .map(|row| {
                        let mut aligned: Row = vec![None; columns.len()];
                        for (cell, &position) in row.into_iter().zip(&mapping) {
                            aligned[position] = cell;
                        }
                        aligned
                    })
                    .collect();
                records.push(rows);
            }
        }

        // Rows from earlier tables predate later columns
        for row in records.iter_mut().flatten() {
            row.resize(columns.len(), None);
        }

        Table {
            columns: columns.into_iter().collect(),
            records,
        }
    }
}
