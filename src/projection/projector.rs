//! Record Projector
//!
//! Drives the column tree for events that fall inside a record: keeps the
//! stack of open group instances, the record under construction and the
//! finished records. The record element itself becomes a group below the
//! root, so its children are named `"item - sku"` and so on.

use crate::tree::Leaf;

use super::column::{ColumnTree, GroupId};
use super::materialize::materialize;
use super::options::ImportOptions;
use super::placement::CellPolicy;
use super::record::Record;
use super::table::Projection;
use super::value::{DefaultValueParser, ValueParser};

/// Per-job projection state
pub struct Projector {
    tree: ColumnTree,
    records: Vec<Record>,
    stack: Vec<GroupId>,
    current: Option<Record>,
    /// Cell indexes at or above this were created in the current record
    record_watermark: usize,
    policy: CellPolicy,
    trim_strings: bool,
    inference: Box<dyn ValueParser + Send>,
}

impl Projector {
    pub fn new(options: &ImportOptions) -> Self {
        Self::with_value_parser(options, Box::new(DefaultValueParser))
    }

    pub fn with_value_parser(options: &ImportOptions, inference: Box<dyn ValueParser + Send>) -> Self {
        Projector {
            tree: ColumnTree::new(),
            records: Vec::new(),
            stack: Vec::with_capacity(16),
            current: None,
            record_watermark: 0,
            policy: options.cell_policy(),
            trim_strings: options.trim_strings,
            inference,
        }
    }

    pub fn tree(&self) -> &ColumnTree {
        &self.tree
    }

    /// Finished, non-empty records
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn in_record(&self) -> bool {
        self.current.is_some()
    }

    /// Start a record at the root group
    ///
    /// A record still open is finished first.
    pub fn begin_record(&mut self) {
        if self.current.is_some() {
            self.end_record();
        }
        self.tree.reset_cursors();
        self.stack.clear();
        self.stack.push(GroupId::ROOT);
        self.record_watermark = self.tree.cell_index_watermark();
        self.current = Some(Record::new());
    }

    /// Open an instance of the named subgroup of the current group
    pub fn enter_group(&mut self, local_name: &str) {
        if self.current.is_none() {
            return;
        }
        let parent = self.current_group();
        let child = self.tree.get_or_create_group(parent, Some(local_name));
        self.tree.enter_instance(parent, child);
        self.stack.push(child);
    }

    /// Place a leaf in the current group
    pub fn leaf(&mut self, local_name: Option<&str>, value: Leaf<'_>) {
        let group = self.current_group();
        let Some(record) = self.current.as_mut() else {
            return;
        };

        match value {
            Leaf::Text(text) => {
                let text = if self.trim_strings { text.trim() } else { text };
                self.tree.add_cell(
                    group,
                    record,
                    local_name,
                    Some(text),
                    self.policy,
                    self.inference.as_ref(),
                );
            }
            Leaf::Null => {
                self.tree
                    .add_cell(group, record, local_name, None, self.policy, self.inference.as_ref());
            }
            Leaf::Typed(value) => self.tree.add_value(group, record, local_name, value),
        }
    }

    /// Close the current group instance; the root is never closed
    pub fn exit_group(&mut self) {
        if self.stack.len() > 1 {
            if let Some(group) = self.stack.pop() {
                self.tree.leave_instance(group);
            }
        }
    }

    /// Finish the current record
    ///
    /// Columns first seen in this record learn whether they were blank on
    /// its first row. Records without any cell are dropped.
    pub fn end_record(&mut self) {
        while self.stack.len() > 1 {
            self.exit_group();
        }
        let Some(record) = self.current.take() else {
            return;
        };

        let watermark = self.record_watermark;
        for column in self.tree.columns_since_mut(watermark) {
            column.blank_on_first_row = record.get(0, column.cell_index).is_none();
        }

        if !record.is_empty() {
            self.records.push(record);
        }
    }

    /// Materialize the column model and hand out the records
    pub fn into_projection(mut self) -> Projection {
        if self.current.is_some() {
            self.end_record();
        }
        let (column_model, index_translation) = materialize(&self.tree);
        Projection {
            column_model,
            index_translation,
            records: self.records,
        }
    }

    fn current_group(&self) -> GroupId {
        self.stack.last().copied().unwrap_or(GroupId::ROOT)
    }
}
