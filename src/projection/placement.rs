//! Cell Placement
//!
//! The online step run once per leaf event. A value lands on the later of
//! the row its group instance has reached and the row its column has
//! reached:
//!
//! ```text
//! row = max(group.next_row_index, column.next_row_index)
//! ```
//!
//! so a repeated leaf never overwrites an earlier value and a new group
//! instance never moves back up. The rule is local and order dependent; it
//! relies on events arriving in document order.

use super::column::{ColumnTree, GroupId};
use super::record::Record;
use super::value::{CellValue, ValueParser};

/// Per-leaf flags controlling what gets stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellPolicy {
    /// Store absent/empty text as an empty string instead of skipping it
    pub store_empty_string: bool,
    /// Run text through the value parser
    pub guess_data_type: bool,
}

impl ColumnTree {
    /// Place a text leaf into `record`
    ///
    /// Absent or empty text is skipped entirely unless the policy stores
    /// empty strings; a skipped leaf neither creates its column nor counts
    /// as non-blank.
    pub fn add_cell(
        &mut self,
        group: GroupId,
        record: &mut Record,
        local_name: Option<&str>,
        text: Option<&str>,
        policy: CellPolicy,
        inference: &dyn ValueParser,
    ) {
        let text = match text {
            Some(t) if !t.is_empty() => t,
            _ if !policy.store_empty_string => return,
            _ => "",
        };

        let value = if policy.guess_data_type {
            inference.parse(text)
        } else {
            CellValue::Text(text.to_string())
        };

        self.add_value(group, record, local_name, value);
    }

    /// Place an already typed value into `record`
    pub fn add_value(
        &mut self,
        group: GroupId,
        record: &mut Record,
        local_name: Option<&str>,
        value: CellValue,
    ) {
        let column_id = self.get_or_create_column(group, local_name);
        let group_row = self.group(group).next_row_index;

        let row_index = self.claim_row(column_id, group_row);
        record.set(row_index, self.column(column_id).cell_index, value);
    }
}
