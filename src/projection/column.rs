//! Column and Column Group arena
//!
//! Groups mirror one nesting level of the source tree and own their columns
//! and subgroups. Everything lives in a single `ColumnTree` arena addressed
//! by `GroupId` / `ColumnId`, so a group's children are plain indexes
//! rather than shared references.
//!
//! ```text
//! ColumnTree
//!   groups[0]  ""            (root)
//!   groups[1]  "item"        columns: [] subgroups: [2]
//!   groups[2]  "item - sku"  columns: [0 "item - sku"]
//! ```

use indexmap::{Equivalent, IndexMap};

use super::allocator::ColumnIndexAllocator;

/// Index of a group in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) usize);

/// Index of a column in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(pub(crate) usize);

impl GroupId {
    /// The document root group (empty name)
    pub const ROOT: GroupId = GroupId(0);
}

/// Column name used for anonymous text directly under the root
pub const ANONYMOUS_TEXT_NAME: &str = "Text";

/// One flattened column
#[derive(Debug, Clone)]
pub struct ImportColumn {
    pub name: String,
    /// Global cell index, assigned once at creation
    pub cell_index: usize,
    /// Next unused row within the current record
    pub next_row_index: usize,
    /// Values written over the whole job
    pub non_blank_count: usize,
    /// No value on row 0 of the first record the column appeared in
    pub blank_on_first_row: bool,
}

/// Lookup key borrowing the local name, so lookups never allocate
#[derive(Hash)]
struct LocalName<'a>(Option<&'a str>);

impl Equivalent<Option<String>> for LocalName<'_> {
    fn equivalent(&self, key: &Option<String>) -> bool {
        self.0 == key.as_deref()
    }
}

/// Child lookup keyed by local name, preserving first-seen order
///
/// The anonymous key (`None`, element text content) never collides with a
/// named child, even one literally called "Text".
#[derive(Debug, Clone)]
pub struct ChildIndex<Id> {
    entries: IndexMap<Option<String>, Id>,
}

impl<Id> Default for ChildIndex<Id> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<Id: Copy> ChildIndex<Id> {
    pub fn get(&self, local_name: Option<&str>) -> Option<Id> {
        self.entries.get(&LocalName(local_name)).copied()
    }

    /// Register a new child. Callers check `get` first.
    fn insert(&mut self, local_name: Option<&str>, id: Id) {
        self.entries.insert(local_name.map(str::to_string), id);
    }

    /// Children in insertion order
    pub fn ids(&self) -> impl ExactSizeIterator<Item = Id> + '_ {
        self.entries.values().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One nesting level of the source tree
#[derive(Debug, Clone, Default)]
pub struct ColumnGroup {
    pub name: String,
    pub columns: ChildIndex<ColumnId>,
    pub subgroups: ChildIndex<GroupId>,
    /// Row cursor shared by the direct children of the current instance
    pub next_row_index: usize,
}

/// Arena of all groups and columns of one import job
///
/// Owns the job's allocator; cell indexes are never shared across trees.
#[derive(Debug, Clone)]
pub struct ColumnTree {
    groups: Vec<ColumnGroup>,
    columns: Vec<ImportColumn>,
    allocator: ColumnIndexAllocator,
    /// Groups whose row cursor may be non-zero
    touched_groups: Vec<GroupId>,
    /// Columns whose row cursor may be non-zero
    touched_columns: Vec<ColumnId>,
}

impl Default for ColumnTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnTree {
    /// Create a tree holding only the unnamed root group
    pub fn new() -> Self {
        Self {
            groups: vec![ColumnGroup::default()],
            columns: Vec::new(),
            allocator: ColumnIndexAllocator::new(),
            touched_groups: Vec::new(),
            touched_columns: Vec::new(),
        }
    }

    #[inline]
    pub fn group(&self, id: GroupId) -> &ColumnGroup {
        &self.groups[id.0]
    }

    #[inline]
    pub fn group_mut(&mut self, id: GroupId) -> &mut ColumnGroup {
        self.touched_groups.push(id);
        &mut self.groups[id.0]
    }

    #[inline]
    pub fn column(&self, id: ColumnId) -> &ImportColumn {
        &self.columns[id.0]
    }

    #[inline]
    pub fn column_mut(&mut self, id: ColumnId) -> &mut ImportColumn {
        self.touched_columns.push(id);
        &mut self.columns[id.0]
    }

    /// Total columns created across the whole tree
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// All columns in creation order
    pub fn columns(&self) -> impl Iterator<Item = &ImportColumn> {
        self.columns.iter()
    }

    /// Columns whose cell index is at least `cell_index`
    ///
    /// Columns are stored in allocation order, so this is a suffix.
    pub(crate) fn columns_since_mut(&mut self, cell_index: usize) -> &mut [ImportColumn] {
        self.columns.get_mut(cell_index..).unwrap_or_default()
    }

    /// Cell index the next new column will receive
    pub fn cell_index_watermark(&self) -> usize {
        self.allocator.watermark()
    }

    /// Look up a column by local name, creating it on first encounter
    pub fn get_or_create_column(&mut self, group: GroupId, local_name: Option<&str>) -> ColumnId {
        if let Some(id) = self.groups[group.0].columns.get(local_name) {
            return id;
        }

        let parent = &self.groups[group.0];
        let column = ImportColumn {
            name: compose_name(&parent.name, local_name),
            cell_index: self.allocator.allocate(),
            next_row_index: parent.next_row_index,
            non_blank_count: 0,
            blank_on_first_row: false,
        };

        let id = ColumnId(self.columns.len());
        if column.next_row_index > 0 {
            self.touched_columns.push(id);
        }
        self.columns.push(column);
        self.groups[group.0].columns.insert(local_name, id);
        id
    }

    /// Look up a subgroup by local name, creating it on first encounter
    pub fn get_or_create_group(&mut self, group: GroupId, local_name: Option<&str>) -> GroupId {
        if let Some(id) = self.groups[group.0].subgroups.get(local_name) {
            return id;
        }

        let parent = &self.groups[group.0];
        let subgroup = ColumnGroup {
            name: compose_name(&parent.name, local_name),
            next_row_index: parent.next_row_index,
            ..ColumnGroup::default()
        };

        let id = GroupId(self.groups.len());
        if subgroup.next_row_index > 0 {
            self.touched_groups.push(id);
        }
        self.groups.push(subgroup);
        self.groups[group.0].subgroups.insert(local_name, id);
        id
    }

    /// Start a new instance of `child` below `parent`
    ///
    /// The instance never starts above the row its parent has reached.
    pub fn enter_instance(&mut self, parent: GroupId, child: GroupId) {
        let floor = self.groups[parent.0].next_row_index;
        self.advance_group(child, floor);
    }

    /// Close the current instance of `group`
    ///
    /// Advances the group's cursor past every row its direct children used,
    /// so the next sibling instance starts on a fresh row.
    pub fn leave_instance(&mut self, group: GroupId) {
        let g = &self.groups[group.0];
        let from_columns = g
            .columns
            .ids()
            .map(|c| self.columns[c.0].next_row_index)
            .max()
            .unwrap_or(0);
        let from_groups = g
            .subgroups
            .ids()
            .map(|s| self.groups[s.0].next_row_index)
            .max()
            .unwrap_or(0);

        self.advance_group(group, from_columns.max(from_groups));
    }

    /// Claim the row for a new value in `column`, never above `floor`
    ///
    /// Returns the row; the column's cursor moves past it.
    pub(crate) fn claim_row(&mut self, id: ColumnId, floor: usize) -> usize {
        let column = &mut self.columns[id.0];
        if column.next_row_index == 0 {
            self.touched_columns.push(id);
        }
        let row = floor.max(column.next_row_index);
        column.next_row_index = row + 1;
        column.non_blank_count += 1;
        row
    }

    /// Raise a group's cursor to at least `row`
    fn advance_group(&mut self, id: GroupId, row: usize) {
        let group = &mut self.groups[id.0];
        if group.next_row_index == 0 && row > 0 {
            self.touched_groups.push(id);
        }
        group.next_row_index = group.next_row_index.max(row);
    }

    /// Rewind every row cursor to the top of a new record
    ///
    /// Only cursors moved since the last reset are visited.
    pub fn reset_cursors(&mut self) {
        for id in self.touched_groups.drain(..) {
            self.groups[id.0].next_row_index = 0;
        }
        for id in self.touched_columns.drain(..) {
            self.columns[id.0].next_row_index = 0;
        }
    }
}

/// Flattened name of a child under a group
fn compose_name(group_name: &str, local_name: Option<&str>) -> String {
    match (group_name.is_empty(), local_name) {
        (true, Some(local)) => local.to_string(),
        (true, None) => ANONYMOUS_TEXT_NAME.to_string(),
        (false, Some(local)) => format!("{} - {}", group_name, local),
        (false, None) => group_name.to_string(),
    }
}
