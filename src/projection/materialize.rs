//! Column Materializer
//!
//! Walks the finished group tree depth-first and emits the ordered output
//! column model together with the index translation (output position ->
//! global cell index).
//!
//! Ordering is heuristic:
//! - within a group, columns present on their first row come first, then
//!   by population, descending
//! - subgroups by population, descending
//!
//! Both sorts are stable, so ties keep first-seen document order. Subgroup
//! population is a raw value count, not the share of records that contain
//! the group: a popular optional group repeated many times per record can
//! outrank a mandatory one that appears once.

use std::cmp::Reverse;

use super::column::{ColumnTree, GroupId};

/// Output position -> global cell index
pub type IndexTranslation = Vec<usize>;

/// One output column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    /// Position in the output model
    pub position: usize,
}

/// Ordered flat column model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnModel {
    pub columns: Vec<ColumnMetadata>,
    /// Rows are grouped into records rather than independent
    pub has_records: bool,
}

impl ColumnModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in output order
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Append a column, suffixing the name if it is already taken
    pub fn append_unduplicated_column(mut self, name: &str) -> Self {
        let name = self.unduplicated_name(name);
        let position = self.columns.len();
        self.columns.push(ColumnMetadata { name, position });
        self
    }

    /// `base`, or `base2`, `base3`, ... whichever is free first
    pub fn unduplicated_name(&self, base: &str) -> String {
        if self.column_by_name(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|i| format!("{}{}", base, i))
            .find(|candidate| self.column_by_name(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    pub fn with_has_records(mut self, has_records: bool) -> Self {
        self.has_records = has_records;
        self
    }
}

/// Materialize the whole tree into a column model and index translation
pub fn materialize(tree: &ColumnTree) -> (ColumnModel, IndexTranslation) {
    let populations = group_populations(tree);
    let mut translation = IndexTranslation::with_capacity(tree.column_count());
    let model = create_columns_from_import(
        tree,
        GroupId::ROOT,
        ColumnModel::new(),
        &mut translation,
        &populations,
    );
    (model, translation)
}

/// Append the columns of `group` and, recursively, of its subgroups
pub fn create_columns_from_import(
    tree: &ColumnTree,
    group: GroupId,
    mut model: ColumnModel,
    translation: &mut IndexTranslation,
    populations: &[usize],
) -> ColumnModel {
    let g = tree.group(group);

    let mut columns: Vec<_> = g.columns.ids().map(|id| tree.column(id)).collect();
    // Stable: equal keys keep insertion order
    columns.sort_by_key(|c| (c.blank_on_first_row, Reverse(c.non_blank_count)));

    for column in columns {
        translation.push(column.cell_index);
        model = model.append_unduplicated_column(&column.name);
    }

    let mut subgroups: Vec<_> = g.subgroups.ids().collect();
    subgroups.sort_by_key(|s| Reverse(populations[s.0]));

    for subgroup in subgroups {
        model = create_columns_from_import(tree, subgroup, model, translation, populations);
    }

    model.with_has_records(true)
}

/// Population of every group: the largest count among its columns and,
/// recursively, its subgroups. Indexed by group id.
pub fn group_populations(tree: &ColumnTree) -> Vec<usize> {
    let mut populations = vec![0; tree.group_count()];
    // Children are always created after their parent, so a reverse sweep
    // sees every subgroup before the group that owns it.
    for index in (0..tree.group_count()).rev() {
        let g = tree.group(GroupId(index));
        let from_columns = g
            .columns
            .ids()
            .map(|c| tree.column(c).non_blank_count)
            .max()
            .unwrap_or(0);
        let from_groups = g
            .subgroups
            .ids()
            .map(|s| populations[s.0])
            .max()
            .unwrap_or(0);
        populations[index] = from_columns.max(from_groups);
    }
    populations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(tree: &mut ColumnTree, group: GroupId, name: &str, count: usize, blank: bool) -> usize {
        let id = tree.get_or_create_column(group, Some(name));
        let c = tree.column_mut(id);
        c.non_blank_count = count;
        c.blank_on_first_row = blank;
        c.cell_index
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let mut tree = ColumnTree::new();
        let first = column(&mut tree, GroupId::ROOT, "first", 3, false);
        let second = column(&mut tree, GroupId::ROOT, "second", 3, false);

        let (model, translation) = materialize(&tree);
        assert_eq!(model.names(), vec!["first", "second"]);
        assert_eq!(translation, vec![first, second]);
    }

    #[test]
    fn test_blank_first_demoted_regardless_of_count() {
        let mut tree = ColumnTree::new();
        let sparse_but_blank = column(&mut tree, GroupId::ROOT, "busy", 100, true);
        let present = column(&mut tree, GroupId::ROOT, "rare", 1, false);

        let (model, translation) = materialize(&tree);
        assert_eq!(model.names(), vec!["rare", "busy"]);
        assert_eq!(translation, vec![present, sparse_but_blank]);
    }

    #[test]
    fn test_count_descending_within_partition() {
        let mut tree = ColumnTree::new();
        column(&mut tree, GroupId::ROOT, "low", 1, false);
        column(&mut tree, GroupId::ROOT, "high", 9, false);
        column(&mut tree, GroupId::ROOT, "blank_low", 1, true);
        column(&mut tree, GroupId::ROOT, "blank_high", 5, true);

        let (model, _) = materialize(&tree);
        assert_eq!(model.names(), vec!["high", "low", "blank_high", "blank_low"]);
    }

    #[test]
    fn test_subgroups_by_population() {
        let mut tree = ColumnTree::new();
        let a = tree.get_or_create_group(GroupId::ROOT, Some("a"));
        let b = tree.get_or_create_group(GroupId::ROOT, Some("b"));
        let c = tree.get_or_create_group(GroupId::ROOT, Some("c"));
        column(&mut tree, a, "x", 2, false);
        column(&mut tree, b, "x", 7, false);
        column(&mut tree, c, "x", 2, false);
        column(&mut tree, GroupId::ROOT, "top", 1, false);

        let (model, _) = materialize(&tree);
        // Direct columns first, then b (7), then a and c tied in document order
        assert_eq!(model.names(), vec!["top", "b - x", "a - x", "c - x"]);
    }

    #[test]
    fn test_nested_population_propagates() {
        let mut tree = ColumnTree::new();
        let shallow = tree.get_or_create_group(GroupId::ROOT, Some("shallow"));
        let deep = tree.get_or_create_group(GroupId::ROOT, Some("deep"));
        let inner = tree.get_or_create_group(deep, Some("inner"));
        column(&mut tree, shallow, "v", 3, false);
        column(&mut tree, inner, "v", 8, false);

        let populations = group_populations(&tree);
        assert_eq!(populations[deep.0], 8);
        assert_eq!(populations[GroupId::ROOT.0], 8);

        let (model, _) = materialize(&tree);
        assert_eq!(model.names(), vec!["deep - inner - v", "shallow - v"]);
    }

    #[test]
    fn test_translation_covers_every_column() {
        let mut tree = ColumnTree::new();
        let g = tree.get_or_create_group(GroupId::ROOT, Some("g"));
        let h = tree.get_or_create_group(g, Some("h"));
        column(&mut tree, h, "deep", 1, false);
        column(&mut tree, GroupId::ROOT, "top", 1, true);
        column(&mut tree, g, "mid", 4, false);

        let (model, translation) = materialize(&tree);
        assert_eq!(model.len(), tree.column_count());
        assert_eq!(translation.len(), tree.column_count());
        assert!(model.has_records);

        for (position, cell_index) in translation.iter().enumerate() {
            let source = tree.columns().find(|c| c.cell_index == *cell_index).unwrap();
            assert_eq!(model.columns[position].name, source.name);
            assert_eq!(model.columns[position].position, position);
        }
    }

    #[test]
    fn test_colliding_names_are_suffixed() {
        let mut tree = ColumnTree::new();
        let a = tree.get_or_create_group(GroupId::ROOT, Some("a"));
        // Column "b" in group "a" and the text of subgroup "a - b" share a name
        column(&mut tree, a, "b", 2, false);
        let b = tree.get_or_create_group(a, Some("b"));
        let text = tree.get_or_create_column(b, None);
        tree.column_mut(text).non_blank_count = 1;

        let (model, _) = materialize(&tree);
        assert_eq!(model.names(), vec!["a - b", "a - b2"]);
    }

    #[test]
    fn test_empty_tree() {
        let tree = ColumnTree::new();
        let (model, translation) = materialize(&tree);
        assert!(model.is_empty());
        assert!(translation.is_empty());
        assert!(model.has_records);
    }
}
