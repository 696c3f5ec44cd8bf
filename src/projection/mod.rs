//! Tree-to-Table Projection
//!
//! Flattens hierarchical records into rows and columns:
//!
//! - `column` - column groups and columns in an id-indexed arena
//! - `placement` - the per-leaf row/cell placement rule
//! - `materialize` - flat, ordered column model plus index translation
//! - `candidates` - record element detection pre-pass
//! - `projector`, `selector`, `job` - the import pipeline over tree events

pub mod allocator;
pub mod candidates;
pub mod column;
pub mod error;
pub mod job;
pub mod materialize;
pub mod options;
pub mod placement;
pub mod projector;
pub mod record;
pub mod selector;
pub mod table;
pub mod value;

pub use column::{ColumnGroup, ColumnId, ColumnTree, GroupId, ImportColumn};
pub use error::{ImportError, ImportResult};
pub use job::{
    detect_json_record_path, detect_record_path, project_json, project_xml, DiscardSink,
    DocumentFormat, ImportJob,
};
pub use materialize::{ColumnMetadata, ColumnModel, IndexTranslation};
pub use options::ImportOptions;
pub use record::Record;
pub use table::{Projection, Row, Table};
pub use value::{CellValue, DefaultValueParser, ValueParser};

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = "<order>\
        <item><sku>A1</sku></item>\
        <item><sku>A2</sku><note>x</note></item>\
        </order>";

    fn order_options() -> ImportOptions {
        ImportOptions::default().with_record_path(["order"])
    }

    #[test]
    fn test_item_sku_note_scenario() {
        let projection = project_xml(ITEMS.as_bytes(), &order_options(), &DiscardSink).unwrap();

        assert_eq!(
            projection.column_model.names(),
            vec!["order - item - sku", "order - item - note"]
        );
        assert_eq!(projection.index_translation.len(), 2);

        let table = projection.into_table();
        assert_eq!(
            table.records,
            vec![vec![
                vec![Some(CellValue::from("A1")), None],
                vec![Some(CellValue::from("A2")), Some(CellValue::from("x"))],
            ]]
        );
    }

    #[test]
    fn test_repeated_identical_items_each_get_a_row() {
        let xml = "<order>\
            <item><sku>A1</sku></item>\
            <item><sku>A1</sku></item>\
            <item><sku>A2</sku><note>x</note></item>\
            </order>";
        let table = project_xml(xml.as_bytes(), &order_options(), &DiscardSink)
            .unwrap()
            .into_table();

        assert_eq!(table.columns, vec!["order - item - sku", "order - item - note"]);
        assert_eq!(
            table.records,
            vec![vec![
                vec![Some(CellValue::from("A1")), None],
                vec![Some(CellValue::from("A1")), None],
                vec![Some(CellValue::from("A2")), Some(CellValue::from("x"))],
            ]]
        );
    }

    #[test]
    fn test_element_text_split_by_cdata_or_comment_is_one_cell() {
        let xml = "<r>\
            <a>foo<![CDATA[bar]]></a>\
            <a>foo<!-- c -->bar</a>\
            </r>";
        let table = project_xml(
            xml.as_bytes(),
            &ImportOptions::default().with_record_path(["r", "a"]),
            &DiscardSink,
        )
        .unwrap()
        .into_table();

        assert_eq!(table.columns, vec!["a"]);
        assert_eq!(
            table.records,
            vec![
                vec![vec![Some(CellValue::from("foobar"))]],
                vec![vec![Some(CellValue::from("foobar"))]],
            ]
        );
    }

    #[test]
    fn test_rows_never_move_up() {
        // Every value of a column lands strictly below the previous one
        let xml = "<r>\
            <a><v>1</v><v>2</v></a>\
            <a><v>3</v></a>\
            <b>y</b>\
            <a><w>q</w><v>4</v></a>\
            </r>";
        let projection = project_xml(xml.as_bytes(), &ImportOptions::default().with_record_path(["r"]), &DiscardSink)
            .unwrap();

        let record = &projection.records[0];
        for cell_index in projection.index_translation.iter().copied() {
            let rows: Vec<usize> = (0..record.row_count())
                .filter(|&row| record.get(row, cell_index).is_some())
                .collect();
            assert!(rows.windows(2).all(|w| w[0] < w[1]));
        }

        let table = projection.into_table();
        let v = table.column("r - a - v").unwrap();
        let values: Vec<_> = table.rows().filter_map(|row| row[v].clone()).collect();
        assert_eq!(
            values,
            vec![
                CellValue::from("1"),
                CellValue::from("2"),
                CellValue::from("3"),
                CellValue::from("4")
            ]
        );
    }

    #[test]
    fn test_naming_is_deterministic() {
        let first = project_xml(ITEMS.as_bytes(), &order_options(), &DiscardSink).unwrap();
        let second = project_xml(ITEMS.as_bytes(), &order_options(), &DiscardSink).unwrap();
        assert_eq!(first.column_model, second.column_model);
        assert_eq!(first.index_translation, second.index_translation);
    }

    #[test]
    fn test_attributes_and_mixed_text() {
        let xml = r#"<lib><book id="7" lang="en">Intro<title>T</title></book></lib>"#;
        let table = project_xml(
            xml.as_bytes(),
            &ImportOptions::default().with_record_path(["lib", "book"]),
            &DiscardSink,
        )
        .unwrap()
        .into_table();

        assert_eq!(
            table.columns,
            vec!["book - id", "book - lang", "book", "book - title"]
        );
        assert_eq!(
            table.records[0],
            vec![vec![
                Some(CellValue::from("7")),
                Some(CellValue::from("en")),
                Some(CellValue::from("Intro")),
                Some(CellValue::from("T")),
            ]]
        );
    }
}
