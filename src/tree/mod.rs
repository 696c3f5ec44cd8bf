//! Tree Event Interface
//!
//! The boundary between a format-specific traversal and the projection.
//! Drivers walk a document in order and report:
//!
//! ```text
//! <book id="7"><title>T</title>note</book>
//!
//! enter_group("book")
//!   leaf(Some("id"), Text("7"))
//!   enter_group("title")
//!     leaf(None, Text("T"))
//!   exit_group()
//!   leaf(None, Text("note"))
//! exit_group()
//! ```
//!
//! The XML driver lives in `core::walker`, the JSON driver in `json`.

pub mod json;

use crate::projection::CellValue;

/// Local name given to the document root and to array elements in JSON
pub const ANONYMOUS: &str = "__anonymous__";

/// A scalar reported by a driver
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf<'a> {
    /// Raw text, subject to trimming and type guessing
    Text(&'a str),
    /// Explicit absence (JSON `null`)
    Null,
    /// A value the source format already typed
    Typed(CellValue),
}

/// Receiver of tree traversal events
pub trait TreeEvents {
    /// Descend into a nested element
    fn enter_group(&mut self, local_name: &str);

    /// A scalar under the current element; `None` names the element's own text
    fn leaf(&mut self, local_name: Option<&str>, value: Leaf<'_>);

    /// Ascend out of the current element
    fn exit_group(&mut self);

    /// Ask the driver to stop emitting events
    fn is_done(&self) -> bool {
        false
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Event recorder shared by driver tests

    use super::*;

    #[derive(Debug, Default)]
    pub struct Recorder {
        pub events: Vec<String>,
    }

    impl TreeEvents for Recorder {
        fn enter_group(&mut self, local_name: &str) {
            self.events.push(format!("enter {}", local_name));
        }

        fn leaf(&mut self, local_name: Option<&str>, value: Leaf<'_>) {
            let name = local_name.unwrap_or("-");
            let value = match value {
                Leaf::Text(t) => format!("{:?}", t),
                Leaf::Null => "null".to_string(),
                Leaf::Typed(v) => format!("{:?}", v),
            };
            self.events.push(format!("leaf {} {}", name, value));
        }

        fn exit_group(&mut self) {
            self.events.push("exit".to_string());
        }
    }
}
