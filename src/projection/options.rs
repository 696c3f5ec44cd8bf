//! Import options
//!
//! Settings for one import job. The BEAM side passes a map with atom keys,
//! see `term::decode_options`.

use super::placement::CellPolicy;

/// Options for one import job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Qualified element names from the document root down to the record
    /// element. Detected when `None`.
    pub record_path: Option<Vec<String>>,
    /// Maximum number of records to start
    pub limit: Option<usize>,
    pub store_empty_strings: bool,
    pub guess_cell_value_types: bool,
    /// Trim text leaves before placement
    pub trim_strings: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            record_path: None,
            limit: None,
            store_empty_strings: false,
            guess_cell_value_types: false,
            trim_strings: true,
        }
    }
}

impl ImportOptions {
    pub fn with_record_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record_path = Some(path.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn cell_policy(&self) -> CellPolicy {
        CellPolicy {
            store_empty_string: self.store_empty_strings,
            guess_data_type: self.guess_cell_value_types,
        }
    }
}
