//! Import errors

/// Errors at the fallible edges of an import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record path is empty")]
    EmptyRecordPath,

    #[error("document has no element to use as a record")]
    NoRecordElement,

    #[error("import job already finished")]
    JobFinished,
}

pub type ImportResult<T> = Result<T, ImportError>;
