pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Invalid person JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sheet parse error (line {line}): {message}")]
    Sheet { line: usize, message: String },

    #[error("No data to display")]
    NoData,
}

/// Malformed or conflicting person records.
///
/// These are the only failures the store and resolver surface; structural oddities such as
/// cycles or dangling references are absorbed by the tree builder instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("person record has an empty id")]
    EmptyId,

    #[error("person {id} has an empty name")]
    EmptyName { id: String },

    #[error("person {id} has an invalid {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate {
        id: String,
        field: &'static str,
        value: String,
    },

    #[error("duplicate person id: {id}")]
    DuplicateId { id: String },
}

impl DataError {
    /// The id of the offending record, when it has one.
    pub fn id(&self) -> Option<&str> {
        match self {
            DataError::EmptyId => None,
            DataError::EmptyName { id }
            | DataError::InvalidDate { id, .. }
            | DataError::DuplicateId { id } => Some(id),
        }
    }
}
