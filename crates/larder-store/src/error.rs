use thiserror::Error;

/// All the ways persistence can go wrong
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field was missing or malformed. The operation wrote nothing.
    #[error("{0}")]
    Validation(String),

    #[error("no food item with id {0}")]
    NotFound(i64),

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
