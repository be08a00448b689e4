use larder_store::StoreError;
use thiserror::Error;

/// All the ways things can go wrong in larder
///
/// Store failures pass through unwrapped so validation messages reach the
/// user as written. Notification errors are warning material only - the
/// expiry check collects them instead of returning them (see
/// [`crate::expiry::check_expiry`]).
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
