//! Server errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
