use std::fmt;

// Domain-level errors for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    InvalidPath(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidPath(path) => write!(f, "invalid path: {path:?}"),
        }
    }
}

impl std::error::Error for StoreError {}
