use thiserror::Error;

/// Failures parsing object identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("not hexadecimal: {0}")]
    InvalidHex(String),

    #[error("wrong id length: expected {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("not a usable id prefix: {0:?}")]
    InvalidPrefix(String),
}
