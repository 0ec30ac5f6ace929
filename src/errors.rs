use thiserror::Error;

/// Error type for vsstree operations.
#[derive(Debug, Error)]
pub enum VssTreeError {
    #[error("format error: {0}")]
    Format(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl VssTreeError {
    pub fn format<T: Into<String>>(msg: T) -> Self {
        VssTreeError::Format(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        VssTreeError::NotFound(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        VssTreeError::InvalidInput(msg.into())
    }

    /// Reports a length prefix that claims more bytes than remain in the buffer.
    pub fn truncated(field: &str, offset: usize, needed: usize, available: usize) -> Self {
        VssTreeError::Format(format!(
            "truncated {field} at offset {offset}: need {needed} bytes, {available} available"
        ))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, VssTreeError::Format(_))
    }
}

/// Result type alias used throughout the crate.
pub type VssResult<T> = Result<T, VssTreeError>;
