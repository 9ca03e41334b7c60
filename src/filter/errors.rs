//! Filter expression error types
//!
//! Error codes:
//! - EXPANDER_FILTER_UNEXPECTED_CLOSE (ERROR)
//! - EXPANDER_FILTER_UNCLOSED_GROUP (ERROR)
//!
//! Both are recoverable: an expansion call that receives a rejected filter
//! proceeds without any restriction.

use thiserror::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Filter expression errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A `)` appeared with no matching `(` before it
    #[error("Unbalanced parentheses: unexpected ')' at position {0}")]
    UnexpectedClose(usize),

    /// The expression ended with groups still open
    #[error("Unbalanced parentheses: {0} group(s) never closed")]
    UnclosedGroup(usize),
}

impl FilterError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::UnexpectedClose(_) => "EXPANDER_FILTER_UNEXPECTED_CLOSE",
            FilterError::UnclosedGroup(_) => "EXPANDER_FILTER_UNCLOSED_GROUP",
        }
    }
}
