//! Expansion error types
//!
//! Error codes:
//! - EXPANDER_EXPANSION_FILTER_INVALID (WARN)
//! - EXPANDER_FIELD_FILTER_INVALID (WARN)
//!
//! `expand` itself never returns these. They describe why a call fell back
//! to an unrestricted plan and are returned by [`FilterPlan::try_parse`].
//!
//! [`FilterPlan::try_parse`]: super::FilterPlan::try_parse

use thiserror::Error;

use crate::filter::FilterError;

/// Result type for expansion planning
pub type ExpandResult<T> = Result<T, ExpandError>;

/// Expansion planning errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("Invalid expansion filter '{expression}': {source}")]
    InvalidExpansionFilter { expression: String, source: FilterError },

    #[error("Invalid field filter '{expression}': {source}")]
    InvalidFieldFilter { expression: String, source: FilterError },
}

impl ExpandError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExpandError::InvalidExpansionFilter { .. } => "EXPANDER_EXPANSION_FILTER_INVALID",
            ExpandError::InvalidFieldFilter { .. } => "EXPANDER_FIELD_FILTER_INVALID",
        }
    }

    /// The rejected expression
    pub fn expression(&self) -> &str {
        match self {
            ExpandError::InvalidExpansionFilter { expression, .. }
            | ExpandError::InvalidFieldFilter { expression, .. } => expression,
        }
    }
}
