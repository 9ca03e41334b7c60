//! # Resolver Errors

use thiserror::Error;

/// Result type for resolver set-up operations
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Resolver errors
///
/// These only arise while assembling resolvers. Resolution itself never
/// fails: a reference that cannot be resolved is simply absent from the
/// batch result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("Resolver already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid endpoint for collection '{collection}': '{uri}'")]
    InvalidEndpoint { collection: String, uri: String },
}

impl ResolverError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ResolverError::AlreadyRegistered(_) => "EXPANDER_RESOLVER_DUPLICATE",
            ResolverError::InvalidEndpoint { .. } => "EXPANDER_RESOLVER_ENDPOINT",
        }
    }
}
