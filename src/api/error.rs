use thiserror::Error;

/// API failures that the HTTP layer reports with a specific status.
///
/// They travel inside `anyhow::Error` and are recovered with `downcast_ref`.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("the {resource} adapter does not implement {operation}")]
    NotImplemented {
        resource: &'static str,
        operation: &'static str,
    },
    #[error("lookup failed: {0}")]
    Lookup(String),
}
