use crate::content::Provider;
use http::StatusCode;
use thiserror::Error;

/// Result type alias for content-router operations
pub type Result<T, E = ContentRouterError> = std::result::Result<T, E>;

/// Errors that can occur while serving content
#[derive(Error, Debug)]
pub enum ContentRouterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch task for position {0} ended without an outcome")]
    PositionTaskFailed(u64),

    #[error("Response serialization error: {0}")]
    ResponseSerializationError(#[from] serde_json::Error),

    #[error("Provider setup error: {0}")]
    ProviderSetup(#[from] ProviderError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Failure of a single provider capability call.
///
/// These never reach the client; they only decide whether a fallback is tried
/// and where the assembled list is truncated.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No capability registered for provider {0}")]
    Unavailable(Provider),

    #[error("Provider {provider} failed: {reason}")]
    Fetch { provider: Provider, reason: String },

    #[error("Provider {0} timed out")]
    Timeout(Provider),

    #[error("Provider {provider} answered with status {status}")]
    Upstream {
        provider: Provider,
        status: StatusCode,
    },

    #[error("Could not decode response from provider {provider}: {reason}")]
    Decode { provider: Provider, reason: String },
}

impl ProviderError {
    pub fn provider(&self) -> &Provider {
        match self {
            ProviderError::Unavailable(provider)
            | ProviderError::Timeout(provider)
            | ProviderError::Fetch { provider, .. }
            | ProviderError::Upstream { provider, .. }
            | ProviderError::Decode { provider, .. } => provider,
        }
    }
}

/// Request rejected at the HTTP boundary before any content is fetched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing query parameter {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for query parameter {0}")]
    InvalidParameter(&'static str),

    #[error("Requested count {requested} exceeds maximum {max}")]
    CountTooLarge { requested: u64, max: u64 },

    #[error("Could not resolve requester address")]
    UnresolvedIdentity,
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::MissingParameter(_)
            | RequestError::InvalidParameter(_)
            | RequestError::CountTooLarge { .. } => StatusCode::BAD_REQUEST,
            RequestError::UnresolvedIdentity => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
