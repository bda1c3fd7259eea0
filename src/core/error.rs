//! Custom error types for the session cache.
//!
//! Provides structured error handling with meaningful error messages
//! and proper error categorization for each domain:
//!
//! - [`FetchError`] - Network/fetch-related errors for HTTP requests
//! - [`StorageError`] - localStorage (or in-memory fallback) operations
//! - [`AccountError`] - Login and profile reload failures
//! - [`FailureKind`] - How a failed fetch is recovered from

use thiserror::Error;

/// Network/fetch-related errors for HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Browser window not available
    #[error("Browser window not available")]
    NoWindow,
    /// Failed to create HTTP request
    #[error("Failed to create request")]
    RequestCreationFailed,
    /// Network request failed (CORS, connection refused, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// HTTP error response (non-2xx status)
    #[error("HTTP error: {0}")]
    HttpError(u16),
    /// Failed to read response body
    #[error("Failed to read response")]
    ResponseReadFailed,
    /// Invalid response content (not text)
    #[error("Invalid response content")]
    InvalidContent,
    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParseError(String),
    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl FetchError {
    /// Whether the backend rejected the supplied credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpError(401))
    }
}

/// Durable storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// localStorage not available.
    #[error("localStorage not available")]
    Unavailable,
    /// Failed to write a key (quota exceeded, private mode, ...).
    #[error("failed to save '{0}' to storage")]
    WriteFailed(String),
    /// Failed to remove a key.
    #[error("failed to remove '{0}' from storage")]
    RemoveFailed(String),
    /// Value could not be serialized for storage.
    #[error("failed to serialize value: {0}")]
    SerializationFailed(String),
}

/// Login and profile errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// An authenticated call was attempted without a session.
    #[error("not logged in")]
    NotLoggedIn,
    /// The backend refused the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The stored credential was rejected; the session has been torn down.
    #[error("session expired, please log in again")]
    SessionExpired,
    /// The backend answered with an unexpected payload.
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Classification of a failed fetch.
///
/// | Condition | Kind |
/// |---|---|
/// | transport error, timeout, non-401 HTTP status | [`Transient`](Self::Transient) |
/// | 401 on an authenticated call | [`SessionInvalid`](Self::SessionInvalid) |
/// | body is not the expected JSON | [`DataMalformed`](Self::DataMalformed) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Absorbed and logged; state unchanged.
    Transient,
    /// Triggers session teardown.
    SessionInvalid,
    /// Absorbed and logged; state unchanged.
    DataMalformed,
}

impl FailureKind {
    /// Classify a fetch error.
    ///
    /// A 401 only invalidates the session when a credential was attached.
    pub fn classify(err: &FetchError, authenticated: bool) -> Self {
        match err {
            FetchError::HttpError(401) if authenticated => Self::SessionInvalid,
            FetchError::JsonParseError(_) | FetchError::InvalidContent => Self::DataMalformed,
            _ => Self::Transient,
        }
    }
}
