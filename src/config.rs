//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the crate.
//! The backend base URL can be overridden at compile time with the
//! `BOOKBOOK_API_URL` environment variable.

// =============================================================================
// Network Configuration
// =============================================================================

/// Backend REST base URL (no trailing slash).
pub const API_BASE_URL: &str = match option_env!("BOOKBOOK_API_URL") {
    Some(url) => url,
    None => "http://127.0.0.1:8000/api",
};

/// Fetch request timeout in milliseconds.
pub const FETCH_TIMEOUT_MS: i32 = 10000;

/// Backend endpoint paths, relative to [`API_BASE_URL`].
pub mod api {
    /// Global bestseller list (anonymous).
    pub const BESTSELLERS_PATH: &str = "/books/bestsellers/";
    /// Personalized recommendations (authenticated).
    pub const PERSONALIZED_PATH: &str = "/v1/user/recommendation/personalized/";
    /// JWT token pair endpoint used for login.
    pub const TOKEN_PATH: &str = "/token/";
    /// Current user profile.
    pub const PROFILE_PATH: &str = "/v1/user/me/";
}

/// Authorization header scheme expected by the backend.
///
/// Changing the scheme invalidates every persisted token, so treat it as a
/// breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>` (JWT).
    #[default]
    Bearer,
    /// `Authorization: Token <token>` (DRF token auth).
    Token,
}

impl AuthScheme {
    /// Header value prefix for this scheme.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
            Self::Token => "Token",
        }
    }

    /// Build the full `Authorization` header value for a token.
    pub fn header_value(self, token: &str) -> String {
        format!("{} {}", self.prefix(), token)
    }
}

/// Scheme used by [`ApiConfig::default`].
pub const AUTH_SCHEME: AuthScheme = AuthScheme::Bearer;

/// Name of the credential header.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Runtime view of the backend contract.
///
/// Built from the constants above by default; tests and alternative
/// deployments construct their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_scheme: AuthScheme,
    pub bestsellers_path: String,
    pub personalized_path: String,
    pub token_path: String,
    pub profile_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            auth_scheme: AUTH_SCHEME,
            bestsellers_path: api::BESTSELLERS_PATH.to_string(),
            personalized_path: api::PERSONALIZED_PATH.to_string(),
            token_path: api::TOKEN_PATH.to_string(),
            profile_path: api::PROFILE_PATH.to_string(),
        }
    }
}

impl ApiConfig {
    /// Default configuration pointed at a different backend.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Join the base URL and an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn bestsellers_url(&self) -> String {
        self.url(&self.bestsellers_path)
    }

    pub fn personalized_url(&self) -> String {
        self.url(&self.personalized_path)
    }

    pub fn token_url(&self) -> String {
        self.url(&self.token_path)
    }

    pub fn profile_url(&self) -> String {
        self.url(&self.profile_path)
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

/// localStorage keys for session persistence.
///
/// Renaming a key orphans previously persisted data; add a migration first.
pub mod storage_keys {
    /// Raw access token.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Raw refresh token.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// JSON-serialized user profile.
    pub const USER_PROFILE: &str = "user_info";
    /// Raw selected voice identifier.
    pub const SELECTED_VOICE: &str = "selected_voice";

    /// Every key owned by the session, removed together on logout.
    pub const ALL: [&str; 4] = [ACCESS_TOKEN, REFRESH_TOKEN, USER_PROFILE, SELECTED_VOICE];
}

// =============================================================================
// Preferences
// =============================================================================

/// Voice used when nothing is stored and after logout.
pub const DEFAULT_VOICE: &str = "voice1";

// =============================================================================
// Logging
// =============================================================================

/// Maximum level forwarded to the browser console.
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
