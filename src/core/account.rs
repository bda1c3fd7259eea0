//! Login and profile reload.
//!
//! Network-facing counterpart of [`SessionStore`]: obtains credentials and
//! profiles from the backend and hands them to the store.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::{AUTHORIZATION_HEADER, ApiConfig};
use crate::core::error::{AccountError, FetchError};
use crate::core::session::SessionStore;
use crate::models::UserProfile;
use crate::utils::{HttpClient, HttpRequest};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Token endpoint response; `user` is present when the backend embeds the
/// profile.
#[derive(Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

pub struct AccountService<H> {
    http: H,
    session: Rc<SessionStore>,
    config: ApiConfig,
}

impl<H: HttpClient> AccountService<H> {
    pub fn new(http: H, session: Rc<SessionStore>, config: ApiConfig) -> Self {
        Self {
            http,
            session,
            config,
        }
    }

    /// Exchange email/password for a token pair and store it.
    ///
    /// A rejected login leaves the current session untouched. A successful
    /// one tears down any existing session first, so nothing scoped to the
    /// previous user survives.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AccountError> {
        let body = serde_json::to_string(&LoginRequest { email, password })
            .map_err(|e| AccountError::Malformed(e.to_string()))?;
        let request = HttpRequest::post_json(self.config.token_url(), body);

        let text = self.http.send(request).await.map_err(|err| match err {
            FetchError::HttpError(400 | 401) => AccountError::InvalidCredentials,
            other => AccountError::Fetch(other),
        })?;
        let tokens: TokenPair =
            serde_json::from_str(&text).map_err(|e| AccountError::Malformed(e.to_string()))?;

        if self.session.is_logged_in() {
            self.session.logout()?;
        }
        self.session.set_credentials(tokens.access, tokens.refresh)?;
        if let Some(user) = tokens.user {
            self.session.set_profile(user)?;
        }
        log::info!("Logged in as {}", self.session.snapshot().display_name());
        Ok(())
    }

    /// Fetch the current user's profile and store it.
    ///
    /// A 401 tears the session down.
    pub async fn reload_profile(&self) -> Result<UserProfile, AccountError> {
        let token = self
            .session
            .access_token()
            .filter(|t| !t.is_empty())
            .ok_or(AccountError::NotLoggedIn)?;

        let epoch = self.session.epoch();
        let request = HttpRequest::get(self.config.profile_url()).with_header(
            AUTHORIZATION_HEADER,
            self.config.auth_scheme.header_value(&token),
        );

        let text = match self.http.send(request).await {
            Ok(text) => text,
            Err(err) if err.is_unauthorized() => {
                if self.session.epoch() == epoch {
                    log::warn!("Profile request rejected the credential, logging out");
                    if let Err(e) = self.session.logout() {
                        log::error!("Session teardown incomplete: {e}");
                    }
                }
                return Err(AccountError::SessionExpired);
            }
            Err(err) => {
                log::error!("Error fetching profile: {err}");
                return Err(err.into());
            }
        };

        let profile: UserProfile =
            serde_json::from_str(&text).map_err(|e| AccountError::Malformed(e.to_string()))?;
        if self.session.epoch() != epoch {
            return Err(AccountError::SessionExpired);
        }
        self.session.set_profile(profile.clone())?;
        Ok(profile)
    }
}
