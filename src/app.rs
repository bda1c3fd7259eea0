//! Root application module.
//!
//! [`App`] is the composition root: it hydrates one [`SessionStore`] and
//! wires it into the services the UI layer talks to. The UI owns the `App`
//! and passes it around by reference; nothing here is global.

use std::rc::Rc;

use crate::config::ApiConfig;
use crate::core::{AccountService, RecommendationService, SessionStore, StorageError};
use crate::models::Voice;
use crate::utils::{BrowserHttp, BrowserStorage, HttpClient, KeyValueStore, MemoryStorage};

pub struct App<H> {
    session: Rc<SessionStore>,
    recommendations: RecommendationService<H>,
    account: AccountService<H>,
}

impl<H: HttpClient + Clone> App<H> {
    /// Hydrate the session from `storage` and build the services.
    pub fn new(storage: impl KeyValueStore + 'static, http: H, config: ApiConfig) -> Self {
        let session = Rc::new(SessionStore::hydrate(storage));
        Self {
            recommendations: RecommendationService::new(
                http.clone(),
                Rc::clone(&session),
                config.clone(),
            ),
            account: AccountService::new(http, Rc::clone(&session), config),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn recommendations(&self) -> &RecommendationService<H> {
        &self.recommendations
    }

    pub fn account(&self) -> &AccountService<H> {
        &self.account
    }

    /// User-initiated logout.
    ///
    /// In-memory state is always cleared; the error reports session keys
    /// left behind in storage.
    pub fn logout(&self) -> Result<(), StorageError> {
        let result = self.session.logout();
        self.recommendations.clear_personalized();
        result
    }

    /// Selected voice, or the default if the stored id is unknown.
    pub fn voice(&self) -> Voice {
        Voice::parse(&self.session.selected_voice()).unwrap_or_default()
    }
}

impl App<BrowserHttp> {
    /// Browser wiring: localStorage (in-memory if unavailable) and Fetch.
    pub fn browser(config: ApiConfig) -> Self {
        let storage: Box<dyn KeyValueStore> = match BrowserStorage::local() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{e}, session will not survive reloads");
                Box::new(MemoryStorage::new())
            }
        };
        Self::new(storage, BrowserHttp, config)
    }
}
