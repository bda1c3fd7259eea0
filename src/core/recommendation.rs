//! Bestseller and personalized recommendation lists.
//!
//! Both lists are replaced wholesale by each successful fetch and left alone
//! by failed ones. The personalized list is tied to the session epoch it was
//! fetched under: it reads as empty once the session has been torn down, and
//! a response that arrives after a teardown is discarded. Replacing the
//! credential alone (e.g. a token refresh) keeps the list.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{AUTHORIZATION_HEADER, ApiConfig};
use crate::core::error::{FailureKind, FetchError};
use crate::core::session::SessionStore;
use crate::models::Book;
use crate::utils::{HttpClient, HttpRequest};

/// What a fetch did to the cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// List replaced with this many entries.
    Updated(usize),
    /// Guest session; no request sent and the list is empty.
    Skipped,
    /// The session changed while the request was in flight; result dropped.
    Discarded,
    /// Credential rejected; the session was torn down.
    SessionExpired,
    /// Absorbed failure; list unchanged.
    Failed(FailureKind),
}

#[derive(Default)]
struct PersonalizedSet {
    books: Vec<Book>,
    epoch: u64,
}

/// Fetches and caches recommendation lists.
pub struct RecommendationService<H> {
    http: H,
    session: Rc<SessionStore>,
    config: ApiConfig,
    bestsellers: RefCell<Vec<Book>>,
    personalized: RefCell<PersonalizedSet>,
}

impl<H: HttpClient> RecommendationService<H> {
    pub fn new(http: H, session: Rc<SessionStore>, config: ApiConfig) -> Self {
        let epoch = session.epoch();
        Self {
            http,
            session,
            config,
            bestsellers: RefCell::new(Vec::new()),
            personalized: RefCell::new(PersonalizedSet {
                books: Vec::new(),
                epoch,
            }),
        }
    }

    pub fn bestsellers(&self) -> Vec<Book> {
        self.bestsellers.borrow().clone()
    }

    /// Personalized list for the current session; empty for guests.
    pub fn personalized(&self) -> Vec<Book> {
        let set = self.personalized.borrow();
        if set.epoch == self.session.epoch() && self.session.is_logged_in() {
            set.books.clone()
        } else {
            Vec::new()
        }
    }

    pub fn clear_personalized(&self) {
        *self.personalized.borrow_mut() = PersonalizedSet {
            books: Vec::new(),
            epoch: self.session.epoch(),
        };
    }

    /// Refresh the bestseller list. Anonymous; failures keep the old list.
    pub async fn fetch_bestsellers(&self) -> FetchOutcome {
        let request = HttpRequest::get(self.config.bestsellers_url());

        match self.load_books(request).await {
            Ok(books) => {
                let count = books.len();
                *self.bestsellers.borrow_mut() = books;
                FetchOutcome::Updated(count)
            }
            Err(err) => {
                log::error!("Error fetching bestsellers: {err}");
                FetchOutcome::Failed(FailureKind::classify(&err, false))
            }
        }
    }

    /// Refresh the personalized list.
    ///
    /// Guests get an empty list without a request. A 401 logs the session
    /// out and empties the list.
    pub async fn fetch_personalized_recommendations(&self) -> FetchOutcome {
        let Some(token) = self.session.access_token().filter(|t| !t.is_empty()) else {
            log::debug!("Guest session, skipping personalized recommendations");
            self.clear_personalized();
            return FetchOutcome::Skipped;
        };

        let epoch = self.session.epoch();
        let request = HttpRequest::get(self.config.personalized_url()).with_header(
            AUTHORIZATION_HEADER,
            self.config.auth_scheme.header_value(&token),
        );

        let result = self.load_books(request).await;

        if self.session.epoch() != epoch {
            log::debug!("Session changed during personalized fetch, dropping result");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(books) => {
                let count = books.len();
                *self.personalized.borrow_mut() = PersonalizedSet { books, epoch };
                FetchOutcome::Updated(count)
            }
            Err(err) => match FailureKind::classify(&err, true) {
                FailureKind::SessionInvalid => {
                    log::warn!("Personalized recommendations rejected the credential, logging out");
                    if let Err(e) = self.session.logout() {
                        log::error!("Session teardown incomplete: {e}");
                    }
                    self.clear_personalized();
                    FetchOutcome::SessionExpired
                }
                kind => {
                    log::error!("Error fetching personalized recommendations: {err}");
                    FetchOutcome::Failed(kind)
                }
            },
        }
    }

    async fn load_books(&self, request: HttpRequest) -> Result<Vec<Book>, FetchError> {
        let body = self.http.send(request).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::JsonParseError(e.to_string()))
    }
}
