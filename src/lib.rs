//! Session and recommendation cache for the bookbook web front end.
//!
//! Keeps authentication state, user preferences and the bestseller and
//! personalized book lists in sync with the backend and with localStorage.
//! Build an [`App`] once at startup and hand it to the UI.

pub mod app;
pub mod config;
pub mod core;
pub mod models;
pub mod utils;

#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use app::App;
pub use config::{ApiConfig, AuthScheme};
pub use crate::core::{
    AccountError, AccountService, FailureKind, FetchError, FetchOutcome, RecommendationService,
    SessionStore, StorageError,
};
pub use models::{Book, Session, UserProfile, Voice};

/// wasm entry point: panic hook and console logging.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    utils::console::init(config::LOG_LEVEL);
}
