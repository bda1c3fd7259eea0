//! Core session and recommendation logic.
//!
//! This module provides:
//! - [`SessionStore`] credential and preference state mirrored to storage
//! - [`RecommendationService`] bestseller and personalized list caching
//! - [`AccountService`] login and profile reload

mod account;
pub mod error;
mod recommendation;
mod session;

pub use account::AccountService;
pub use error::{AccountError, FailureKind, FetchError, StorageError};
pub use recommendation::{FetchOutcome, RecommendationService};
pub use session::SessionStore;
