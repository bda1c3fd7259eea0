//! Data models and types for the session cache.
//!
//! Contains domain types for:
//! - [`Session`], [`Voice`] - Authentication and preference state
//! - [`UserProfile`] - Backend user record
//! - [`Book`] - Opaque backend book entry

mod book;
mod profile;
mod session;

pub use book::Book;
pub use profile::UserProfile;
pub use session::{Session, Voice};
