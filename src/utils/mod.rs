//! Browser plumbing: transport, storage, console logging.
//!
//! Provides:
//! - [`HttpClient`], [`BrowserHttp`] - Network requests with timeout
//! - [`KeyValueStore`], [`BrowserStorage`], [`MemoryStorage`] - Durable storage
//! - [`console`] - `log` backend for the browser console

pub mod console;
pub mod dom;
mod fetch;
mod storage;

pub use fetch::{BrowserHttp, HttpClient, HttpRequest, Method, RaceResult, race_with_timeout};
pub use storage::{BrowserStorage, KeyValueStore, MemoryStorage};
