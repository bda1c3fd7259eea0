//! HTTP transport.
//!
//! [`HttpClient`] is the seam between the session cache and the network.
//! [`BrowserHttp`] implements it with the Fetch API, racing every request
//! against [`FETCH_TIMEOUT_MS`].

use js_sys::{Array, Promise};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use super::dom;
use crate::config::FETCH_TIMEOUT_MS;
use crate::core::error::FetchError;

// =============================================================================
// Requests
// =============================================================================

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Outgoing request description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// POST with a JSON body.
    pub fn post_json(url: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Asynchronous HTTP transport.
///
/// Implementations return the response body on 2xx and
/// [`FetchError::HttpError`] with the status otherwise.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<String, FetchError>;
}

// =============================================================================
// Promise Racing Utilities
// =============================================================================

/// Result of a promise race with timeout.
#[derive(Debug)]
pub enum RaceResult {
    /// The promise completed before timeout.
    Completed(JsValue),
    /// Timeout occurred before promise completed.
    TimedOut,
    /// Promise rejected with an error.
    Error(String),
}

/// Race a promise against a timeout.
///
/// # Returns
/// * `RaceResult::Completed` if promise resolves before timeout
/// * `RaceResult::TimedOut` if timeout occurs first
/// * `RaceResult::Error` if promise rejects
pub async fn race_with_timeout(promise: Promise, timeout_ms: i32) -> RaceResult {
    let Some(window) = dom::window() else {
        return RaceResult::Error("Window not available".to_string());
    };

    // Resolves to undefined, which is how a timeout is recognized below
    let timeout_promise = Promise::new(&mut |resolve, _| {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout_ms);
    });

    let race_array = Array::new();
    race_array.push(&promise);
    race_array.push(&timeout_promise);
    let race_promise = Promise::race(&race_array);

    match JsFuture::from(race_promise).await {
        Ok(result) => {
            if result.is_undefined() {
                RaceResult::TimedOut
            } else {
                RaceResult::Completed(result)
            }
        }
        Err(e) => RaceResult::Error(e.as_string().unwrap_or_else(|| "Unknown error".to_string())),
    }
}

// =============================================================================
// Fetch API transport
// =============================================================================

/// Fetch API transport used in the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHttp;

impl BrowserHttp {
    fn build_request(request: &HttpRequest) -> Result<Request, FetchError> {
        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_mode(RequestMode::Cors);

        let headers = Headers::new().map_err(|_| FetchError::RequestCreationFailed)?;
        for (name, value) in &request.headers {
            headers
                .set(name, value)
                .map_err(|_| FetchError::RequestCreationFailed)?;
        }
        opts.set_headers(&headers);

        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&request.url, &opts)
            .map_err(|_| FetchError::RequestCreationFailed)
    }
}

impl HttpClient for BrowserHttp {
    async fn send(&self, request: HttpRequest) -> Result<String, FetchError> {
        let window = dom::window().ok_or(FetchError::NoWindow)?;
        let js_request = Self::build_request(&request)?;

        let fetch_promise = window.fetch_with_request(&js_request);

        match race_with_timeout(fetch_promise, FETCH_TIMEOUT_MS).await {
            RaceResult::TimedOut => Err(FetchError::Timeout),
            RaceResult::Error(msg) => Err(FetchError::NetworkError(msg)),
            RaceResult::Completed(result) => {
                let resp: Response = result.dyn_into().map_err(|_| FetchError::InvalidContent)?;

                if !resp.ok() {
                    return Err(FetchError::HttpError(resp.status()));
                }

                let text = JsFuture::from(resp.text().map_err(|_| FetchError::ResponseReadFailed)?)
                    .await
                    .map_err(|_| FetchError::ResponseReadFailed)?;

                text.as_string().ok_or(FetchError::InvalidContent)
            }
        }
    }
}
