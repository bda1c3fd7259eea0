//! Scripted HTTP transport for tests.
//!
//! Available under `cfg(test)` and the `mock` feature.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use crate::core::error::FetchError;
use crate::utils::{HttpClient, HttpRequest};

type SendHook = Rc<dyn Fn(&HttpRequest)>;

#[derive(Default)]
struct MockState {
    routes: HashMap<String, VecDeque<Result<String, FetchError>>>,
    requests: Vec<HttpRequest>,
    hook: Option<SendHook>,
}

/// [`HttpClient`] answering from per-URL queues.
///
/// Each request pops the next queued response for its URL; an empty queue
/// yields a network error. Clones share state, so a test keeps one handle
/// to script responses and inspect recorded requests.
#[derive(Clone, Default)]
pub struct MockHttp {
    state: Rc<RefCell<MockState>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response for `url`.
    pub fn respond(&self, url: &str, response: Result<String, FetchError>) {
        self.state
            .borrow_mut()
            .routes
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queue a successful JSON response for `url`.
    pub fn respond_json(&self, url: &str, body: &Value) {
        self.respond(url, Ok(body.to_string()));
    }

    /// Run `hook` while each request is "in flight".
    pub fn on_send(&self, hook: impl Fn(&HttpRequest) + 'static) {
        self.state.borrow_mut().hook = Some(Rc::new(hook));
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }
}

impl HttpClient for MockHttp {
    async fn send(&self, request: HttpRequest) -> Result<String, FetchError> {
        let hook = self.state.borrow().hook.clone();
        if let Some(hook) = hook {
            hook(&request);
        }

        let mut state = self.state.borrow_mut();
        let response = state
            .routes
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(FetchError::NetworkError(format!("no mock for {}", request.url))));
        state.requests.push(request);
        response
    }
}
