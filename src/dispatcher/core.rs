use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::recovery::recover;
use crate::router::{ParamVec, RouteMatch};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage; names are lowercase on requests.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed to a handler
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for log correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Name of the handler that should process this request
    pub handler_name: String,
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl HandlerRequest {
    /// Build a request for `route_match` with no query, headers or body.
    #[must_use]
    pub fn from_match(method: Method, path: &str, route_match: RouteMatch) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.to_string(),
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            query_params: ParamVec::new(),
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name; the last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, lossily
    #[must_use]
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Response produced by a handler or by the dispatcher itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// HTTP status code
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// `text/plain` response
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((
            Arc::from("content-type"),
            "text/plain; charset=utf-8".to_string(),
        ));
        Self::new(status, headers, body.into().into_bytes())
    }

    /// `application/json` response
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, body.to_string().into_bytes())
    }

    /// JSON error body `{ "error": message }`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    #[must_use]
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Something that turns a request into a response
pub trait Handler: Send + Sync {
    fn handle(&self, req: &HandlerRequest) -> HandlerResponse;
}

impl<F> Handler for F
where
    F: Fn(&HandlerRequest) -> HandlerResponse + Send + Sync,
{
    fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        self(req)
    }
}

/// Registry of named handlers plus the middleware chain wrapped around them
///
/// Handlers run on the caller's coroutine. A panicking handler is recovered and
/// answered with a 500, so one bad handler never takes down the connection.
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Handlers keyed by name
    pub handlers: HashMap<String, Arc<dyn Handler>>,
    /// Middleware in execution order
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one.
    pub fn register_handler<H>(&mut self, name: &str, handler: H)
    where
        H: Handler + 'static,
    {
        if self
            .handlers
            .insert(name.to_string(), Arc::new(handler))
            .is_some()
        {
            warn!(handler_name = %name, "Replaced existing handler");
        } else {
            info!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Handler registered successfully"
            );
        }
    }

    /// Add middleware to the end of the chain
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Run the middleware chain and the named handler for `request`.
    ///
    /// Every middleware's `before` runs in order; the first one returning a
    /// response short-circuits the handler, but the remaining `before` hooks still
    /// run. Every `after` hook runs on the final response.
    ///
    /// Returns a 500 when no handler is registered under the request's name or
    /// the handler panics.
    #[must_use]
    pub fn dispatch(&self, request: &HandlerRequest) -> HandlerResponse {
        let mut early_resp: Option<HandlerResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            let resp = mw.before(request);
            if early_resp.is_none() && resp.is_some() {
                debug!(
                    request_id = %request.request_id,
                    middleware_idx = idx,
                    "Middleware returned early response"
                );
                early_resp = resp;
            }
        }

        let (mut resp, latency) = match early_resp {
            Some(r) => (r, Duration::ZERO),
            None => {
                let start = Instant::now();
                let r = self.call_handler(request);
                (r, start.elapsed())
            }
        };

        for mw in &self.middlewares {
            mw.after(request, &mut resp, latency);
        }
        resp
    }

    fn call_handler(&self, request: &HandlerRequest) -> HandlerResponse {
        let Some(handler) = self.handlers.get(&request.handler_name) else {
            let available: Vec<&String> = self.handlers.keys().collect();
            error!(
                request_id = %request.request_id,
                handler_name = %request.handler_name,
                available_handlers = ?available,
                "Handler not found"
            );
            return HandlerResponse::error(500, "Handler not registered");
        };

        match recover(&request.handler_name, || handler.handle(request)) {
            Ok(resp) => resp,
            Err(recovered) => {
                error!(
                    request_id = %request.request_id,
                    handler_name = %request.handler_name,
                    panic_message = %recovered.message,
                    "Handler panicked"
                );
                HandlerResponse::error(500, &format!("Handler panicked: {}", recovered.message))
            }
        }
    }
}
