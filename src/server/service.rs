use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::debug;

use super::request::{parse_request, ParsedRequest};
use super::response::write_handler_response;
use crate::dispatcher::{Dispatcher, Handler, HandlerRequest, HandlerResponse};
use crate::ids::RequestId;
use crate::middleware::{LoggingMiddleware, Middleware};
use crate::router::{RouteError, RouteOutcome, Router};

/// Router and dispatcher bundled into a `may_minihttp` service
///
/// Cloned once per connection by `may_minihttp`; the tables are shared.
#[derive(Clone, Default)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Builder for [`AppService`] that registers route and handler together
#[derive(Default)]
pub struct AppBuilder {
    router: Router,
    dispatcher: Dispatcher,
}

impl AppBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `method pattern` to `handler`, registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the pattern cannot be compiled.
    pub fn route<H>(
        mut self,
        method: http::Method,
        pattern: &str,
        name: &str,
        handler: H,
    ) -> Result<Self, RouteError>
    where
        H: Handler + 'static,
    {
        self.router.add_route(method, pattern, name)?;
        self.dispatcher.register_handler(name, handler);
        Ok(self)
    }

    /// Append middleware to the chain
    #[must_use]
    pub fn middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.dispatcher.add_middleware(mw);
        self
    }

    #[must_use]
    pub fn build(self) -> AppService {
        AppService::new(self.router, self.dispatcher)
    }
}

impl AppService {
    #[must_use]
    pub fn new(router: Router, dispatcher: Dispatcher) -> Self {
        Self {
            router: Arc::new(router),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Route and dispatch a parsed request. 404 and 405 never reach middleware.
    #[must_use]
    pub fn handle(&self, parsed: ParsedRequest) -> HandlerResponse {
        let method = match parsed.method {
            Ok(method) => method,
            Err(raw) => {
                return HandlerResponse::json(
                    400,
                    &json!({ "error": "Bad Request", "method": raw, "path": parsed.path }),
                );
            }
        };

        match self.router.route(&method, &parsed.path) {
            RouteOutcome::Matched(route_match) => {
                let request_id = RequestId::from_header_or_new(
                    parsed
                        .headers
                        .iter()
                        .find(|(k, _)| k.as_ref() == "x-request-id")
                        .map(|(_, v)| v.as_str()),
                );
                let request = HandlerRequest {
                    request_id,
                    method,
                    path: parsed.path,
                    handler_name: route_match.handler_name,
                    path_params: route_match.path_params,
                    query_params: parsed.query_params,
                    headers: parsed.headers,
                    body: parsed.body,
                };
                self.dispatcher.dispatch(&request)
            }
            RouteOutcome::MethodNotAllowed { allowed } => {
                let allow = allowed
                    .iter()
                    .map(http::Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut resp = HandlerResponse::json(
                    405,
                    &json!({
                        "error": "Method Not Allowed",
                        "method": method.as_str(),
                        "path": parsed.path
                    }),
                );
                resp.set_header("allow", allow);
                resp
            }
            RouteOutcome::NotFound => HandlerResponse::json(
                404,
                &json!({ "error": "Not Found", "method": method.as_str(), "path": parsed.path }),
            ),
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let resp = self.handle(parsed);
        debug!(status = resp.status, body_bytes = resp.body.len(), "Writing response");
        write_handler_response(res, resp);
        Ok(())
    }
}

/// `GET /` handler answering `Hello, World!`
#[must_use]
pub fn home_handler(_req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::text(200, "Hello, World!\n")
}

/// The demo service: `GET /` → `Hello, World!` behind [`LoggingMiddleware`].
///
/// # Errors
///
/// Never fails in practice; the signature follows [`AppBuilder::route`].
pub fn hello_service() -> Result<AppService, RouteError> {
    Ok(AppBuilder::new()
        .middleware(Arc::new(LoggingMiddleware))
        .route(http::Method::GET, "/", "home", home_handler)?
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::HeaderVec;
    use crate::router::ParamVec;
    use http::Method;

    fn parsed(method: &str, path: &str) -> ParsedRequest {
        ParsedRequest {
            method: Method::from_bytes(method.as_bytes()).map_err(|_| method.to_string()),
            path: path.to_string(),
            query_params: ParamVec::new(),
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[test]
    fn test_hello_service_root() {
        let service = hello_service().unwrap();
        let resp = service.handle(parsed("GET", "/"));
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body_text(), "Hello, World!\n");
    }

    #[test]
    fn test_not_found_json() {
        let service = hello_service().unwrap();
        let resp = service.handle(parsed("GET", "/missing"));
        assert_eq!(resp.status, 404);
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/missing");
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let service = hello_service().unwrap();
        let resp = service.handle(parsed("POST", "/"));
        assert_eq!(resp.status, 405);
        assert_eq!(resp.get_header("allow"), Some("GET"));
    }

    #[test]
    fn test_invalid_method_token() {
        let service = hello_service().unwrap();
        let resp = service.handle(parsed("G E T", "/"));
        assert_eq!(resp.status, 400);
    }
}
