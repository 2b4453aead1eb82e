//! # Dispatcher Module
//!
//! Runs the handler selected by the router, wrapped in the middleware chain.
//!
//! ## Overview
//!
//! - [`HandlerRequest`] / [`HandlerResponse`] are the in-process request and
//!   response types every handler and middleware sees
//! - [`Handler`] is implemented for any `Fn(&HandlerRequest) -> HandlerResponse`
//! - [`Dispatcher`] holds handlers by name plus the ordered middleware chain
//!
//! ## Error Handling
//!
//! - A route naming an unregistered handler yields a 500
//! - A panicking handler is caught by [`crate::recovery::recover`] and yields a 500
//!   whose body carries the panic message
//!
//! ```rust
//! use patternkit::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
//! use patternkit::router::{RouteOutcome, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/", "home").unwrap();
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_handler("home", |_req: &HandlerRequest| {
//!     HandlerResponse::text(200, "Hello, World!\n")
//! });
//!
//! let RouteOutcome::Matched(m) = router.route(&Method::GET, "/") else { unreachable!() };
//! let req = HandlerRequest::from_match(Method::GET, "/", m);
//! assert_eq!(dispatcher.dispatch(&req).body_text(), "Hello, World!\n");
//! ```

mod core;

pub use core::{
    Dispatcher, Handler, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS,
};
