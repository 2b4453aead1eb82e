//! # Router Module
//!
//! Method + path matching for the HTTP service.
//!
//! ## Overview
//!
//! The router:
//! - Compiles path patterns such as `/users/{id}` into anchored regexes at
//!   registration time
//! - Matches an incoming method and path against the table in registration order
//! - Extracts path parameters for the matched route
//! - Distinguishes "no such path" (404) from "path exists, wrong method" (405)
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use patternkit::router::{RouteOutcome, Router};
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/users/{id}", "get_user").unwrap();
//!
//! match router.route(&Method::GET, "/users/42") {
//!     RouteOutcome::Matched(m) => assert_eq!(m.get_path_param("id"), Some("42")),
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert!(matches!(
//!     router.route(&Method::POST, "/users/42"),
//!     RouteOutcome::MethodNotAllowed { .. }
//! ));
//! ```

mod core;

pub use core::{
    ParamVec, RouteError, RouteMatch, RouteMeta, RouteOutcome, Router, MAX_INLINE_PARAMS,
};
