//! # Middleware Module
//!
//! Cross-cutting hooks that run around every dispatched request.
//!
//! - [`LoggingMiddleware`] logs `Received <METHOD> request for <PATH>` and the
//!   completed status and latency
//! - [`MetricsMiddleware`] counts requests, status classes and latency
//!
//! Custom middleware implements [`Middleware`]; `before` may return a response
//! to short-circuit the handler.

mod core;
mod logging;
mod metrics;

pub use core::Middleware;
pub use logging::LoggingMiddleware;
pub use metrics::MetricsMiddleware;
