use std::time::Duration;

use tracing::{info, warn};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Logs every request on arrival and on completion
///
/// Arrival is logged as `Received GET request for /path` at info level; the
/// completion carries status and latency, and is raised to warn for 5xx.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            handler_name = %req.handler_name,
            "Received {} request for {}",
            req.method,
            req.path
        );
        None
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        let latency_us = latency.as_micros() as u64;
        if res.status >= 500 {
            warn!(
                request_id = %req.request_id,
                handler_name = %req.handler_name,
                status = res.status,
                latency_us,
                "Request failed"
            );
        } else {
            info!(
                request_id = %req.request_id,
                handler_name = %req.handler_name,
                status = res.status,
                latency_us,
                "Request completed"
            );
        }
    }
}
