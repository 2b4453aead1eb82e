use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hook pair run by the dispatcher around every handler call
pub trait Middleware: Send + Sync {
    /// Runs before the handler. Returning a response skips the handler.
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }

    /// Runs after the handler (or the short-circuit response) with the time the
    /// handler took; zero when it was skipped.
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
