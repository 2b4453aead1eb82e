use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Request counters kept with relaxed atomics
///
/// Observes only; never short-circuits a request.
#[derive(Debug, Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    success_count: AtomicUsize,
    client_error_count: AtomicUsize,
    server_error_count: AtomicUsize,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests seen
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean handler latency; zero before the first request
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// `(2xx/3xx, 4xx, 5xx)` response counts
    #[must_use]
    pub fn status_counts(&self) -> (usize, usize, usize) {
        (
            self.success_count.load(Ordering::Relaxed),
            self.client_error_count.load(Ordering::Relaxed),
            self.server_error_count.load(Ordering::Relaxed),
        )
    }

    /// Prometheus text exposition of the counters
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let (ok, client, server) = self.status_counts();
        format!(
            "# HELP patternkit_requests_total Total number of handled requests\n\
             # TYPE patternkit_requests_total counter\n\
             patternkit_requests_total {}\n\
             # HELP patternkit_responses_total Responses by status class\n\
             # TYPE patternkit_responses_total counter\n\
             patternkit_responses_total{{class=\"ok\"}} {}\n\
             patternkit_responses_total{{class=\"client_error\"}} {}\n\
             patternkit_responses_total{{class=\"server_error\"}} {}\n\
             # HELP patternkit_request_latency_seconds Average request latency in seconds\n\
             # TYPE patternkit_request_latency_seconds gauge\n\
             patternkit_request_latency_seconds {}\n",
            self.request_count(),
            ok,
            client,
            server,
            self.average_latency().as_secs_f64()
        )
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        let counter = match res.status {
            500.. => &self.server_error_count,
            400..=499 => &self.client_error_count,
            _ => &self.success_count,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn request() -> HandlerRequest {
        let mut router = crate::router::Router::new();
        router.add_route(Method::GET, "/", "home").unwrap();
        match router.route(&Method::GET, "/") {
            crate::router::RouteOutcome::Matched(m) => {
                HandlerRequest::from_match(Method::GET, "/", m)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_counts_and_prometheus_text() {
        let metrics = MetricsMiddleware::new();
        assert_eq!(metrics.average_latency(), Duration::ZERO);

        let req = request();
        for status in [200, 404, 500] {
            assert!(metrics.before(&req).is_none());
            let mut res = HandlerResponse::text(status, "");
            metrics.after(&req, &mut res, Duration::from_millis(2));
        }

        assert_eq!(metrics.request_count(), 3);
        assert_eq!(metrics.status_counts(), (1, 1, 1));
        assert_eq!(metrics.average_latency(), Duration::from_millis(2));

        let text = metrics.render_prometheus();
        assert!(text.contains("patternkit_requests_total 3\n"));
        assert!(text.contains("patternkit_responses_total{class=\"server_error\"} 1\n"));
        assert!(text.contains("patternkit_request_latency_seconds 0.002\n"));
    }
}
