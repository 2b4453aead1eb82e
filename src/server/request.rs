use http::Method;
use may_minihttp::Request;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dispatcher::HeaderVec;
use crate::router::ParamVec;

/// Request data extracted from a `may_minihttp::Request` before routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// Method as sent; unknown tokens stay as extension methods
    pub method: Result<Method, String>,
    /// Path without the query string
    pub path: String,
    /// Decoded query parameters in order of appearance
    pub query_params: ParamVec,
    /// Headers with lowercase names
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

/// Split `raw` into path and decoded query parameters.
#[must_use]
pub fn split_path_and_query(raw: &str) -> (String, ParamVec) {
    match raw.split_once('?') {
        Some((path, query)) => {
            let params = url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (Arc::<str>::from(k), v.into_owned()))
                .collect();
            (path.to_string(), params)
        }
        None => (raw.to_string(), ParamVec::new()),
    }
}

/// Extract method, path, query, headers and body from the wire request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method_str = req.method().to_string();
    let method = Method::from_bytes(method_str.as_bytes()).map_err(|_| method_str.clone());
    let (path, query_params) = split_path_and_query(req.path());

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        warn!(method = %method_str, path = %path, error = %e, "Failed to read request body");
        body.clear();
    }

    debug!(
        method = %method_str,
        path = %path,
        header_count = headers.len(),
        query_count = query_params.len(),
        body_bytes = body.len(),
        "Request parsed"
    );

    ParsedRequest {
        method,
        path,
        query_params,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_without_query() {
        let (path, params) = split_path_and_query("/users/1");
        assert_eq!(path, "/users/1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_split_with_encoded_query() {
        let (path, params) = split_path_and_query("/search?q=a%20b&page=2&q=c");
        assert_eq!(path, "/search");
        let pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_ref(), v.as_str())).collect();
        assert_eq!(pairs, vec![("q", "a b"), ("page", "2"), ("q", "c")]);
    }
}
