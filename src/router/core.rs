use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage for the request path. Names are shared with the route
/// table; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Metadata for one registered route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    /// HTTP method the route answers
    pub method: Method,
    /// Pattern as registered, e.g. `/users/{id}`
    pub path_pattern: String,
    /// Name the dispatcher looks the handler up by
    pub handler_name: String,
}

/// Error returned for a path pattern that cannot be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Patterns must start with `/`
    MissingLeadingSlash { pattern: String },
    /// A `{...}` segment with no name, or with braces inside the name
    InvalidParameter { pattern: String, segment: String },
    /// The same parameter name appears twice
    DuplicateParameter { pattern: String, name: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::MissingLeadingSlash { pattern } => {
                write!(f, "route pattern '{}' must start with '/'", pattern)
            }
            RouteError::InvalidParameter { pattern, segment } => write!(
                f,
                "route pattern '{}' has invalid parameter segment '{}'",
                pattern, segment
            ),
            RouteError::DuplicateParameter { pattern, name } => write!(
                f,
                "route pattern '{}' declares parameter '{}' more than once",
                pattern, name
            ),
        }
    }
}

impl std::error::Error for RouteError {}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (`{id}` → `("id", "123")`)
    pub path_params: ParamVec,
    /// Name of the handler that should process this request
    pub handler_name: String,
}

impl RouteMatch {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Path parameters as an owned map
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Outcome of a routing attempt
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    /// A route matched both path and method
    Matched(RouteMatch),
    /// The path matched at least one route, but none for this method
    MethodNotAllowed {
        /// Methods registered for the path, in registration order
        allowed: Vec<Method>,
    },
    /// No route matched the path
    NotFound,
}

struct CompiledRoute {
    meta: Arc<RouteMeta>,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

/// Method + path router
///
/// Routes are tried in registration order and the first one whose pattern and
/// method both match wins. Patterns are literal segments plus `{name}`
/// parameters, each parameter matching one non-empty path segment.
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<Arc<CompiledRoute>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|r| &r.meta))
            .finish()
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler_name` for `method` on `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the pattern cannot be compiled.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler_name: &str,
    ) -> Result<(), RouteError> {
        let (regex, param_names) = Self::path_to_regex(pattern)?;
        let meta = Arc::new(RouteMeta {
            method,
            path_pattern: pattern.to_string(),
            handler_name: handler_name.to_string(),
        });

        info!(
            method = %meta.method,
            path_pattern = %meta.path_pattern,
            handler_name = %meta.handler_name,
            routes_count = self.routes.len() + 1,
            "Route registered"
        );

        self.routes.push(Arc::new(CompiledRoute {
            meta,
            regex,
            param_names: param_names.into_iter().map(Arc::from).collect(),
        }));
        Ok(())
    }

    /// All registered routes in registration order
    #[must_use]
    pub fn routes(&self) -> Vec<Arc<RouteMeta>> {
        self.routes.iter().map(|r| Arc::clone(&r.meta)).collect()
    }

    /// Match a request against the routing table.
    ///
    /// `path` must not include the query string.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> RouteOutcome {
        let mut allowed: Vec<Method> = Vec::new();

        for compiled in &self.routes {
            let Some(caps) = compiled.regex.captures(path) else {
                continue;
            };
            if compiled.meta.method != *method {
                if !allowed.contains(&compiled.meta.method) {
                    allowed.push(compiled.meta.method.clone());
                }
                continue;
            }

            let path_params: ParamVec = compiled
                .param_names
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (Arc::clone(name), m.as_str().to_string())))
                .collect();

            debug!(
                method = %method,
                path = %path,
                handler_name = %compiled.meta.handler_name,
                route_pattern = %compiled.meta.path_pattern,
                path_params = ?path_params,
                "Route matched"
            );

            return RouteOutcome::Matched(RouteMatch {
                route: Arc::clone(&compiled.meta),
                path_params,
                handler_name: compiled.meta.handler_name.clone(),
            });
        }

        if allowed.is_empty() {
            debug!(method = %method, path = %path, "No route matched");
            RouteOutcome::NotFound
        } else {
            debug!(method = %method, path = %path, allowed = ?allowed, "Method not allowed");
            RouteOutcome::MethodNotAllowed { allowed }
        }
    }

    /// Convert a path pattern to an anchored regex and its parameter names.
    ///
    /// `/users/{id}` becomes `^/users/([^/]+)$` with names `["id"]`. Literal
    /// segments are regex-escaped; a trailing slash is significant.
    pub(crate) fn path_to_regex(pattern: &str) -> Result<(Regex, Vec<String>), RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                pattern: pattern.to_string(),
            });
        }

        let mut regex_src = String::with_capacity(pattern.len() + 8);
        regex_src.push('^');
        let mut param_names: Vec<String> = Vec::with_capacity(pattern.matches('{').count());

        for segment in pattern.split('/').skip(1) {
            regex_src.push('/');
            if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if inner.is_empty() || inner.contains(['{', '}']) {
                    return Err(RouteError::InvalidParameter {
                        pattern: pattern.to_string(),
                        segment: segment.to_string(),
                    });
                }
                if param_names.iter().any(|n| n == inner) {
                    return Err(RouteError::DuplicateParameter {
                        pattern: pattern.to_string(),
                        name: inner.to_string(),
                    });
                }
                regex_src.push_str("([^/]+)");
                param_names.push(inner.to_string());
            } else if segment.contains(['{', '}']) {
                return Err(RouteError::InvalidParameter {
                    pattern: pattern.to_string(),
                    segment: segment.to_string(),
                });
            } else {
                regex_src.push_str(&regex::escape(segment));
            }
        }

        regex_src.push('$');
        // Every piece is either escaped or a fixed group, so this cannot fail
        // short of the regex size limit.
        let regex = Regex::new(&regex_src).map_err(|_| RouteError::InvalidParameter {
            pattern: pattern.to_string(),
            segment: pattern.to_string(),
        })?;
        Ok((regex, param_names))
    }
}
