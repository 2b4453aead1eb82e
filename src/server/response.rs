use may_minihttp::Response;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};
use tracing::warn;

use crate::dispatcher::HandlerResponse;

/// Upper bound on distinct header lines kept for the process lifetime.
const MAX_INTERNED_HEADER_LINES: usize = 1024;

/// Headers the writer emits itself; handler copies are skipped.
const MANAGED_HEADERS: [&str; 2] = ["content-length", "date"];

/// Reason phrase for the status codes this crate produces
pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// `may_minihttp` only accepts `&'static str` header lines. Lines are interned
/// once and reused, so a fixed set of headers costs a fixed amount of memory.
fn static_header_line(line: String) -> Option<&'static str> {
    static LINES: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();
    let mut lines = LINES
        .get_or_init(|| Mutex::new(HashSet::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    intern_line(&mut lines, line, MAX_INTERNED_HEADER_LINES)
}

/// Return the interned copy of `line`, leaking a new one while the table holds
/// fewer than `capacity` lines. `None` once the table is full.
fn intern_line(
    lines: &mut HashSet<&'static str>,
    line: String,
    capacity: usize,
) -> Option<&'static str> {
    if let Some(existing) = lines.get(line.as_str()) {
        return Some(*existing);
    }
    if lines.len() >= capacity {
        return None;
    }
    let leaked: &'static str = Box::leak(line.into_boxed_str());
    lines.insert(leaked);
    Some(leaked)
}

/// Copy a [`HandlerResponse`] onto the wire response.
///
/// # Header limit
///
/// Each distinct `name: value` line is leaked once and kept for the life of the
/// process, up to 1024 lines. After that, headers whose exact line has not been
/// seen before are dropped from the response with a `warn` log; lines already
/// in the table are still sent. Handlers that put per-request values (ids,
/// timestamps) in headers use up the table quickly.
pub fn write_handler_response(res: &mut Response, resp: HandlerResponse) {
    res.status_code(resp.status as usize, status_reason(resp.status));
    for (name, value) in &resp.headers {
        if MANAGED_HEADERS
            .iter()
            .any(|managed| name.eq_ignore_ascii_case(managed))
        {
            continue;
        }
        match static_header_line(format!("{}: {}", name, value)) {
            Some(line) => {
                res.header(line);
            }
            None => warn!(header = %name, "Header table full - dropping response header"),
        }
    }
    res.body_vec(resp.body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(405), "Method Not Allowed");
        assert_eq!(status_reason(799), "Unknown");
    }

    #[test]
    fn test_header_lines_are_interned() {
        let a = static_header_line("X-Test: one".to_string()).unwrap();
        let b = static_header_line("X-Test: one".to_string()).unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_full_table_drops_new_lines_only() {
        let mut lines = HashSet::new();
        let first = intern_line(&mut lines, "X-A: 1".to_string(), 2).unwrap();
        intern_line(&mut lines, "X-B: 2".to_string(), 2).unwrap();

        assert_eq!(intern_line(&mut lines, "X-C: 3".to_string(), 2), None);
        assert_eq!(lines.len(), 2);
        let again = intern_line(&mut lines, "X-A: 1".to_string(), 2).unwrap();
        assert!(std::ptr::eq(first, again));
    }
}
