//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the `may` coroutine runtime used by the
//! pipeline stages and the HTTP and TCP servers.
//!
//! ## Environment Variables
//!
//! ### `PKIT_STACK_SIZE`
//!
//! Stack size for every coroutine spawned by this crate. Accepts decimal
//! (`65536`) or hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! ### `PKIT_WORKERS`
//!
//! Number of `may` scheduler worker threads. Default: number of CPUs, as chosen
//! by `may` itself.
//!
//! ## Usage
//!
//! ```rust
//! use patternkit::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

/// Default coroutine stack size (64 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Scheduler worker threads; `None` leaves the `may` default in place
    pub workers: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            workers: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("PKIT_STACK_SIZE")
            .ok()
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        let workers = env::var("PKIT_WORKERS")
            .ok()
            .and_then(|val| val.parse().ok())
            .filter(|&n: &usize| n > 0);
        RuntimeConfig {
            stack_size,
            workers,
        }
    }

    /// Push this configuration into the global `may` runtime.
    ///
    /// Must run before the first coroutine is spawned to affect the worker count.
    pub fn apply(&self) {
        let cfg = may::config();
        cfg.set_stack_size(self.stack_size);
        if let Some(workers) = self.workers {
            cfg.set_workers(workers);
        }
    }
}

/// Parse a byte count given in decimal or `0x`-prefixed hexadecimal.
#[must_use]
pub fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("16384"), Some(16384));
        assert_eq!(parse_size("0x4000"), Some(0x4000));
        assert_eq!(parse_size(" 0X8000 "), Some(0x8000));
        assert_eq!(parse_size("lots"), None);
    }

    #[test]
    fn test_default() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.stack_size, DEFAULT_STACK_SIZE);
        assert_eq!(cfg.workers, None);
    }
}
