//! # CLI Module
//!
//! Command-line front end for the `patternkit` binary.
//!
//! ## Commands
//!
//! ### `serve-http`
//!
//! Serve the hello-world app (`GET /` answers `Hello, World!`):
//!
//! ```bash
//! patternkit serve-http --addr 127.0.0.1:8080
//! ```
//!
//! ### `serve-greeter`
//!
//! Serve the TCP greeter:
//!
//! ```bash
//! patternkit serve-greeter --addr 0.0.0.0:8081 --greeting "hi there"
//! ```
//!
//! Both serve commands read an optional YAML file (`--config`, or
//! `PKIT_CONFIG`); flags win over the file. They run until SIGINT or SIGTERM.
//!
//! ### `insert`
//!
//! ```bash
//! patternkit insert --value 4 1 3 5 7     # prints: 1 3 4 5 7
//! ```
//!
//! Items must already be sorted; an unsorted list is rejected.
//!
//! ### `pipeline` / `hello`
//!
//! ```bash
//! patternkit pipeline 1 2 3     # prints 1, 4, 9 on separate lines
//! patternkit hello a b
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run, run_cli, Cli, Commands};
