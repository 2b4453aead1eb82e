//! # patternkit
//!
//! **patternkit** is a set of small, independent building blocks on the `may`
//! coroutine runtime, centred on ordered insertion into sorted sequences.
//!
//! ## Overview
//!
//! None of the modules depend on each other beyond the shared ambient stack
//! (logging, runtime configuration, panic recovery):
//!
//! - **[`ordered`]** - insert a value into an already sorted sequence, keeping it
//!   sorted; the one piece with a real algorithmic contract
//! - **[`pipeline`]** - producer and transform stages connected by unbounded
//!   channels, each running in its own coroutine
//! - **[`router`]** - regex-based path matching with `{param}` captures
//! - **[`dispatcher`]** - named handlers behind a middleware chain
//! - **[`middleware`]** - request logging and metrics middleware
//! - **[`server`]** - HTTP serving on `may_minihttp`
//! - **[`greeter`]** - a TCP server that greets every client and hangs up
//! - **[`recovery`]** - turn a panic into a logged, inspectable error
//! - **[`fixture`]** - hello-world functions for exercising test tooling
//!
//! Ambient modules: [`logging`] (tracing subscriber setup), [`config`] (YAML
//! application config), [`runtime_config`] (coroutine stack size from the
//! environment), [`ids`] (request IDs) and [`cli`] (the `patternkit` binary).
//!
//! ## Quick Start
//!
//! ```rust
//! use patternkit::ordered::insert;
//!
//! let sorted = insert(&[1, 3, 5, 7], 4);
//! assert_eq!(sorted, vec![1, 3, 4, 5, 7]);
//! ```
//!
//! Serving the demo HTTP app:
//!
//! ```rust,no_run
//! use patternkit::server::{hello_service, HttpServer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! patternkit::runtime_config::RuntimeConfig::from_env().apply();
//! let handle = HttpServer(hello_service()?).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! handle.join().ok();
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `PKIT_STACK_SIZE` | coroutine stack size, decimal or `0x` hex | `0x10000` |
//! | `PKIT_WORKERS` | `may` worker threads | runtime default |
//! | `PKIT_LOG_LEVEL` | `trace`..`error` | `info` |
//! | `PKIT_LOG_FORMAT` | `json` or `pretty` | `json` |
//! | `PKIT_LOG_ASYNC` | non-blocking writer | `true` |
//! | `PKIT_LOG_TARGET_FILTER` | extra `EnvFilter` directives | unset |

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod fixture;
pub mod greeter;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod ordered;
pub mod pipeline;
pub mod recovery;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use ordered::{insert, insertion_index, OrderedError};
pub use recovery::{recover, Recovered};
