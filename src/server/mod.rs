//! # Server Module
//!
//! HTTP serving on `may_minihttp`: request parsing, routing + dispatch, and
//! response writing.
//!
//! ```rust,no_run
//! use patternkit::server::{hello_service, HttpServer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = HttpServer(hello_service()?).start("0.0.0.0:8080")?;
//! handle.wait_ready()?;
//! // curl http://localhost:8080/  ->  Hello, World!
//! handle.join().ok();
//! # Ok(())
//! # }
//! ```
//!
//! Unmatched paths answer 404 and a known path with the wrong method answers 405
//! with an `Allow` header; both bodies are JSON
//! `{ "error": ..., "method": ..., "path": ... }`.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, split_path_and_query, ParsedRequest};
pub use response::write_handler_response;
pub use service::{hello_service, home_handler, AppBuilder, AppService};
