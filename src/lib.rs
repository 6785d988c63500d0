//! # abaco
//!
//! A minimal HTTP arithmetic microservice where every request and response
//! is captured for audit. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Seven operations — add, subtract, multiply, divide, exponentiate,
//! squareRoot, modulo — each a GET route taking operands as query
//! parameters and answering a JSON envelope: `{"statuscode":200,"data":N}`
//! on success, `{"statuscode":500,"msg":"..."}` on any validation or domain
//! failure. One request, one operation; no compound expressions, no history.
//!
//! The part worth reading is the audit middleware. Every response body is
//! wrapped in a per-request [`middleware::CaptureBody`] that forwards each
//! chunk to the client unchanged while teeing a copy into a private buffer,
//! and emits the outbound log record — request line, status, full response
//! text — strictly before the transport hears end-of-stream. Paired with the
//! inbound record emitted before routing, no request can complete without
//! both records existing.
//!
//! Like any service meant to live behind a reverse proxy, abaco leaves TLS,
//! rate limiting, body-size limits, and slow-client protection to nginx /
//! ingress. Authentication and authorization are deliberately absent.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use abaco::{middleware::Audit, routes, Logger, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let logger = Logger::new("calculator_microservice");
//!     let app = routes(&logger);
//!
//!     Server::bind("0.0.0.0:3000")
//!         .serve(app, Audit::new(logger))
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! Then:
//!
//! ```text
//! $ curl 'http://localhost:3000/add?num1=4&num2=6'
//! {"statuscode":200,"data":10}
//! $ curl 'http://localhost:3000/divide?num1=1&num2=0'
//! {"statuscode":500,"msg":"Cannot divide by zero"}
//! ```

mod dispatch;
mod envelope;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod logger;
pub mod middleware;
pub mod ops;

#[cfg(test)]
mod test_util;

pub use dispatch::{routes, Operand};
pub use envelope::Envelope;
pub use error::{Error, OpError};
pub use handler::Handler;
pub use logger::{Level, Logger, Metadata, Record, Sink, TracingSink};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
