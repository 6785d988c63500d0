//! The calculator service — seven arithmetic routes, fully audit-logged.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example calculator
//!
//! Try:
//!   curl 'http://localhost:3000/add?num1=4&num2=6'
//!   curl 'http://localhost:3000/exponentiate?base=2&exponent=10'
//!   curl 'http://localhost:3000/divide?num1=1&num2=0'
//!   curl 'http://localhost:3000/squareRoot?number=16'
//!   curl 'http://localhost:3000/modulo?num1=5&num2=0'
//!   curl http://localhost:3000/healthz

use abaco::middleware::Audit;
use abaco::{health, routes, Logger, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // One logger for the whole process; the middleware and every route
    // handler hold clones of this handle.
    let logger = Logger::new("calculator_microservice");

    let app = routes(&logger)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_owned());
    Server::bind(&format!("0.0.0.0:{port}"))
        .serve(app, Audit::new(logger))
        .await
        .expect("server error");
}
