//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them next to the calculator routes:
//!
//! ```rust,no_run
//! use abaco::{health, routes, Logger};
//!
//! let logger = Logger::new("calculator_microservice");
//! let app = routes(&logger)
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```

use crate::{Request, Response};

/// Liveness probe handler. Always `200 OK` with body `"ok"` — if the process
/// answers HTTP at all, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe handler. This service has no warm-up dependencies, so it
/// is ready as soon as it is alive.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
