//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion — which,
//!    because the audit middleware logs inside the response-completion path,
//!    means every served request has its outbound record before exit.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::middleware::{Audit, CaptureBody};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections, dispatching each request through
    /// `audit` and `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router, audit: Audit) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Arc so concurrent connection tasks share the routing table without
        // copying it.
        let router = Arc::new(router);

        info!(addr = %self.addr, "abaco listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        // Futures must not move in memory after the first poll; `tokio::pin!`
        // pins the shutdown future on the stack so the loop can re-poll it.
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` checks arms top-to-bottom: a SIGTERM stops new
                // accepts even if more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let audit = audit.clone();
                    // TokioIo adapts tokio's AsyncRead/AsyncWrite to the
                    // hyper IO traits.
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection, not once
                        // per connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            let audit = audit.clone();
                            async move { dispatch(router, audit, req, remote_addr).await }
                        });

                        // `auto::Builder` handles both HTTP/1.1 and HTTP/2 —
                        // whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection to finish.
        while tasks.join_next().await.is_some() {}

        info!("abaco stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Core hot path: audits, routes, and answers one request.
///
/// The error type is [`Infallible`] — every failure becomes a response (404,
/// 500 envelope), so hyper never sees an error and no request escapes the
/// audit pair. The sequence per request is fixed: inbound record → route →
/// handler → capture-wrapped response (whose completion emits the outbound
/// record).
async fn dispatch<B>(
    router: Arc<Router>,
    audit: Audit,
    req: http::Request<B>,
    remote_addr: SocketAddr,
) -> Result<http::Response<CaptureBody<Full<Bytes>>>, Infallible>
where
    B: hyper::body::Body,
{
    let (parts, body) = req.into_parts();

    // The inbound record precedes routing, body handling, everything.
    audit.inbound(&parts.method, &parts.uri, remote_addr, &parts.headers);

    // A body that errors mid-read audits as empty; the request still runs.
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => Bytes::new(),
    };

    let response = match router.lookup(&parts.method, parts.uri.path()) {
        Some((handler, params)) => {
            let request = Request::new(
                parts.method.clone(),
                &parts.uri,
                parts.headers,
                body.clone(),
                params,
            );
            handler.call(request).await
        }
        None => Response::status(StatusCode::NOT_FOUND),
    };

    Ok(audit.wrap(&parts.method, &parts.uri, &body, response.into_http()))
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by `kubectl` and the
/// Kubernetes control plane) and **SIGINT** (Ctrl-C, for local dev).
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::routes;
    use crate::test_util::RecordingSink;
    use serde_json::Value;

    fn remote() -> SocketAddr {
        "127.0.0.1:51000".parse().unwrap()
    }

    async fn get(
        sink: &RecordingSink,
        uri: &str,
    ) -> (StatusCode, String) {
        let router = Arc::new(routes(&sink.logger()));
        let audit = Audit::new(sink.logger());
        let req = http::Request::builder()
            .method(http::Method::GET)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap();

        let res = dispatch(router, audit, req, remote()).await.unwrap();
        let status = res.status();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn add_returns_success_envelope() {
        let sink = RecordingSink::new();
        let (status, body) = get(&sink, "/add?num1=4&num2=6").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"statuscode":200,"data":10}"#);
    }

    #[tokio::test]
    async fn exponentiate_two_to_the_ten() {
        let sink = RecordingSink::new();
        let (status, body) = get(&sink, "/exponentiate?base=2&exponent=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"statuscode":200,"data":1024}"#);
    }

    #[tokio::test]
    async fn divide_by_zero_is_500() {
        let sink = RecordingSink::new();
        let (status, body) = get(&sink, "/divide?num1=1&num2=0").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"statuscode":500,"msg":"Cannot divide by zero"}"#);
    }

    #[tokio::test]
    async fn modulo_by_zero_succeeds_with_null_data() {
        let sink = RecordingSink::new();
        let (status, body) = get(&sink, "/modulo?num1=5&num2=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"statuscode":200,"data":null}"#);
    }

    #[tokio::test]
    async fn square_root_routes_both_ways() {
        let sink = RecordingSink::new();
        let (status, body) = get(&sink, "/squareRoot?number=4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"statuscode":200,"data":2}"#);

        let (status, body) = get(&sink, "/squareRoot?number=-1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            r#"{"statuscode":500,"msg":"No real square root of a negative number"}"#
        );
    }

    #[tokio::test]
    async fn malformed_operand_is_500() {
        let sink = RecordingSink::new();
        let (status, body) = get(&sink, "/add?num1=abc&num2=3").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            r#"{"statuscode":500,"msg":"One or both numbers are incorrectly defined"}"#
        );
    }

    #[tokio::test]
    async fn unknown_route_is_404_and_still_audited() {
        let sink = RecordingSink::new();
        let (status, body) = get(&sink, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "");

        let messages = sink.messages();
        assert!(messages.contains(&"Incoming request GET /nope".to_owned()));
        assert!(messages.contains(&"Response for GET /nope".to_owned()));
    }

    #[tokio::test]
    async fn audit_pair_brackets_the_dispatcher_records() {
        let sink = RecordingSink::new();
        let (_, body) = get(&sink, "/add?num1=4&num2=6").await;

        let messages = sink.messages();
        assert_eq!(
            messages,
            [
                "Incoming request GET /add?num1=4&num2=6",
                "New add operation requested: 4 add 6",
                "Handling request",
                "Operation successful: 4 add 6 = 10",
                "Response for GET /add?num1=4&num2=6",
            ]
        );

        // Exactly two records from the middleware reference method + url,
        // and the outbound one holds the bytes the client received.
        let paired: Vec<_> = sink
            .records()
            .into_iter()
            .filter(|r| r.message.contains("GET /add?num1=4&num2=6"))
            .collect();
        assert_eq!(paired.len(), 2);
        assert_eq!(paired[1].metadata["responseStatus"], Value::from(200));
        assert_eq!(paired[1].metadata["responseBody"], Value::from(body));
    }

    #[tokio::test]
    async fn concurrent_requests_keep_their_own_buffers() {
        let sink = RecordingSink::new();

        let (_, add_body) = tokio::join!(
            async { get(&sink, "/multiply?num1=3&num2=4").await },
            async { get(&sink, "/add?num1=4&num2=6").await },
        )
        .1;

        let records = sink.records();
        let outbound_for = |url: &str| {
            records
                .iter()
                .find(|r| r.message == format!("Response for GET {url}"))
                .unwrap()
                .metadata["responseBody"]
                .clone()
        };

        assert_eq!(
            outbound_for("/multiply?num1=3&num2=4"),
            Value::from(r#"{"statuscode":200,"data":12}"#)
        );
        assert_eq!(
            outbound_for("/add?num1=4&num2=6"),
            Value::from(add_body)
        );
    }

    #[tokio::test]
    async fn wrong_method_is_404() {
        let sink = RecordingSink::new();
        let router = Arc::new(routes(&sink.logger()));
        let audit = Audit::new(sink.logger());
        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri("/add?num1=1&num2=2")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let res = dispatch(router, audit, req, remote()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
