//! Audit middleware: paired inbound/outbound log records per request.
//!
//! [`Audit`] sits between the transport and the router. For every request it
//! emits one **inbound** record before control reaches any handler, then
//! wraps the outgoing body in a [`CaptureBody`] that tees each chunk into a
//! private per-request buffer and emits the matching **outbound** record —
//! with the full response text — at end-of-stream.
//!
//! The client sees byte-identical output: chunks are forwarded unchanged, in
//! the same poll that captures them, with no extra buffering in the delivery
//! path. Capture is a side channel, not a proxy.

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Method, Uri};
use hyper::body::{Body, Frame, SizeHint};
use serde_json::Value;

use crate::logger::{Logger, Metadata};

/// The audit middleware. Cheap to clone; one instance serves the whole
/// process, handed to [`Server::serve`](crate::Server::serve).
#[derive(Clone)]
pub struct Audit {
    logger: Logger,
}

impl Audit {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Emits the inbound record for a request, synchronously, before the
    /// router sees it.
    ///
    /// Headers are rendered as they exist at this moment; downstream
    /// mutations are not reflected. Repeated header names collapse into one
    /// comma-separated value.
    pub(crate) fn inbound(
        &self,
        method: &Method,
        uri: &Uri,
        remote_addr: SocketAddr,
        headers: &HeaderMap,
    ) {
        let url = full_url(uri);

        let mut rendered = Metadata::new();
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes());
            if let Some(Value::String(existing)) = rendered.get_mut(name.as_str()) {
                existing.push_str(", ");
                existing.push_str(&value);
            } else {
                rendered.insert(name.as_str().to_owned(), Value::from(value.into_owned()));
            }
        }

        let mut meta = Metadata::new();
        meta.insert("ip".to_owned(), Value::from(remote_addr.ip().to_string()));
        meta.insert("method".to_owned(), Value::from(method.as_str()));
        meta.insert("url".to_owned(), Value::from(url.clone()));
        meta.insert("headers".to_owned(), Value::Object(rendered));

        self.logger.info(format!("Incoming request {method} {url}"), meta);
    }

    /// Wraps a response body for capture, pairing it with the request it
    /// answers. The outbound record fires when the body finishes.
    pub(crate) fn wrap<B>(
        &self,
        method: &Method,
        uri: &Uri,
        request_body: &[u8],
        response: http::Response<B>,
    ) -> http::Response<CaptureBody<B>> {
        let outbound = Outbound {
            logger: self.logger.clone(),
            method: method.clone(),
            url: full_url(uri),
            request_body: String::from_utf8_lossy(request_body).into_owned(),
            status: response.status().as_u16(),
        };
        response.map(|inner| CaptureBody::new(inner, outbound))
    }
}

fn full_url(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned())
}

/// Everything the outbound record needs besides the captured bytes.
struct Outbound {
    logger: Logger,
    method: Method,
    url: String,
    request_body: String,
    status: u16,
}

impl Outbound {
    fn emit(self, captured: &[u8]) {
        // Lossy decode: a response that is not valid UTF-8 must not take the
        // request down with it. Invalid bytes log as U+FFFD.
        let body = String::from_utf8_lossy(captured).into_owned();

        let mut meta = Metadata::new();
        meta.insert("requestBody".to_owned(), Value::from(self.request_body));
        meta.insert("responseStatus".to_owned(), Value::from(self.status));
        meta.insert("responseBody".to_owned(), Value::from(body));

        self.logger
            .info(format!("Response for {} {}", self.method, self.url), meta);
    }
}

/// Response-body decorator that captures every chunk it forwards.
///
/// Constructed fresh per request; the buffer belongs to this instance alone
/// and dies with it. Invariants, in poll order:
///
/// - every data frame is appended to the buffer and handed on unchanged in
///   the same poll;
/// - at end-of-stream the outbound record is emitted **before**
///   end-of-stream is reported to the transport, so no response completes
///   without its record existing.
pub struct CaptureBody<B> {
    inner: B,
    captured: BytesMut,
    outbound: Option<Outbound>,
}

impl<B> CaptureBody<B> {
    fn new(inner: B, outbound: Outbound) -> Self {
        Self {
            inner,
            captured: BytesMut::new(),
            outbound: Some(outbound),
        }
    }
}

impl<B> Body for CaptureBody<B>
where
    B: Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.captured.extend_from_slice(data);
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(None) => {
                if let Some(outbound) = this.outbound.take() {
                    outbound.emit(&this.captured);
                }
                Poll::Ready(None)
            }
            other => other,
        }
    }

    // Deliberately not forwarded: reporting `false` forces the transport to
    // poll through to the final `None`, which is where the record fires.
    // Content-length framing still comes from `size_hint`.
    fn is_end_stream(&self) -> bool {
        false
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
