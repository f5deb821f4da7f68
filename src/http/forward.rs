//! Request forwarding to the fixed upstream.
//!
//! # Responsibilities
//! - Rewrite the request authority to the upstream
//! - Forward method, path, query, filtered headers and the body stream
//! - Relay status, headers and body back without buffering
//!
//! # Design Decisions
//! - One dispatch per request: no retries, no redirects
//! - Upstream leg is always plain HTTP/1.1
//! - Failures reach the client as an opaque 500; details only go to the log

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        Request, Response, StatusCode, Uri, Version,
    },
    response::IntoResponse,
};
use hyper::body::{Body as HttpBody, Frame, Incoming, SizeHint};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use thiserror::Error;

use crate::security::headers::filter_request_headers;

/// Body sent to the client when the upstream cannot be reached.
pub const UPSTREAM_UNREACHABLE: &str = "Could not reach origin server";

/// Per-request failures. None of them affect other requests.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream URI: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUriParts),

    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_UNREACHABLE).into_response()
    }
}

/// State shared by every request handler.
#[derive(Clone)]
pub struct ForwardState {
    pub upstream: Authority,
    pub client: Client<HttpConnector, Body>,
}

impl ForwardState {
    /// State with a default hyper client for `upstream`.
    pub fn new(upstream: Authority) -> Self {
        let client = Client::builder(hyper_util::rt::TokioExecutor::new())
            .build(HttpConnector::new());
        Self { upstream, client }
    }
}

/// Point `uri` at the upstream, keeping path and query.
pub fn rewrite_uri(uri: &Uri, upstream: &Authority) -> Result<Uri, ForwardError> {
    let mut parts = uri.clone().into_parts();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = Some(upstream.clone());
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    Ok(Uri::from_parts(parts)?)
}

/// Handler for every inbound request.
pub async fn proxy_handler(
    State(state): State<ForwardState>,
    request: Request<Body>,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    tracing::info!("--> {} {}", method, uri);

    match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method = %method, uri = %uri, error = %e, "Upstream error");
            e.into_response()
        }
    }
}

/// Send `request` to the upstream once and stream its response back.
pub async fn forward(
    state: &ForwardState,
    request: Request<Body>,
) -> Result<axum::response::Response, ForwardError> {
    let (parts, body) = request.into_parts();

    let mut headers = filter_request_headers(&parts.headers);
    // The client derives Host from the rewritten URI.
    headers.remove(header::HOST);

    let mut builder = Request::builder()
        .method(parts.method)
        .version(Version::HTTP_11)
        .uri(rewrite_uri(&parts.uri, &state.upstream)?);
    if let Some(outbound) = builder.headers_mut() {
        *outbound = headers;
    }
    let upstream_request = builder.body(body)?;

    let response = state.client.request(upstream_request).await?;
    let status = response.status();
    tracing::info!("<-- {}", status);

    let (parts, incoming) = response.into_parts();
    let body = Body::new(RelayBody::new(incoming, status));
    Ok(Response::from_parts(parts, body))
}

/// Upstream body on its way to the client.
///
/// Forwards the upstream size hint so the server sees the end of a
/// Content-Length body itself. Logs a relay that ends early: an upstream read
/// error, or the client going away and hyper dropping the body. Dropping it
/// also releases the upstream connection.
struct RelayBody {
    inner: Incoming,
    status: StatusCode,
    expected: Option<u64>,
    relayed: u64,
    finished: bool,
}

impl RelayBody {
    fn new(inner: Incoming, status: StatusCode) -> Self {
        let expected = inner.size_hint().exact();
        let finished = inner.is_end_stream();
        Self {
            inner,
            status,
            expected,
            relayed: 0,
            finished,
        }
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            tracing::debug!(status = %self.status, bytes = self.relayed, "Upstream body relayed");
        }
    }
}

impl HttpBody for RelayBody {
    type Data = Bytes;
    type Error = hyper::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, hyper::Error>>> {
        let this = &mut *self;
        let frame = match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(frame) => frame,
            Poll::Pending => return Poll::Pending,
        };
        match &frame {
            Some(Ok(frame)) => {
                if let Some(data) = frame.data_ref() {
                    this.relayed += data.len() as u64;
                }
                if this.expected == Some(this.relayed) {
                    this.finish();
                }
            }
            Some(Err(e)) => {
                tracing::warn!(
                    status = %this.status,
                    bytes = this.relayed,
                    error = %e,
                    "Upstream body relay failed"
                );
                this.finished = true;
            }
            None => this.finish(),
        }
        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for RelayBody {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                status = %self.status,
                bytes = self.relayed,
                "Client went away before the upstream body was relayed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_replaces_authority_only() {
        let upstream = Authority::from_static("upstream.example:9000");
        let uri: Uri = "https://anyhost/path?q=1".parse().unwrap();

        let rewritten = rewrite_uri(&uri, &upstream).unwrap();
        assert_eq!(rewritten.authority().unwrap().as_str(), "upstream.example:9000");
        assert_eq!(rewritten.path_and_query().unwrap().as_str(), "/path?q=1");
        assert_eq!(rewritten.scheme(), Some(&Scheme::HTTP));
    }

    #[test]
    fn rewrite_origin_form() {
        let upstream = Authority::from_static("localhost:3000");
        let uri: Uri = "/a/b?x=1&y=2".parse().unwrap();

        let rewritten = rewrite_uri(&uri, &upstream).unwrap();
        assert_eq!(rewritten.to_string(), "http://localhost:3000/a/b?x=1&y=2");
    }

    #[test]
    fn rewrite_authority_form_gets_root_path() {
        let upstream = Authority::from_static("localhost:3000");
        let uri: Uri = "anyhost:443".parse().unwrap();

        let rewritten = rewrite_uri(&uri, &upstream).unwrap();
        assert_eq!(rewritten.to_string(), "http://localhost:3000/");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_opaque_500() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let state = ForwardState::new(Authority::try_from(addr.to_string().as_str()).unwrap());
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = proxy_handler(State(state), request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body, UPSTREAM_UNREACHABLE);
    }
}
