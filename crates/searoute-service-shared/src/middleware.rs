//! HTTP middleware: request correlation IDs and per-request metrics.
//!
//! The [`MetricsLayer`] records `http_requests_total`,
//! `http_request_duration_seconds`, and request/response sizes, and opens a
//! tracing span carrying the correlation ID so every log line of a request
//! can be joined on it. The ID comes from the `X-Request-ID` header when
//! present, otherwise a time-sortable UUID v7 is generated.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::http::{HeaderMap, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::{info_span, Span};
use uuid::Uuid;

/// Newtype wrapper for request correlation IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new UUID v7 request ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Extract `X-Request-ID` or generate a fresh UUID v7.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(RequestId::from)
        .unwrap_or_else(RequestId::generate)
}

/// Strip the query string from a path for metric labels.
pub fn normalize_path(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

fn status_bucket(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Tower layer recording HTTP metrics and request spans.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsMiddleware { inner }
    }
}

/// Middleware service produced by [`MetricsLayer`].
#[derive(Debug, Clone)]
pub struct MetricsMiddleware<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: http_body::Body + Send + 'static,
    ResBody: http_body::Body + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = MetricsFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = normalize_path(req.uri().path()).to_string();

        if let Some(content_length) = req.headers().get(http::header::CONTENT_LENGTH) {
            if let Ok(size) = content_length.to_str().unwrap_or("0").parse::<f64>() {
                metrics::histogram!(
                    "http_request_size_bytes",
                    "method" => method.clone(),
                    "path" => path.clone()
                )
                .record(size);
            }
        }

        let request_id = extract_or_generate_request_id(req.headers());
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            path = %path,
        );

        {
            let _enter = span.enter();
            tracing::info!("handling request");
        }

        let future = self.inner.call(req);

        MetricsFuture {
            inner: future,
            start,
            method,
            path,
            span,
        }
    }
}

pin_project! {
    /// Future wrapper that records metrics on completion.
    pub struct MetricsFuture<F> {
        #[pin]
        inner: F,
        start: Instant,
        method: String,
        path: String,
        span: Span,
    }
}

impl<F, ResBody, E> Future for MetricsFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
    ResBody: http_body::Body,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _enter = this.span.enter();

        match this.inner.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                let duration_secs = this.start.elapsed().as_secs_f64();

                match &result {
                    Ok(response) => {
                        let status = response.status().as_u16();
                        metrics::counter!(
                            "http_requests_total",
                            "method" => this.method.clone(),
                            "path" => this.path.clone(),
                            "status" => status_bucket(status)
                        )
                        .increment(1);
                        metrics::histogram!(
                            "http_request_duration_seconds",
                            "method" => this.method.clone(),
                            "path" => this.path.clone()
                        )
                        .record(duration_secs);

                        tracing::info!(
                            status = status,
                            latency_ms = duration_secs * 1000.0,
                            "request completed"
                        );
                    }
                    Err(_) => {
                        metrics::counter!(
                            "http_requests_total",
                            "method" => this.method.clone(),
                            "path" => this.path.clone(),
                            "status" => "5xx"
                        )
                        .increment(1);

                        tracing::error!(latency_ms = duration_secs * 1000.0, "request failed");
                    }
                }

                Poll::Ready(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn generated_ids_are_unique_uuids() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn header_id_is_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-abc"));
        assert_eq!(extract_or_generate_request_id(&headers).as_str(), "req-abc");
    }

    #[test]
    fn empty_header_falls_back_to_generation() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static(""));
        assert_eq!(extract_or_generate_request_id(&headers).as_str().len(), 36);
    }

    #[test]
    fn path_normalization_strips_query() {
        assert_eq!(normalize_path("/ports/search?q=rotterdam"), "/ports/search");
        assert_eq!(normalize_path("/routes/calculate"), "/routes/calculate");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn status_buckets() {
        assert_eq!(status_bucket(200), "2xx");
        assert_eq!(status_bucket(404), "4xx");
        assert_eq!(status_bucket(429), "4xx");
        assert_eq!(status_bucket(503), "5xx");
        assert_eq!(status_bucket(100), "other");
    }
}
