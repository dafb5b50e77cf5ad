//! HTTP handlers for the proxy.
//!
//! - GET /health - health check
//! - GET /sse - upstream SSE stream, relayed event by event
//! - POST <anything else> - forwarded to the upstream origin with the same
//!   path and query (the message endpoint announced over SSE)

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::future;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::sse::{SseClientFactory, SseEvent};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub sse: SseClientFactory,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub upstream: String,
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        upstream: state.config.upstream_url.to_string(),
    })
}

/// GET /sse - open the upstream stream and relay it until either side closes.
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ProxyError> {
    let upstream_url = state.config.upstream_url.to_string();
    let upstream = state.sse.connect(&upstream_url).await?;
    info!(upstream = %upstream_url, "Relaying SSE stream");

    let stream = upstream
        .take_while(move |item| {
            if let Err(e) = item {
                warn!(upstream = %upstream_url, error = %e, "Upstream SSE stream failed");
            }
            future::ready(item.is_ok())
        })
        .filter_map(|item| future::ready(item.ok()))
        .map(|ev| Ok::<_, Infallible>(relay_event(ev)));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

/// Any request not matched above. Only POST is forwarded.
pub async fn forward_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if method != Method::POST {
        return Err(ProxyError::NotFound(format!("{} {}", method, uri.path())));
    }

    let target = state.config.upstream_target(uri.path(), uri.query());
    debug!(target = %target, bytes = body.len(), "Forwarding message");

    let mut request = state.sse.http().post(target).body(body);
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        request = request.header(CONTENT_TYPE, content_type.clone());
    }
    if let Some(token) = state.sse.bearer_token() {
        request = request.bearer_auth(token);
    }

    let upstream = request.send().await?;
    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let bytes = upstream.bytes().await?;

    let mut response = (status, bytes).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}

/// Re-encode an upstream event. `message` is the SSE default name and is not
/// repeated. CR cannot be sent in data; an id containing NUL is dropped.
fn relay_event(ev: SseEvent) -> Event {
    let mut out = Event::default().data(ev.data.replace('\r', ""));
    if !ev.event.is_empty() && ev.event != "message" {
        out = out.event(ev.event);
    }
    if !ev.id.is_empty() && !ev.id.contains('\0') {
        out = out.id(ev.id);
    }
    out
}

