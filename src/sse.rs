//! SSE client factory, handed to the server instead of living in global state.

use eventsource_stream::Eventsource;
use futures::stream::{BoxStream, StreamExt};
use reqwest::header::ACCEPT;
use tracing::debug;

/// A stream of events from one upstream SSE connection.
pub type SseStream = BoxStream<'static, Result<SseEvent, SseError>>;

/// A single server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event name; `"message"` when the upstream did not set one.
    pub event: String,
    pub data: String,
    /// Last event id; empty when none was sent.
    pub id: String,
}

impl From<eventsource_stream::Event> for SseEvent {
    fn from(ev: eventsource_stream::Event) -> Self {
        Self {
            event: ev.event,
            data: ev.data,
            id: ev.id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SseError {
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("SSE stream error: {0}")]
    Stream(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Opens SSE connections. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct SseClientFactory {
    http: reqwest::Client,
    bearer_token: Option<String>,
}

impl SseClientFactory {
    pub fn new() -> Result<Self, SseError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SseError::Client)?;

        Ok(Self {
            http,
            bearer_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` on every connection.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    /// The underlying HTTP client, for plain requests to the same upstream.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Connect to `url` and return its event stream.
    pub async fn connect(&self, url: &str) -> Result<SseStream, SseError> {
        let mut request = self.http.get(url).header(ACCEPT, "text/event-stream");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| SseError::Connect {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SseError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        debug!(url = %url, "SSE connection established");

        Ok(response
            .bytes_stream()
            .eventsource()
            .map(|item| match item {
                Ok(ev) => Ok(SseEvent::from(ev)),
                Err(e) => Err(SseError::Stream(e.to_string())),
            })
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_conversion_keeps_fields() {
        let ev = eventsource_stream::Event {
            event: "endpoint".into(),
            data: "/messages/?session_id=1".into(),
            id: "7".into(),
            retry: None,
        };
        assert_eq!(
            SseEvent::from(ev),
            SseEvent {
                event: "endpoint".into(),
                data: "/messages/?session_id=1".into(),
                id: "7".into(),
            }
        );
    }

    #[test]
    fn bearer_token_is_optional() {
        let factory = SseClientFactory::new().unwrap();
        assert_eq!(factory.bearer_token(), None);
        let factory = factory.with_bearer_token(Some("t0k".into()));
        assert_eq!(factory.bearer_token(), Some("t0k"));
    }

    #[tokio::test]
    async fn connect_refused_is_connect_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let factory = SseClientFactory::new().unwrap();
        let err = factory
            .connect(&format!("http://127.0.0.1:{port}/sse"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SseError::Connect { .. }), "got {err:?}");
    }
}
