//! Proxy server configuration, read from the launcher's [`Env`].

use crate::env::Env;
use crate::error::{ProxyError, Result};
use reqwest::Url;

pub const UPSTREAM_URL_VAR: &str = "MCP_UPSTREAM_URL";
pub const UPSTREAM_TOKEN_VAR: &str = "MCP_UPSTREAM_TOKEN";
pub const HOST_VAR: &str = "MCP_PROXY_HOST";

const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Upstream SSE endpoint relayed on `GET /sse`.
    pub upstream_url: Url,
    /// Bearer token sent with every upstream request.
    pub upstream_token: Option<String>,
    /// Host to bind to.
    pub host: String,
}

impl ProxyConfig {
    pub fn from_env(env: &Env) -> Result<Self> {
        let raw = env
            .get(UPSTREAM_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ProxyError::Config(format!("{} is not set", UPSTREAM_URL_VAR)))?;

        let upstream_url = Url::parse(raw.trim()).map_err(|e| {
            ProxyError::Config(format!("{} is not a valid URL ({}): {}", UPSTREAM_URL_VAR, e, raw))
        })?;
        if !matches!(upstream_url.scheme(), "http" | "https") {
            return Err(ProxyError::Config(format!(
                "{} must be an http(s) URL: {}",
                UPSTREAM_URL_VAR, raw
            )));
        }

        let upstream_token = env
            .get(UPSTREAM_TOKEN_VAR)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let host = env
            .get(HOST_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_HOST)
            .to_string();

        Ok(Self {
            upstream_url,
            upstream_token,
            host,
        })
    }

    /// Upstream URL for a client request to `path` with `query` on the proxy.
    pub fn upstream_target(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.upstream_url.clone();
        url.set_path(path);
        url.set_query(query);
        url
    }
}
