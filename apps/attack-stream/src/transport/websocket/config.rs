use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Where the reference backend listens.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8000/ws";

/// Fixed connection target for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    /// Path including any query string, always starting with `/`.
    pub path: String,
    /// `wss://` when set.
    pub secure: bool,
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid endpoint url '{url}': {source}")]
    Invalid {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported scheme '{0}', expected ws or wss")]
    UnsupportedScheme(String),
    #[error("endpoint url '{0}' has no host")]
    MissingHost(String),
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: normalize_path(path.into()),
            secure: false,
        }
    }

    pub fn with_tls(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Accepts `ws://` and `wss://` URLs. A bare `host:port/path` gets `ws://`
    /// for loopback hosts and `wss://` otherwise.
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let raw = raw.trim();
        let candidate = if raw.contains("://") {
            raw.to_string()
        } else if raw.starts_with("localhost") || raw.starts_with("127.0.0.1") {
            format!("ws://{raw}")
        } else {
            format!("wss://{raw}")
        };

        let url = Url::parse(&candidate).map_err(|source| EndpointError::Invalid {
            url: raw.to_string(),
            source,
        })?;
        let secure = match url.scheme() {
            "ws" => false,
            "wss" => true,
            other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
        };
        let host = url
            .host_str()
            .ok_or_else(|| EndpointError::MissingHost(raw.to_string()))?;
        // Avoid resolving localhost to ::1 when the backend only binds IPv4.
        let host = if host == "localhost" { "127.0.0.1" } else { host };
        let port = url
            .port_or_known_default()
            .unwrap_or(if secure { 443 } else { 80 });
        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self::new(host, port, path).with_tls(secure))
    }

    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}:{}{}", self.host, self.port, self.path)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("127.0.0.1", 8000, "/ws")
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

fn normalize_path(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_timeout::timeout]
    fn default_matches_reference_backend() {
        assert_eq!(Endpoint::default().url(), DEFAULT_URL);
        assert_eq!(Endpoint::parse(DEFAULT_URL).unwrap(), Endpoint::default());
    }

    #[test_timeout::timeout]
    fn parses_secure_url_with_default_port() {
        let endpoint = Endpoint::parse("wss://ids.example.com/stream?v=2").unwrap();
        assert!(endpoint.secure);
        assert_eq!(endpoint.port, 443);
        assert_eq!(endpoint.path, "/stream?v=2");
        assert_eq!(endpoint.url(), "wss://ids.example.com:443/stream?v=2");
    }

    #[test_timeout::timeout]
    fn bare_localhost_gets_plain_ws_and_ipv4() {
        let endpoint = Endpoint::parse("localhost:9000/ws").unwrap();
        assert!(!endpoint.secure);
        assert_eq!(endpoint.host, "127.0.0.1");
        assert_eq!(endpoint.url(), "ws://127.0.0.1:9000/ws");
    }

    #[test_timeout::timeout]
    fn rejects_http_scheme() {
        let err = Endpoint::parse("http://127.0.0.1:8000/ws").unwrap_err();
        assert!(matches!(err, EndpointError::UnsupportedScheme(scheme) if scheme == "http"));
    }

    #[test_timeout::timeout]
    fn new_adds_leading_slash() {
        assert_eq!(Endpoint::new("10.0.0.5", 8000, "ws").path, "/ws");
    }
}
