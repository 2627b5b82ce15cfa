//! Blocking HTTP client shared by the release catalog and the downloader
//!
//! Wraps a `ureq` agent with the settings every request needs: a fixed
//! `User-Agent` (GitHub rejects requests without one), the optional GitHub
//! proxy prefix from the config, and an optional NexusMods API token that is
//! only ever sent to NexusMods hosts.

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConfigStore, KEY_NEXUS_API, KEY_PROXY_MODE, KEY_PROXY_URL};

pub const USER_AGENT: &str = concat!("mhwmm/", env!("CARGO_PKG_VERSION"));

const GITHUB_HOSTS: &[&str] = &[
    "github.com",
    "api.github.com",
    "raw.githubusercontent.com",
    "objects.githubusercontent.com",
];

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },
}

/// Opaque NexusMods API credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    proxy_prefix: Option<String>,
    api_token: Option<ApiToken>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("proxy_prefix", &self.proxy_prefix)
            .field("api_token", &self.api_token)
            .finish()
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(USER_AGENT)
            .timeout_connect(Duration::from_secs(15))
            .timeout_read(Duration::from_secs(60))
            .build();
        Self {
            agent,
            proxy_prefix: None,
            api_token: None,
        }
    }

    /// Client configured from the `github.*` and `nexusmod.api` config keys.
    pub fn from_config(store: &ConfigStore) -> Self {
        let mut client = Self::new();
        if store.get_bool(KEY_PROXY_MODE).unwrap_or(false) {
            if let Some(prefix) = store.get_str(KEY_PROXY_URL).filter(|p| !p.is_empty()) {
                client = client.with_proxy(prefix);
            }
        }
        if let Some(token) = store.get_str(KEY_NEXUS_API).and_then(ApiToken::new) {
            client = client.with_api_token(token);
        }
        client
    }

    pub fn with_proxy(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.proxy_prefix = Some(prefix);
        self
    }

    pub fn with_api_token(mut self, token: ApiToken) -> Self {
        self.api_token = Some(token);
        self
    }

    /// The URL actually requested: GitHub URLs go through the proxy when one is set.
    pub fn resolve_url(&self, url: &str) -> String {
        match &self.proxy_prefix {
            Some(prefix) if is_github_url(url) => format!("{}{}", prefix, url),
            _ => url.to_string(),
        }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let resolved = self.resolve_url(url);
        let mut request = self.agent.request(method, &resolved);
        if let Some(token) = self.api_token.as_ref().filter(|_| is_nexus_url(url)) {
            request = request.set("apikey", token.expose());
        }
        request
    }

    /// Issue the request. Anything but a final `200 OK` is a status error;
    /// ureq itself only rejects 4xx/5xx.
    fn call(&self, method: &str, url: &str) -> Result<ureq::Response, HttpError> {
        let response = self.request(method, url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => HttpError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(t) => HttpError::Transport {
                url: url.to_string(),
                reason: t.to_string(),
            },
        })?;
        match response.status() {
            200 => Ok(response),
            status => Err(HttpError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }

    /// GET `url`, failing on any status other than 200.
    pub fn get(&self, url: &str) -> Result<ureq::Response, HttpError> {
        self.call("GET", url)
    }

    /// GET `url` and read the whole body as text.
    pub fn get_text(&self, url: &str) -> Result<String, HttpError> {
        self.get(url)?.into_string().map_err(|source| HttpError::Body {
            url: url.to_string(),
            source,
        })
    }

    /// HEAD `url` and report the advertised `Content-Length`, if any.
    pub fn content_length(&self, url: &str) -> Result<Option<u64>, HttpError> {
        let response = self.call("HEAD", url)?;
        Ok(response
            .header("Content-Length")
            .and_then(|v| v.trim().parse::<u64>().ok()))
    }
}

fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

fn is_github_url(url: &str) -> bool {
    host_of(url).is_some_and(|h| GITHUB_HOSTS.iter().any(|g| h.eq_ignore_ascii_case(g)))
}

fn is_nexus_url(url: &str) -> bool {
    host_of(url).is_some_and(|h| {
        let h = h.to_ascii_lowercase();
        h == "nexusmods.com" || h.ends_with(".nexusmods.com")
    })
}
