//! Session-holding HTTP client for the qBittorrent WebUI API.
//!
//! # Design
//! - The `SID` cookie issued by login lives in the client's cookie store and rides along
//!   on every later request; the session is never refreshed.
//! - Login succeeds only on the literal `Ok.` body; qBittorrent answers bad credentials
//!   with `200 Fails.`, so the status alone is not enough.
//! - API paths are appended to the configured endpoint so reverse-proxy prefixes survive.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use stowage_config::{Config, Credentials};
use stowage_torrent_core::{CompletedCatalog, CompletedItem, TorrentError, TorrentResult};
use tracing::{debug, info};
use url::Url;

const LOGIN_PATH: &str = "/api/v2/auth/login";
const TORRENTS_INFO_PATH: &str = "/api/v2/torrents/info";
const LOGIN_OK: &str = "Ok.";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated session against one qBittorrent instance.
#[derive(Debug, Clone)]
pub struct QbClient {
    http: Client,
    endpoint: Url,
    credentials: Credentials,
}

impl QbClient {
    /// Build a client for the configured endpoint. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`TorrentError::ClientBuild`] if the API key is not a valid header value
    /// or the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> TorrentResult<Self> {
        let mut default_headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|err| TorrentError::ClientBuild {
                    source: Box::new(err),
                })?;
            value.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .default_headers(default_headers)
            .build()
            .map_err(|err| TorrentError::ClientBuild {
                source: Box::new(err),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            credentials: config.credentials.clone(),
        })
    }

    /// Absolute URL for an API path under the configured endpoint.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint.as_str().trim_end_matches('/'))
    }

    /// Log in and store the session cookie.
    ///
    /// # Errors
    ///
    /// Returns [`TorrentError::Authentication`] on transport failure, a non-success
    /// status, or any body other than `Ok.`.
    pub async fn authenticate(&self) -> TorrentResult<()> {
        let url = self.api_url(LOGIN_PATH);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|err| TorrentError::Authentication {
                url: url.clone(),
                reason: "transport",
                status: None,
                source: Some(Box::new(err)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TorrentError::Authentication {
                url,
                reason: "http_status",
                status: Some(status.as_u16()),
                source: None,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| TorrentError::Authentication {
                url: url.clone(),
                reason: "body",
                status: Some(status.as_u16()),
                source: Some(Box::new(err)),
            })?;
        if body != LOGIN_OK {
            return Err(TorrentError::Authentication {
                url,
                reason: "unexpected_body",
                status: Some(status.as_u16()),
                source: None,
            });
        }

        info!(
            endpoint = %self.endpoint,
            user = %self.credentials.username,
            "authenticated against qBittorrent"
        );
        Ok(())
    }

    async fn fetch_completed(&self) -> TorrentResult<Vec<CompletedItem>> {
        let url = self.api_url(TORRENTS_INFO_PATH);
        let response = self
            .http
            .get(&url)
            .query(&[("filter", "completed")])
            .send()
            .await
            .map_err(|err| remote_error(&url, None, Some(err)))?;
        let response = ensure_success(&url, response)?;
        let items: Vec<CompletedItem> = response
            .json()
            .await
            .map_err(|err| remote_error(&url, err.status(), Some(err)))?;

        debug!(count = items.len(), "listed completed torrents");
        Ok(items)
    }
}

#[async_trait]
impl CompletedCatalog for QbClient {
    async fn list_completed(&self) -> TorrentResult<Vec<CompletedItem>> {
        self.fetch_completed().await
    }
}

fn ensure_success(url: &str, response: Response) -> TorrentResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(remote_error(url, Some(status), None))
    }
}

fn remote_error(
    url: &str,
    status: Option<reqwest::StatusCode>,
    source: Option<reqwest::Error>,
) -> TorrentError {
    TorrentError::Remote {
        operation: "list_completed",
        url: url.to_string(),
        status: status.map(|code| code.as_u16()),
        source: source.map(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>),
    }
}
