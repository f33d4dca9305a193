//! Blocking HTTP implementation of the map fetcher.

use anyhow::{anyhow, Result as AnyResult};
use portalmap_ingest::MapFetcher;
use portalmap_model::{Error, ErrorKind, MapDetail, MapSummary, Result, SpaceId};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;

pub struct HttpFetcher {
    client: Client,
    base: Url,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> AnyResult<Self> {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|e| anyhow!("invalid api key header name: {e}"))?;
        let mut secret = HeaderValue::from_str(&config.api_key)
            .map_err(|e| anyhow!("api key is not a valid header value: {e}"))?;
        secret.set_sensitive(true);
        headers.insert(name, secret);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("portalmap/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow!("failed to build http client: {e}"))?;

        Ok(Self {
            client,
            base: config.api_base_url.clone(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        })
    }

    /// `{base}/api/v2/spaces/{space_id}/maps[/{map_id}]`.
    ///
    /// The space id is one path segment; its separator and name are
    /// percent-encoded, never split.
    pub fn endpoint(&self, space_id: &SpaceId, map_id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "v2", "spaces", space_id.as_str(), "maps"]);
            if let Some(map_id) = map_id {
                segments.push(map_id);
            }
        }
        url
    }

    fn get_json(&self, url: &Url, map_id: Option<&str>) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            match self.get_once(url, map_id) {
                Err(err) if err.kind() == ErrorKind::RemoteUnavailable && attempt < self.max_retries => {
                    let delay = self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        url = %url,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        cause = %err.cause(),
                        "request failed, retrying"
                    );
                    thread::sleep(delay);
                }
                outcome => return outcome,
            }
        }
    }

    fn get_once(&self, url: &Url, map_id: Option<&str>) -> Result<Value> {
        debug!(url = %url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| Error::remote_unavailable(map_id, format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), map_id, url));
        }
        let bytes = resp.bytes().map_err(|e| {
            Error::remote_unavailable(map_id, format!("failed to read body from {url}: {e}"))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::schema(map_id, format!("invalid JSON from {url}: {e}")))
    }
}

/// Translate a non-2xx status into an error kind.
pub fn status_error(status: u16, map_id: Option<&str>, url: &Url) -> Error {
    let cause = format!("HTTP {status} from {url}");
    match status {
        401 | 403 => Error::unauthenticated(map_id, cause),
        404 => Error::not_found(map_id, cause),
        _ => Error::remote_unavailable(map_id, cause),
    }
}

impl MapFetcher for HttpFetcher {
    fn list_maps(&self, space_id: &SpaceId) -> Result<Vec<MapSummary>> {
        let url = self.endpoint(space_id, None);
        let listing = self.get_json(&url, None)?;
        MapSummary::list_from_value(&listing)
    }

    fn fetch_map(&self, space_id: &SpaceId, map_id: &str) -> Result<MapDetail> {
        let url = self.endpoint(space_id, Some(map_id));
        let document = self.get_json(&url, Some(map_id))?;
        MapDetail::from_document(map_id, document)
    }
}
