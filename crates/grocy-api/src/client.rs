// Hand-crafted async HTTP client for the Grocy REST API.
//
// Base path: {scheme}://{host}:{port}/{subpath}/api/
// Auth: GROCY-API-KEY header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::filter::{QueryFilter, to_query_params};
use crate::{Error, TransportConfig};

/// Header Grocy reads the API key from.
pub const API_KEY_HEADER: &str = "GROCY-API-KEY";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for a single Grocy instance.
///
/// Read-only after construction; clone it freely, clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct GrocyClient {
    http: reqwest::Client,
    base_url: Url,
    api_url: Url,
}

impl std::fmt::Debug for GrocyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrocyClient")
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GrocyClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a server URL (optionally with a sub-path), port and key.
    ///
    /// Injects `GROCY-API-KEY` as a sensitive default header on every
    /// request.
    pub fn new(
        url: &str,
        port: u16,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(url, port, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(url: &str, port: u16, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(url, port)?;
        let api_url = base_url.join("api/")?;
        Ok(Self {
            http,
            base_url,
            api_url,
        })
    }

    /// Split the configured URL into origin and sub-path, apply the port,
    /// and return `{scheme}://{host}:{port}/{subpath}/`.
    fn normalize_base_url(raw: &str, port: u16) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(Error::InvalidUrl(url::ParseError::EmptyHost));
        }
        url.set_port(Some(port))
            .map_err(|()| Error::InvalidUrl(url::ParseError::InvalidPort))?;

        let path = url.path().trim_matches('/').to_owned();
        if path.is_empty() {
            url.set_path("/");
        } else {
            url.set_path(&format!("/{path}/"));
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// Server root including any sub-path, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// API root (`{base}/api/`).
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.api_url.join(path)?)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_filtered<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[QueryFilter],
    ) -> Result<T, Error> {
        if filters.is_empty() {
            self.get(path).await
        } else {
            self.get_with_params(path, &to_query_params(filters)).await
        }
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn put_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = body.get(..body.len().min(200)).unwrap_or(&body);
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.error_message)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client(url: &str, port: u16) -> GrocyClient {
        GrocyClient::from_reqwest(url, port, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn applies_port_to_bare_host() {
        let c = client("https://grocy.local", 9192);
        assert_eq!(c.base_url().as_str(), "https://grocy.local:9192/");
        assert_eq!(c.api_url().as_str(), "https://grocy.local:9192/api/");
    }

    #[test]
    fn keeps_sub_path() {
        let c = client("http://hass.local/grocy/", 8123);
        assert_eq!(c.api_url().as_str(), "http://hass.local:8123/grocy/api/");

        let c = client("http://hass.local/apps/grocy", 80);
        // Default port is elided by the url crate.
        assert_eq!(c.api_url().as_str(), "http://hass.local/apps/grocy/api/");
    }

    #[test]
    fn rejects_urls_without_host() {
        assert!(GrocyClient::from_reqwest("grocy.local", 80, reqwest::Client::new()).is_err());
        assert!(GrocyClient::from_reqwest("mailto:x@y", 80, reqwest::Client::new()).is_err());
    }

    #[test]
    fn debug_hides_key() {
        let c = GrocyClient::new(
            "http://grocy.local",
            80,
            &SecretString::from("super-secret".to_owned()),
            &TransportConfig::default(),
        )
        .unwrap();
        assert!(!format!("{c:?}").contains("super-secret"));
    }
}
