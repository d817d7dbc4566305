//! HTTP GET wrapper shared by every upstream source.
//!
//! All requests are sent with caching disabled. The pollen API additionally
//! expects the header set of its mobile app, otherwise it rejects the request.

pub mod error;

use crate::fetch::error::FetchError;
use log::{debug, warn};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

const POLLEN_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148";

/// Which default header set a [`HttpFetcher`] sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderProfile {
    /// `Cache-Control: no-cache` and `Pragma: no-cache` only.
    #[default]
    OpenData,
    /// The no-cache pair plus the browser/CORS headers the pollen API requires.
    PollenApi,
}

impl HeaderProfile {
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

        if *self == HeaderProfile::PollenApi {
            headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            headers.insert(
                HeaderName::from_static("sec-fetch-site"),
                HeaderValue::from_static("cross-site"),
            );
            headers.insert(
                header::ORIGIN,
                HeaderValue::from_static("capacitor://localhost"),
            );
            headers.insert(
                HeaderName::from_static("sec-fetch-mode"),
                HeaderValue::from_static("cors"),
            );
            headers.insert(header::USER_AGENT, HeaderValue::from_static(POLLEN_USER_AGENT));
            headers.insert(
                header::ACCEPT_LANGUAGE,
                HeaderValue::from_static("lb,en-GB;q=0.9,en;q=0.8"),
            );
            headers.insert(
                HeaderName::from_static("sec-fetch-dest"),
                HeaderValue::from_static("empty"),
            );
            headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        }
        headers
    }
}

/// A `reqwest` client with a fixed header profile.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    profile: HeaderProfile,
}

impl HttpFetcher {
    pub fn new(profile: HeaderProfile) -> Result<Self, FetchError> {
        let client = Client::builder()
            .default_headers(profile.headers())
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self { client, profile })
    }

    pub fn profile(&self) -> HeaderProfile {
        self.profile
    }

    /// GETs `url` and deserializes the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.send(url, None::<&()>).await?;
        Self::decode_json(url, response).await
    }

    /// Like [`HttpFetcher::get_json`] with URL query parameters appended.
    pub async fn get_json_with_query<T, Q>(&self, url: &str, query: &Q) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send(url, Some(query)).await?;
        Self::decode_json(url, response).await
    }

    /// GETs `url` and returns the body decoded as UTF-8, regardless of the
    /// charset the server advertises.
    ///
    /// The weather feed double-encodes the degree sign; `"Â°C"` is repaired to `"°C"`.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url, None::<&()>).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::BodyRead(url.to_string(), e))?;
        let text = String::from_utf8_lossy(&bytes).replace("Â°C", "°C");
        debug!("Fetched {} bytes of text from {}", text.len(), url);
        Ok(text)
    }

    async fn send<Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: Option<&Q>,
    ) -> Result<Response, FetchError> {
        let mut request = self.client.get(url);
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

        match response.error_for_status() {
            Ok(resp) => Ok(resp),
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url.to_string(), e)
                })
            }
        }
    }

    async fn decode_json<T: DeserializeOwned>(
        url: &str,
        response: Response,
    ) -> Result<T, FetchError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::BodyRead(url.to_string(), e))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::JsonParse {
            url: url.to_string(),
            source: e,
        })
    }
}
