//! Address lookups against the geoportail.lu geocoding API.

use crate::fetch::error::FetchError;
use crate::fetch::{HeaderProfile, HttpFetcher};
use crate::geo::LatLon;
use bon::Builder;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GEOPORTAIL_URL: &str = "https://api.geoportail.lu/geocode";

/// Structured address search. Empty fields are sent as empty parameters.
///
/// ```
/// use lu_environment::geocode::AddressQuery;
///
/// let query = AddressQuery::builder().zip("8437").num("13").build();
/// assert_eq!(query.locality, "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Builder)]
#[builder(on(String, into))]
pub struct AddressQuery {
    #[builder(default)]
    pub zip: String,
    #[builder(default)]
    pub locality: String,
    #[builder(default)]
    pub country: String,
    #[builder(default)]
    pub street: String,
    #[builder(default)]
    pub num: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    geomlonlat: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    fetcher: HttpFetcher,
    base_url: String,
}

impl Geocoder {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(GEOPORTAIL_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: HttpFetcher::new(HeaderProfile::OpenData)?,
            base_url: base_url.into(),
        })
    }

    /// Coordinates of the best match for `query`, if there is one.
    pub async fn search(&self, query: &AddressQuery) -> Result<Option<LatLon>, FetchError> {
        let url = format!("{}/search", self.base_url);
        let response: SearchResponse = self.fetcher.get_json_with_query(&url, query).await?;

        let Some(first) = response.results.first() else {
            warn!("No results found for address {:?}", query);
            return Ok(None);
        };
        match first.geomlonlat.as_ref().map(|g| g.coordinates.as_slice()) {
            Some([lon, lat, ..]) => Ok(Some(LatLon(*lat, *lon))),
            _ => {
                warn!("Search result for {:?} has no 'geomlonlat' coordinates", query);
                Ok(None)
            }
        }
    }

    /// Raw reverse-geocoding response for `location`.
    pub async fn reverse(&self, location: LatLon) -> Result<Value, FetchError> {
        let url = format!("{}/reverse", self.base_url);
        self.fetcher
            .get_json_with_query(
                &url,
                &[("lat", location.latitude()), ("lon", location.longitude())],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn router() -> Router {
        Router::new()
            .route(
                "/search",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    let body = match params.get("zip").map(String::as_str) {
                        Some("8437") => json!({"results": [
                            {"geomlonlat": {"type": "Point", "coordinates": [5.9173, 49.6602]}},
                            {"geomlonlat": {"type": "Point", "coordinates": [6.0, 49.0]}}
                        ]}),
                        Some("9999") => json!({"results": [{"name": "no geometry"}]}),
                        _ => json!({"results": []}),
                    };
                    Json(body)
                }),
            )
            .route(
                "/reverse",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({"count": 1, "params": params}))
                }),
            )
    }

    #[tokio::test]
    async fn test_search_reads_lon_lat_order() -> Result<(), FetchError> {
        let base = serve(router()).await;
        let geocoder = Geocoder::with_base_url(base)?;
        let query = AddressQuery::builder().zip("8437").num("13").build();
        assert_eq!(geocoder.search(&query).await?, Some(LatLon(49.6602, 5.9173)));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_without_match() -> Result<(), FetchError> {
        let base = serve(router()).await;
        let geocoder = Geocoder::with_base_url(base)?;

        let nothing = AddressQuery::builder().zip("1234").build();
        assert_eq!(geocoder.search(&nothing).await?, None);

        let no_geometry = AddressQuery::builder().zip("9999").build();
        assert_eq!(geocoder.search(&no_geometry).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_reverse_sends_coordinates() -> Result<(), FetchError> {
        let base = serve(router()).await;
        let geocoder = Geocoder::with_base_url(base)?;
        let value = geocoder.reverse(LatLon(49.6602, 5.9173)).await?;
        assert_eq!(value["params"]["lat"], "49.6602");
        assert_eq!(value["params"]["lon"], "5.9173");
        Ok(())
    }
}
