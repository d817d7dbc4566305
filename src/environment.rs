//! Air quality and weather at a fixed home location.
//!
//! The pollutant grids are keyed on LUREF and the weather stations on
//! ETRS89-LAEA, so the home position is projected into both systems before
//! matching.

use crate::air_quality::{nearest_reading, AirQualityReading, GridResponse, Pollutant};
use crate::error::EnvironmentError;
use crate::fetch::error::FetchError;
use crate::fetch::{HeaderProfile, HttpFetcher};
use crate::geo::distance::haversine_km;
use crate::geo::error::ProjectionError;
use crate::geo::projection::project_location;
use crate::geo::{Crs, LatLon};
use crate::weather::{extract_weather, WeatherObservation, WEATHER_URL};
use bon::bon;
use log::{error, info};
use serde::Serialize;

/// Default home location used when none is configured.
pub const DEFAULT_HOME: LatLon = LatLon(49.6602, 5.9173);

/// The home location expressed in the two projected systems the data uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HomeCoordinates {
    pub luref_x: f64,
    pub luref_y: f64,
    pub etrs89_x: f64,
    pub etrs89_y: f64,
}

/// Everything [`EnvironmentClient::report`] could find out. A source that
/// failed is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentReport {
    pub latitude: f64,
    pub longitude: f64,
    pub coordinates: HomeCoordinates,
    pub o3: Option<AirQualityReading>,
    pub no2: Option<AirQualityReading>,
    pub weather: Option<WeatherObservation>,
    /// Great-circle distance from home to the weather station.
    pub station_distance_km: Option<f64>,
}

/// Client for the open-data air quality grids and weather feed.
///
/// # Examples
///
/// ```no_run
/// # use lu_environment::{EnvironmentClient, LatLon};
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = EnvironmentClient::builder()
///     .home(LatLon(49.6116, 6.1319))
///     .build()?;
/// let report = client.report().await?;
/// println!("{:?}", report.o3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EnvironmentClient {
    fetcher: HttpFetcher,
    home: LatLon,
    o3_url: String,
    no2_url: String,
    weather_url: String,
}

#[bon]
impl EnvironmentClient {
    #[builder]
    pub fn new(
        home: Option<LatLon>,
        #[builder(into)] o3_url: Option<String>,
        #[builder(into)] no2_url: Option<String>,
        #[builder(into)] weather_url: Option<String>,
        fetcher: Option<HttpFetcher>,
    ) -> Result<Self, FetchError> {
        let fetcher = match fetcher {
            Some(fetcher) => fetcher,
            None => HttpFetcher::new(HeaderProfile::OpenData)?,
        };
        Ok(Self {
            fetcher,
            home: home.unwrap_or(DEFAULT_HOME),
            o3_url: o3_url.unwrap_or_else(|| Pollutant::O3.default_url().to_string()),
            no2_url: no2_url.unwrap_or_else(|| Pollutant::No2.default_url().to_string()),
            weather_url: weather_url.unwrap_or_else(|| WEATHER_URL.to_string()),
        })
    }

    pub fn home(&self) -> LatLon {
        self.home
    }

    pub fn home_coordinates(&self) -> Result<HomeCoordinates, ProjectionError> {
        let (luref_x, luref_y) = project_location(self.home, Crs::Luref)?;
        let (etrs89_x, etrs89_y) = project_location(self.home, Crs::Etrs89Laea)?;
        Ok(HomeCoordinates {
            luref_x,
            luref_y,
            etrs89_x,
            etrs89_y,
        })
    }

    fn url_for(&self, pollutant: Pollutant) -> &str {
        match pollutant {
            Pollutant::O3 => &self.o3_url,
            Pollutant::No2 => &self.no2_url,
        }
    }

    /// Nearest grid reading of `pollutant`, or `None` if the grid is empty.
    pub async fn air_quality(
        &self,
        pollutant: Pollutant,
    ) -> Result<Option<AirQualityReading>, EnvironmentError> {
        let (x, y) = project_location(self.home, Crs::Luref)?;
        self.air_quality_at(pollutant, x, y).await
    }

    async fn air_quality_at(
        &self,
        pollutant: Pollutant,
        x: f64,
        y: f64,
    ) -> Result<Option<AirQualityReading>, EnvironmentError> {
        let response: GridResponse = self.fetcher.get_json(self.url_for(pollutant)).await?;
        Ok(nearest_reading(&response, x, y)?)
    }

    /// Latest observation of the weather station nearest to home.
    pub async fn weather(&self) -> Result<WeatherObservation, EnvironmentError> {
        let (x, y) = project_location(self.home, Crs::Etrs89Laea)?;
        self.weather_at(x, y).await
    }

    async fn weather_at(&self, x: f64, y: f64) -> Result<WeatherObservation, EnvironmentError> {
        let xml = self.fetcher.get_text(&self.weather_url).await?;
        Ok(extract_weather(&xml, x, y)?)
    }

    /// Queries all sources concurrently.
    ///
    /// Sources are independent: a failing one is logged and left out of the
    /// report. Only projecting the home location itself can fail the call.
    pub async fn report(&self) -> Result<EnvironmentReport, ProjectionError> {
        let coordinates = self.home_coordinates()?;
        info!(
            "Home at {:.2}, {:.2}: LUREF ({:.0}, {:.0}), ETRS89 ({:.0}, {:.0})",
            self.home.latitude(),
            self.home.longitude(),
            coordinates.luref_x,
            coordinates.luref_y,
            coordinates.etrs89_x,
            coordinates.etrs89_y,
        );

        let (o3, no2, weather) = tokio::join!(
            self.air_quality_at(Pollutant::O3, coordinates.luref_x, coordinates.luref_y),
            self.air_quality_at(Pollutant::No2, coordinates.luref_x, coordinates.luref_y),
            self.weather_at(coordinates.etrs89_x, coordinates.etrs89_y),
        );

        let o3 = log_failure("O3", o3).flatten();
        let no2 = log_failure("NO2", no2).flatten();
        let weather = log_failure("weather", weather);
        let station_distance_km = weather.as_ref().map(|w| {
            haversine_km(self.home, LatLon(w.station_lat, w.station_lon))
        });

        Ok(EnvironmentReport {
            latitude: self.home.latitude(),
            longitude: self.home.longitude(),
            coordinates,
            o3,
            no2,
            weather,
            station_distance_km,
        })
    }
}

fn log_failure<T>(source: &str, result: Result<T, EnvironmentError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Failed to get {} data ({} error): {}", source, e.kind(), e);
            None
        }
    }
}
