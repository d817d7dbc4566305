//! Extraction of the nearest station's latest observation from the GML
//! weather feed.
//!
//! Station positions are given on ETRS89-LAEA (EPSG:3035) with the axes in
//! northing, easting order. Timestamps in the feed are fixed at UTC+1.

pub mod error;
mod tree;

use crate::geo::distance::nearest_by;
use crate::geo::projection::project;
use crate::geo::Crs;
use crate::weather::error::GmlError;
use crate::weather::tree::{Element, GML_NS, OMSO_NS, SWE_NS};
use chrono::{DateTime, Local, TimeZone};
use log::debug;
use serde::Serialize;
use std::fmt::Display;

pub const WEATHER_URL: &str =
    "https://data.public.lu/fr/datasets/r/93c90cb8-4994-4be7-bcaa-cabe0e66ad9a";

pub const FIELD_DATE: &str = "Date";
pub const FIELD_HOUR: &str = "Hour";
pub const FIELD_TEMPERATURE: &str = "Average Air Temperature 200cm above ground";
pub const FIELD_HUMIDITY: &str = "Relative Air Humidity 200cm above ground";
pub const FIELD_TEMPERATURE_MAX: &str = "Maximum Air Temperature 200cm above ground";
pub const FIELD_TEMPERATURE_MIN: &str = "Minimum Air Temperature 200cm above ground";
pub const FIELD_PRECIPITATION: &str = "Precipitation (incl. snow and hail)";

const UNKNOWN: &str = "Unknown";
const FEED_UTC_OFFSET: &str = "+0100";

/// A station position as found in a `gml:pos` element.
#[derive(Debug, Clone, PartialEq)]
pub struct StationPoint {
    pub x: f64,
    pub y: f64,
    pub alt: Option<f64>,
    /// The trimmed position text, used to find the feature owning this point.
    pub raw: String,
}

impl StationPoint {
    /// Parses `"<northing> <easting> [<altitude>]"`.
    ///
    /// The first token becomes `y` and the second `x`.
    ///
    /// ```
    /// use lu_environment::weather::StationPoint;
    ///
    /// let point = StationPoint::parse("10 20 30").unwrap();
    /// assert_eq!((point.x, point.y, point.alt), (20.0, 10.0, Some(30.0)));
    /// ```
    pub fn parse(text: &str) -> Result<Self, GmlError> {
        let raw = text.trim();
        let number = |token: &str| {
            token
                .parse::<f64>()
                .map_err(|_| GmlError::Coordinate(raw.to_string()))
        };
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(GmlError::Coordinate(raw.to_string()));
        }
        Ok(StationPoint {
            y: number(tokens[0])?,
            x: number(tokens[1])?,
            alt: tokens.get(2).copied().map(number).transpose()?,
            raw: raw.to_string(),
        })
    }
}

/// One value of an observation row, bound to its declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservationField {
    pub name: String,
    pub code: String,
    pub value: String,
}

/// Value of the first field called exactly `name`.
pub fn value_by_name<'a>(fields: &'a [ObservationField], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.value.as_str())
}

/// Converts a feed timestamp (`dd.mm.yyyy`, `HH:MM`, UTC+1) into `tz`,
/// returning the date and time parts in the same formats.
pub fn convert_to_local<Tz>(date: &str, time: &str, tz: &Tz) -> Result<(String, String), GmlError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let value = format!("{date} {time} {FEED_UTC_OFFSET}");
    let parsed = DateTime::parse_from_str(&value, "%d.%m.%Y %H:%M %z")
        .map_err(|source| GmlError::Timestamp { value, source })?;
    let local = parsed.with_timezone(tz);
    Ok((
        local.format("%d.%m.%Y").to_string(),
        local.format("%H:%M").to_string(),
    ))
}

/// Latest observation of the station nearest to the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherObservation {
    pub station_x: f64,
    pub station_y: f64,
    pub station_alt: Option<f64>,
    pub station_lon: f64,
    pub station_lat: f64,
    pub date: String,
    pub time: String,
    pub temp: Option<String>,
    pub hum: Option<String>,
    pub t_max: Option<String>,
    pub t_min: Option<String>,
    pub precipitation: Option<String>,
}

/// Extracts the observation of the station nearest to `(x, y)` (EPSG:3035),
/// with the timestamp converted to the system's local time zone.
pub fn extract_weather(xml: &str, x: f64, y: f64) -> Result<WeatherObservation, GmlError> {
    extract_weather_in(xml, x, y, &Local)
}

/// Like [`extract_weather`], converting the timestamp into `tz`.
pub fn extract_weather_in<Tz>(
    xml: &str,
    x: f64,
    y: f64,
    tz: &Tz,
) -> Result<WeatherObservation, GmlError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let root = tree::parse(xml)?;

    let points = station_points(&root)?;
    let (nearest, distance) = nearest_by(&points, x, y, |p| Ok::<_, GmlError>((p.x, p.y)))?
        .ok_or(GmlError::MissingElement("gml:Point"))?;
    let station = &points[nearest];
    debug!(
        "Nearest station at {} is {:.0} m away ({} candidates)",
        station.raw,
        distance,
        points.len()
    );

    let fields = station_observation(&root, &station.raw)?;

    let (station_lon, station_lat) =
        project(station.x, station.y, Crs::Etrs89Laea, Crs::Wgs84)?;

    let date = value_by_name(&fields, FIELD_DATE).ok_or(GmlError::MissingField(FIELD_DATE))?;
    let hour = value_by_name(&fields, FIELD_HOUR).ok_or(GmlError::MissingField(FIELD_HOUR))?;
    let (date, time) = convert_to_local(date, hour, tz)?;

    let lookup = |name: &str| value_by_name(&fields, name).map(str::to_string);
    Ok(WeatherObservation {
        station_x: station.x,
        station_y: station.y,
        station_alt: station.alt,
        station_lon,
        station_lat,
        date,
        time,
        temp: lookup(FIELD_TEMPERATURE),
        hum: lookup(FIELD_HUMIDITY),
        t_max: lookup(FIELD_TEMPERATURE_MAX),
        t_min: lookup(FIELD_TEMPERATURE_MIN),
        precipitation: lookup(FIELD_PRECIPITATION),
    })
}

fn station_points(root: &Element) -> Result<Vec<StationPoint>, GmlError> {
    root.find_all(GML_NS, "Point")
        .into_iter()
        .filter_map(|point| point.child(GML_NS, "pos"))
        .map(|pos| StationPoint::parse(&pos.text))
        .collect()
}

/// Fields of the observation belonging to the feature positioned at `raw`.
///
/// When several features match, the last one that carries a readable
/// observation is used.
fn station_observation(root: &Element, raw: &str) -> Result<Vec<ObservationField>, GmlError> {
    let mut found = None;
    let mut last_error = GmlError::MissingElement("gml:featureMember");

    for feature in root.find_all(GML_NS, "featureMember") {
        let matches = feature
            .find(GML_NS, "Point")
            .and_then(|point| point.child(GML_NS, "pos"))
            .is_some_and(|pos| pos.text.trim() == raw);
        if !matches {
            continue;
        }
        match read_observation(feature) {
            Ok(fields) => found = Some(fields),
            Err(e) => last_error = e,
        }
    }

    found.ok_or(last_error)
}

fn read_observation(feature: &Element) -> Result<Vec<ObservationField>, GmlError> {
    let data_array = feature
        .find(OMSO_NS, "PointTimeSeriesObservation")
        .ok_or(GmlError::MissingElement("omso:PointTimeSeriesObservation"))?
        .find(SWE_NS, "DataArray")
        .ok_or(GmlError::MissingElement("swe:DataArray"))?;

    let declared: Vec<(String, String)> = data_array
        .find_all(SWE_NS, "field")
        .into_iter()
        .map(|field| {
            let name = field
                .child(SWE_NS, "name")
                .and_then(|n| n.attribute("name"))
                .map_or(UNKNOWN, str::trim);
            let code = field
                .find(SWE_NS, "uom")
                .and_then(|u| u.attribute("code"))
                .map_or(UNKNOWN, str::trim);
            (name.to_string(), code.to_string())
        })
        .collect();

    let values = data_array
        .find(SWE_NS, "values")
        .ok_or(GmlError::MissingElement("swe:values"))?;

    // Each line replaces the previous one; only the latest row is kept.
    let mut fields = Vec::new();
    for line in values.text.trim().split('\n') {
        fields = bind_row(&declared, line.trim());
    }
    Ok(fields)
}

fn bind_row(declared: &[(String, String)], line: &str) -> Vec<ObservationField> {
    declared
        .iter()
        .zip(line.split(';'))
        .map(|((name, code), value)| ObservationField {
            name: name.clone(),
            code: code.clone(),
            value: value.to_string(),
        })
        .collect()
}
