//! Hydrometric data services.
//!
//! [`HydrometricService`] is the seam a [`crate::GaugeLocation`] fetches
//! through. Two HTTP clients are provided behind the `api` feature: the
//! USGS NWIS instantaneous-values service and the California CDEC CSV
//! servlet. Response parsing is always compiled so it can be exercised
//! without a network.
//!
//! Clients never retry and never cache.

use crate::{
    error::{HyError, Result},
    series::TimeSeries,
};
use chrono::{DateTime, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::future::Future;

#[cfg(feature = "api")]
use chrono::{Local, TimeDelta};
#[cfg(feature = "api")]
use log::{debug, info};
#[cfg(feature = "api")]
use reqwest::Client;

/// Date format used for CDEC CSV responses: "YYYYMMDD HHMM"
pub const CDEC_DATE_FORMAT: &str = "%Y%m%d %H%M";

/// Date format used for CDEC API query parameters: "YYYY-MM-DD"
pub const CDEC_QUERY_FORMAT: &str = "%Y-%m-%d";

/// Date format used for NWIS `startDT`/`endDT` query parameters (UTC).
pub const NWIS_QUERY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// NWIS parameter code for discharge, cubic feet per second.
pub const NWIS_DISCHARGE: &str = "00060";

/// Placeholder NWIS uses for missing values.
const NWIS_NO_DATA: f64 = -999999.0;

/// A source of observed time series keyed by station id.
///
/// `start` and `end` are optional; leaving both out means the service's
/// own default range.
pub trait HydrometricService {
    fn fetch(
        &self,
        station_id: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> impl Future<Output = Result<TimeSeries>>;
}

#[derive(Debug, Deserialize)]
struct NwisResponse {
    value: NwisValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwisValue {
    time_series: Vec<NwisTimeSeries>,
}

#[derive(Debug, Deserialize)]
struct NwisTimeSeries {
    values: Vec<NwisValues>,
}

#[derive(Debug, Deserialize)]
struct NwisValues {
    value: Vec<NwisPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwisPoint {
    value: String,
    date_time: String,
}

/// Parse an NWIS instantaneous-values JSON body.
///
/// Timestamps carry a UTC offset and are normalized to naive UTC.
/// An empty `timeSeries` list means the service has no such station; a
/// series without values is an empty result.
pub fn parse_nwis_response(station_id: &str, body: &str) -> Result<TimeSeries> {
    let response: NwisResponse = serde_json::from_str(body)?;
    if response.value.time_series.is_empty() {
        return Err(HyError::UnknownStation(station_id.to_string()));
    }
    let mut samples = Vec::new();
    for ts in &response.value.time_series {
        for block in &ts.values {
            for point in &block.value {
                let time = DateTime::parse_from_rfc3339(&point.date_time)
                    .map_err(|e| {
                        HyError::Service(format!("bad timestamp {}: {}", point.date_time, e))
                    })?
                    .naive_utc();
                match point.value.trim().parse::<f64>() {
                    Ok(v) if v != NWIS_NO_DATA => samples.push((time, v)),
                    _ => continue,
                }
            }
        }
    }
    if samples.is_empty() {
        return Err(HyError::EmptyResult(station_id.to_string()));
    }
    Ok(TimeSeries::from_samples(samples))
}

/// Parse a CDEC CSV servlet body.
///
/// Columns: `STATION_ID,DURATION,SENSOR_NUMBER,SENSOR_TYPE,DATE TIME,OBS DATE,VALUE,DATA_FLAG,UNITS`.
/// Rows whose value is not numeric (`---`, `ART`, `BRT`) are dropped.
pub fn parse_cdec_response(station_id: &str, body: &str) -> Result<TimeSeries> {
    if body.trim().len() <= 2 {
        return Err(HyError::EmptyResult(station_id.to_string()));
    }
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut samples = Vec::new();
    for row in rdr.records() {
        let record = row?;
        let (Some(date), Some(value)) = (record.get(4), record.get(6)) else {
            continue;
        };
        let time = NaiveDateTime::parse_from_str(date.trim(), CDEC_DATE_FORMAT)
            .map_err(|e| HyError::Service(format!("bad timestamp {}: {}", date, e)))?;
        if let Ok(v) = value.trim().parse::<f64>() {
            samples.push((time, v));
        }
    }
    if samples.is_empty() {
        return Err(HyError::EmptyResult(station_id.to_string()));
    }
    Ok(TimeSeries::from_samples(samples))
}

/// CDEC reporting interval (`dur_code`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CdecDuration {
    Event,
    Hourly,
    Daily,
    Monthly,
}

impl CdecDuration {
    pub fn code(&self) -> &'static str {
        match self {
            CdecDuration::Event => "E",
            CdecDuration::Hourly => "H",
            CdecDuration::Daily => "D",
            CdecDuration::Monthly => "M",
        }
    }
}

/// Client for the USGS NWIS instantaneous-values service.
#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct NwisClient {
    client: Client,
    base_url: String,
    parameter_code: String,
}

#[cfg(feature = "api")]
impl NwisClient {
    pub const DEFAULT_URL: &'static str = "https://waterservices.usgs.gov/nwis/iv/";

    pub fn new(client: Client) -> Self {
        NwisClient {
            client,
            base_url: Self::DEFAULT_URL.to_string(),
            parameter_code: NWIS_DISCHARGE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_parameter_code(mut self, parameter_code: impl Into<String>) -> Self {
        self.parameter_code = parameter_code.into();
        self
    }

    fn url(
        &self,
        station_id: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> String {
        let mut url = format!(
            "{}?format=json&sites={}&parameterCd={}",
            self.base_url, station_id, self.parameter_code
        );
        if let Some(start) = start {
            url.push_str(&format!("&startDT={}", start.format(NWIS_QUERY_FORMAT)));
        }
        if let Some(end) = end {
            url.push_str(&format!("&endDT={}", end.format(NWIS_QUERY_FORMAT)));
        }
        url
    }
}

#[cfg(feature = "api")]
impl HydrometricService for NwisClient {
    async fn fetch(
        &self,
        station_id: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<TimeSeries> {
        let url = self.url(station_id, start, end);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(HyError::Service(format!(
                "NWIS returned {} for station {}: {}",
                status,
                station_id,
                body.trim()
            )));
        }
        let series = parse_nwis_response(station_id, &body)?;
        info!("{} observations for NWIS station {}", series.len(), station_id);
        Ok(series)
    }
}

/// Client for the CDEC CSV data servlet.
#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct CdecClient {
    client: Client,
    sensor: u32,
    duration: CdecDuration,
}

#[cfg(feature = "api")]
impl CdecClient {
    /// Sensor 20: river discharge, cubic feet per second.
    pub const DEFAULT_SENSOR: u32 = 20;

    /// Days fetched when no bounds are supplied.
    pub const DEFAULT_DAYS: i64 = 7;

    pub fn new(client: Client) -> Self {
        CdecClient {
            client,
            sensor: Self::DEFAULT_SENSOR,
            duration: CdecDuration::Hourly,
        }
    }

    pub fn with_sensor(mut self, sensor: u32) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_duration(mut self, duration: CdecDuration) -> Self {
        self.duration = duration;
        self
    }

    fn url(
        &self,
        station_id: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> String {
        let end = end.unwrap_or_else(|| Local::now().naive_local());
        let start = start.unwrap_or(end - TimeDelta::days(Self::DEFAULT_DAYS));
        format!(
            "http://cdec.water.ca.gov/dynamicapp/req/CSVDataServlet?Stations={}&SensorNums={}&dur_code={}&Start={}&End={}",
            station_id,
            self.sensor,
            self.duration.code(),
            start.format(CDEC_QUERY_FORMAT),
            end.format(CDEC_QUERY_FORMAT)
        )
    }
}

#[cfg(feature = "api")]
impl HydrometricService for CdecClient {
    async fn fetch(
        &self,
        station_id: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<TimeSeries> {
        let url = self.url(station_id, start, end);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HyError::Service(format!(
                "CDEC returned {} for station {}",
                status, station_id
            )));
        }
        let body = response.text().await?;
        let series = parse_cdec_response(station_id, &body)?;
        info!("{} observations for CDEC station {}", series.len(), station_id);
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // https://cdec.water.ca.gov/dynamicapp/req/CSVDataServlet?Stations=VIL&SensorNums=15&dur_code=D&Start=2022-02-15&End=2022-02-20
    const CDEC_BODY: &str = r#"STATION_ID,DURATION,SENSOR_NUMBER,SENSOR_TYPE,DATE TIME,OBS DATE,VALUE,DATA_FLAG,UNITS
VIL,D,15,STORAGE,20220215 0000,20220215 0000,9593, ,AF
VIL,D,15,STORAGE,20220216 0000,20220216 0000,9589, ,AF
VIL,D,15,STORAGE,20220217 0000,20220217 0000,---, ,AF
VIL,D,15,STORAGE,20220218 0000,20220218 0000,ART, ,AF
VIL,D,15,STORAGE,20220219 0000,20220219 0000,9585, ,AF
"#;

    const NWIS_BODY: &str = r#"{"value": {"timeSeries": [{
        "sourceInfo": {"siteCode": [{"value": "02146211"}]},
        "values": [{"value": [
            {"value": "14.2", "qualifiers": ["P"], "dateTime": "2024-01-01T00:15:00.000-05:00"},
            {"value": "-999999", "qualifiers": ["P"], "dateTime": "2024-01-01T00:30:00.000-05:00"},
            {"value": "13.9", "qualifiers": ["P"], "dateTime": "2024-01-01T00:00:00.000-05:00"}
        ]}]
    }]}}"#;

    #[test]
    fn test_parse_cdec_drops_non_numeric() {
        let series = parse_cdec_response("VIL", CDEC_BODY).unwrap();
        assert_eq!(series.values(), vec![9593.0, 9589.0, 9585.0]);
        let expected = NaiveDate::from_ymd_opt(2022, 2, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(series.first().unwrap().0, expected);
    }

    #[test]
    fn test_parse_cdec_empty_body() {
        let result = parse_cdec_response("VIL", "\r\n");
        assert!(matches!(result, Err(HyError::EmptyResult(s)) if s == "VIL"));
    }

    #[test]
    fn test_parse_nwis_normalizes_to_utc() {
        let series = parse_nwis_response("02146211", NWIS_BODY).unwrap();
        assert_eq!(series.values(), vec![13.9, 14.2]);
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(5, 0, 0)
            .unwrap();
        assert_eq!(series.first().unwrap().0, expected);
    }

    #[test]
    fn test_parse_nwis_unknown_station() {
        let body = r#"{"value": {"timeSeries": []}}"#;
        let result = parse_nwis_response("not-a-real-station", body);
        assert!(matches!(result, Err(HyError::UnknownStation(_))));
    }

    #[test]
    fn test_parse_nwis_no_values() {
        let body = r#"{"value": {"timeSeries": [{"values": [{"value": []}]}]}}"#;
        let result = parse_nwis_response("02146211", body);
        assert!(matches!(result, Err(HyError::EmptyResult(_))));
    }

    #[test]
    fn test_parse_nwis_malformed_json() {
        let result = parse_nwis_response("02146211", "<html>");
        assert!(matches!(result, Err(HyError::Json(_))));
    }
}
