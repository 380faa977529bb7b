use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{coord::Coordinate, model::DailySeries};

use super::{ForecastSource, truncate_body};

const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min";

/// Daily forecast source backed by the Open-Meteo API.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    base_url: String,
    http: Client,
    timezone: Tz,
    forecast_days: u8,
}

impl OpenMeteoForecast {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        timezone: Tz,
        forecast_days: u8,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build forecast HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            timezone,
            forecast_days,
        })
    }
}

#[derive(Serialize)]
struct Query<'a> {
    latitude: f64,
    longitude: f64,
    daily: &'a str,
    timezone: &'a str,
    forecast_days: u8,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    #[serde(alias = "weather_code")]
    weathercode: Vec<i32>,
    temperature_2m_min: Vec<f64>,
    temperature_2m_max: Vec<f64>,
}

#[async_trait]
impl ForecastSource for OpenMeteoForecast {
    async fn daily(&self, at: Coordinate) -> Result<DailySeries> {
        let url = format!("{}/v1/forecast", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&Query {
                latitude: at.latitude(),
                longitude: at.longitude(),
                daily: DAILY_FIELDS,
                timezone: self.timezone.name(),
                forecast_days: self.forecast_days,
            })
            .send()
            .await
            .context("Failed to send request to Open-Meteo (daily forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        tracing::debug!(%at, days = parsed.daily.time.len(), "daily forecast received");

        Ok(DailySeries {
            dates: parsed.daily.time,
            weather_codes: parsed.daily.weathercode,
            temps_min: parsed.daily.temperature_2m_min,
            temps_max: parsed.daily.temperature_2m_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> OpenMeteoForecast {
        OpenMeteoForecast::new(
            &server.uri(),
            "mapcast-test",
            Duration::from_secs(5),
            chrono_tz::Asia::Tokyo,
            3,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn parses_daily_series() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "35"))
            .and(query_param("longitude", "139"))
            .and(query_param("daily", DAILY_FIELDS))
            .and(query_param("timezone", "Asia/Tokyo"))
            .and(query_param("forecast_days", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 35.0,
                "longitude": 139.0,
                "daily_units": { "temperature_2m_max": "°C" },
                "daily": {
                    "time": ["2025-11-03", "2025-11-04", "2025-11-05"],
                    "weathercode": [0, 61, 95],
                    "temperature_2m_max": [18.2, 15.0, 12.4],
                    "temperature_2m_min": [9.04, 7.5, -3.46]
                }
            })))
            .mount(&server)
            .await;

        let at = Coordinate::from_map(35.0, 139.0).unwrap();
        let series = source(&server).daily(at).await.unwrap();

        assert_eq!(series.dates, ["2025-11-03", "2025-11-04", "2025-11-05"]);
        assert_eq!(series.weather_codes, [0, 61, 95]);
        assert_eq!(series.temps_min, [9.04, 7.5, -3.46]);
        assert_eq!(series.temps_max, [18.2, 15.0, 12.4]);
    }

    #[tokio::test]
    async fn accepts_new_weather_code_field_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": {
                    "time": ["2025-11-03"],
                    "weather_code": [3],
                    "temperature_2m_max": [10.0],
                    "temperature_2m_min": [1.0]
                }
            })))
            .mount(&server)
            .await;

        let at = Coordinate::from_map(35.0, 139.0).unwrap();
        let series = source(&server).daily(at).await.unwrap();

        assert_eq!(series.weather_codes, [3]);
    }

    #[tokio::test]
    async fn missing_daily_block_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "latitude": 35.0 })),
            )
            .mount(&server)
            .await;

        let at = Coordinate::from_map(35.0, 139.0).unwrap();
        let err = source(&server).daily(at).await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse Open-Meteo forecast JSON"));
    }

    #[tokio::test]
    async fn api_error_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°."
            })))
            .mount(&server)
            .await;

        let at = Coordinate::from_map(35.0, 139.0).unwrap();
        let err = source(&server).daily(at).await.unwrap_err();

        assert!(err.to_string().contains("400"));
    }
}
