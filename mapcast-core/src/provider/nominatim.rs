use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{coord::Coordinate, model::GeocodeResult};

use super::{ReverseGeocoder, truncate_body};

/// Reverse geocoder backed by Nominatim (OpenStreetMap).
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build geocoding HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, at: Coordinate) -> Result<GeocodeResult> {
        let url = format!("{}/reverse", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", at.latitude().to_string()),
                ("lon", at.longitude().to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .context("Failed to send reverse geocoding request")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read reverse geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Reverse geocoding failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: NominatimReverse =
            serde_json::from_str(&body).context("Failed to parse reverse geocoding JSON")?;

        tracing::debug!(%at, display_name = ?parsed.display_name, "reverse geocoded");

        Ok(GeocodeResult {
            display_name: parsed.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(server: &MockServer) -> NominatimGeocoder {
        NominatimGeocoder::new(&server.uri(), "mapcast-test", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_display_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "35"))
            .and(query_param("lon", "139"))
            .and(query_param("format", "json"))
            .and(header("User-Agent", "mapcast-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "place_id": 1,
                "display_name": "Tokyo, Japan"
            })))
            .mount(&server)
            .await;

        let at = Coordinate::from_map(35.0, 139.0).unwrap();
        let result = geocoder(&server).reverse(at).await.unwrap();

        assert_eq!(result.display_name.as_deref(), Some("Tokyo, Japan"));
    }

    #[tokio::test]
    async fn missing_display_name_is_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "error": "Unable to geocode" })),
            )
            .mount(&server)
            .await;

        let at = Coordinate::from_map(0.0, -160.0).unwrap();
        let result = geocoder(&server).reverse(at).await.unwrap();

        assert_eq!(result.display_name, None);
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let at = Coordinate::from_map(35.0, 139.0).unwrap();
        let err = geocoder(&server).reverse(at).await.unwrap_err();

        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn malformed_body_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let at = Coordinate::from_map(35.0, 139.0).unwrap();
        let err = geocoder(&server).reverse(at).await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse reverse geocoding JSON"));
    }
}
