use crate::{
    Config,
    coord::Coordinate,
    model::{DailySeries, GeocodeResult},
    provider::{nominatim::NominatimGeocoder, openmeteo::OpenMeteoForecast},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod nominatim;
pub mod openmeteo;

/// Turns a point into a human-readable address.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    async fn reverse(&self, at: Coordinate) -> anyhow::Result<GeocodeResult>;
}

/// Supplies the daily forecast for a point.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn daily(&self, at: Coordinate) -> anyhow::Result<DailySeries>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Picked but not yet confirmed.
    Provisional,
    Confirmed,
}

/// Marker commands for whatever draws the map.
pub trait MapSurface: Send + Sync + Debug {
    fn place_marker(&self, at: Coordinate, style: MarkerStyle);
    fn remove_marker(&self);
}

/// Map surface that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMap;

impl MapSurface for NoMap {
    fn place_marker(&self, _at: Coordinate, _style: MarkerStyle) {}
    fn remove_marker(&self) {}
}

/// Build the HTTP-backed collaborators described by `config`.
pub fn services_from_config(
    config: &Config,
) -> anyhow::Result<(Arc<dyn ReverseGeocoder>, Arc<dyn ForecastSource>)> {
    config.validate()?;

    let geocoder = NominatimGeocoder::new(
        &config.geocoder_url,
        &config.user_agent,
        config.request_timeout(),
    )?;
    let forecast = OpenMeteoForecast::new(
        &config.forecast_url,
        &config.user_agent,
        config.request_timeout(),
        config.timezone,
        config.forecast_days,
    )?;

    Ok((Arc::new(geocoder), Arc::new(forecast)))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_from_default_config() {
        assert!(services_from_config(&Config::default()).is_ok());
    }

    #[test]
    fn services_from_config_rejects_invalid() {
        let cfg = Config {
            forecast_days: 0,
            ..Config::default()
        };
        let err = services_from_config(&cfg).err().expect("invalid config must fail");
        assert!(err.to_string().contains("forecast_days"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);

        assert_eq!(truncate_body("short"), "short");
    }
}
