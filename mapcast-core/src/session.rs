//! The interaction state machine.
//!
//! A [`Session`] reacts to three events (pick a point, confirm it, fetch its
//! forecast) and keeps everything the shell needs to render in one
//! [`Snapshot`]. State lives behind a lock that is never held across an
//! `.await`, so a new pick is accepted while a request is in flight; the late
//! response is then dropped because its pick generation no longer matches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use serde::Serialize;

use crate::{
    Config,
    coord::{Coordinate, CoordinateError},
    format::{format_fetched_at, format_forecast_line},
    gate::{Clock, RateGate, SystemClock},
    model::DailySeries,
    provider::{
        ForecastSource, MapSurface, MarkerStyle, NoMap, ReverseGeocoder, services_from_config,
    },
    selection::Selection,
    status::Status,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    PointSelected,
    LocationConfirmed,
    ForecastReady,
}

/// What happened to a guarded action that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request ran and its result was folded into the session.
    Applied,
    /// Cooldown still active; nothing changed and no request went out.
    Throttled,
    /// The point was re-picked while the request was in flight; result dropped.
    Superseded,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidPoint(#[from] CoordinateError),
    #[error("No point has been selected on the map")]
    NoSelection,
    #[error("The location has not been confirmed yet")]
    NotConfirmed,
    #[error("Reverse geocoding failed: {0:#}")]
    Geocode(anyhow::Error),
    #[error("Forecast fetch failed: {0:#}")]
    ForecastFetch(anyhow::Error),
}

impl SessionError {
    pub fn status(&self) -> Status {
        match self {
            SessionError::InvalidPoint(_) => Status::InvalidPoint,
            SessionError::NoSelection => Status::NoSelection,
            SessionError::NotConfirmed => Status::NotConfirmed,
            SessionError::Geocode(_) => Status::GeocodeFailed,
            SessionError::ForecastFetch(_) => Status::ForecastFailed,
        }
    }
}

/// Everything the shell renders, copied out of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub status: Status,
    pub selection: Selection,
    pub forecast: Vec<String>,
    pub fetched_at: Option<String>,
}

#[derive(Debug)]
struct SessionState {
    selection: Selection,
    phase: Phase,
    status: Status,
    confirm_gate: RateGate,
    fetch_gate: RateGate,
    forecast: Vec<String>,
    fetched_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            selection: Selection::default(),
            phase: Phase::Idle,
            status: Status::AwaitingPick,
            confirm_gate: RateGate::default(),
            fetch_gate: RateGate::default(),
            forecast: Vec::new(),
            fetched_at: None,
        }
    }

    fn clear_forecast(&mut self) {
        self.forecast.clear();
        self.fetched_at = None;
    }
}

#[derive(Debug)]
pub struct Session {
    geocoder: Arc<dyn ReverseGeocoder>,
    forecast: Arc<dyn ForecastSource>,
    map: Arc<dyn MapSurface>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>, forecast: Arc<dyn ForecastSource>) -> Self {
        Self {
            geocoder,
            forecast,
            map: Arc::new(NoMap),
            clock: Arc::new(SystemClock),
            timezone: chrono_tz::Asia::Tokyo,
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Session wired to the HTTP services named in `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (geocoder, forecast) = services_from_config(config)?;
        Ok(Self::new(geocoder, forecast).with_timezone(config.timezone))
    }

    pub fn with_map(mut self, map: Arc<dyn MapSurface>) -> Self {
        self.map = map;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Handle a map click. Always accepted; resets confirmation and any forecast.
    ///
    /// A non-finite click only sets [`Status::InvalidPoint`]; the selection is kept.
    pub fn select_point(&self, latitude: f64, longitude: f64) -> Result<Coordinate, SessionError> {
        let coordinate = match Coordinate::from_map(latitude, longitude) {
            Ok(coordinate) => coordinate,
            Err(err) => {
                tracing::warn!("rejected map click: {err}");
                self.state.lock().status = Status::InvalidPoint;
                return Err(err.into());
            }
        };

        {
            let mut state = self.state.lock();
            state.selection.pick(coordinate);
            state.phase = Phase::PointSelected;
            state.status = Status::PointSelected;
            state.clear_forecast();
        }

        self.map.remove_marker();
        self.map.place_marker(coordinate, MarkerStyle::Provisional);
        tracing::debug!(%coordinate, "point selected");

        Ok(coordinate)
    }

    /// Resolve the selected point's address and mark it confirmed.
    pub async fn confirm_location(&self) -> Result<Outcome, SessionError> {
        let now_ms = self.clock.now_ms();

        let (generation, coordinate) = {
            let mut state = self.state.lock();
            let Some(coordinate) = state.selection.coordinate() else {
                state.status = Status::NoSelection;
                return Err(SessionError::NoSelection);
            };
            if !state.confirm_gate.try_acquire(now_ms) {
                tracing::debug!(%coordinate, "confirm dropped, cooldown active");
                return Ok(Outcome::Throttled);
            }
            state.status = Status::Confirming;
            (state.selection.generation(), coordinate)
        };

        self.map.remove_marker();
        self.map.place_marker(coordinate, MarkerStyle::Confirmed);
        tracing::info!(%coordinate, "resolving address");

        let result = self.geocoder.reverse(coordinate).await;

        let mut state = self.state.lock();
        if !state.selection.is_current(generation, coordinate) {
            tracing::debug!(%coordinate, "discarding address for superseded point");
            return Ok(Outcome::Superseded);
        }

        match result {
            Ok(found) => {
                let address = found.address();
                tracing::info!(%coordinate, %address, "location confirmed");
                state.selection.confirm(address);
                state.phase = Phase::LocationConfirmed;
                state.status = Status::LocationConfirmed;
                state.clear_forecast();
                Ok(Outcome::Applied)
            }
            Err(err) => {
                tracing::warn!(%coordinate, "reverse geocoding failed: {err:#}");
                // A previous successful confirmation of this point stays in place.
                state.status = Status::GeocodeFailed;
                Err(SessionError::Geocode(err))
            }
        }
    }

    /// Fetch and format the daily forecast for the confirmed point.
    pub async fn fetch_forecast(&self) -> Result<Outcome, SessionError> {
        let now_ms = self.clock.now_ms();

        let (generation, coordinate) = {
            let mut state = self.state.lock();
            let coordinate = match state.selection.coordinate() {
                Some(c) if state.selection.is_confirmed() => c,
                _ => {
                    state.status = Status::NotConfirmed;
                    return Err(SessionError::NotConfirmed);
                }
            };
            if !state.fetch_gate.try_acquire(now_ms) {
                tracing::debug!(%coordinate, "fetch dropped, cooldown active");
                return Ok(Outcome::Throttled);
            }
            state.status = Status::Fetching;
            (state.selection.generation(), coordinate)
        };

        tracing::info!(%coordinate, "fetching forecast");

        let result = self
            .forecast
            .daily(coordinate)
            .await
            .and_then(DailySeries::into_entries);
        let fetched_at = self.clock.now();

        let mut state = self.state.lock();
        if !state.selection.is_current(generation, coordinate) {
            tracing::debug!(%coordinate, "discarding forecast for superseded point");
            return Ok(Outcome::Superseded);
        }

        match result {
            Ok(days) => {
                tracing::info!(%coordinate, days = days.len(), "forecast ready");
                state.forecast = days.iter().map(format_forecast_line).collect();
                state.fetched_at = Some(fetched_at);
                state.phase = Phase::ForecastReady;
                state.status = Status::ForecastReady;
                Ok(Outcome::Applied)
            }
            Err(err) => {
                tracing::warn!(%coordinate, "forecast fetch failed: {err:#}");
                state.clear_forecast();
                state.phase = Phase::LocationConfirmed;
                state.status = Status::ForecastFailed;
                Err(SessionError::ForecastFetch(err))
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        Snapshot {
            phase: state.phase,
            status: state.status,
            selection: state.selection.clone(),
            forecast: state.forecast.clone(),
            fetched_at: state
                .fetched_at
                .map(|at| format_fetched_at(at, self.timezone)),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }
}
