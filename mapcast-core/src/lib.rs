//! Core library for `mapcast`.
//!
//! This crate defines:
//! - Coordinate normalization and the per-action rate gates
//! - Forecast formatting (date labels, temperatures, weather symbols)
//! - The pick → confirm → fetch session state machine
//! - Abstractions over the reverse geocoder, forecast API and map surface,
//!   with Nominatim and Open-Meteo implementations
//! - Configuration handling
//!
//! It is used by `mapcast-cli`, but any shell that can report map clicks can drive a [`Session`].

pub mod config;
pub mod coord;
pub mod format;
pub mod gate;
pub mod model;
pub mod provider;
pub mod selection;
pub mod session;
pub mod status;

pub use config::Config;
pub use coord::{Coordinate, CoordinateError, normalize_longitude};
pub use format::{WeatherSymbol, format_date_label, format_temperature, weather_symbol};
pub use gate::{Clock, MIN_INTERVAL_MS, RateGate, SystemClock};
pub use model::{DailyForecastEntry, DailySeries, GeocodeResult};
pub use provider::{ForecastSource, MapSurface, MarkerStyle, ReverseGeocoder};
pub use selection::Selection;
pub use session::{Outcome, Phase, Session, SessionError, Snapshot};
pub use status::Status;
