use serde::Serialize;

/// Outcome identifier the shell turns into a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    AwaitingPick,
    PointSelected,
    Confirming,
    LocationConfirmed,
    Fetching,
    ForecastReady,
    NoSelection,
    InvalidPoint,
    NotConfirmed,
    GeocodeFailed,
    ForecastFailed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::AwaitingPick => "awaiting_pick",
            Status::PointSelected => "point_selected",
            Status::Confirming => "confirming",
            Status::LocationConfirmed => "location_confirmed",
            Status::Fetching => "fetching",
            Status::ForecastReady => "forecast_ready",
            Status::NoSelection => "no_selection",
            Status::InvalidPoint => "invalid_point",
            Status::NotConfirmed => "not_confirmed",
            Status::GeocodeFailed => "geocode_failed",
            Status::ForecastFailed => "forecast_failed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Status::AwaitingPick => "Tap the map to pick a point.",
            Status::PointSelected => "Map tapped. Press 'Set location' to confirm the point.",
            Status::Confirming => "Resolving address...",
            Status::LocationConfirmed => "Location set. Press 'Get forecast' to load the forecast.",
            Status::Fetching => "Fetching forecast...",
            Status::ForecastReady => "Forecast loaded.",
            Status::NoSelection => "Tap the map first.",
            Status::InvalidPoint => "That point is not on the map.",
            Status::NotConfirmed => "Set the location first.",
            Status::GeocodeFailed => "Failed to resolve the address.",
            Status::ForecastFailed => "Failed to fetch the forecast.",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Status::NoSelection
                | Status::InvalidPoint
                | Status::NotConfirmed
                | Status::GeocodeFailed
                | Status::ForecastFailed
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
