//! Display formatting for forecast days.
//!
//! Everything here is pure and locale-fixed (English weekday names, Celsius)
//! so rendered output is stable enough to assert on.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::model::DailyForecastEntry;

/// Parse an upstream `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> chrono::ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}

/// Render a date as `MM/DD (Www)`, e.g. `11/03 (Tue)`.
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%m/%d (%a)").to_string()
}

/// Render a Celsius value as a fixed-width string: sign, two-column integer,
/// one decimal, degree mark. `-3.46` becomes `"- 3.5°"`, `9.04` becomes `"  9.0°"`.
///
/// The tenths digit is rounded half away from zero on the fractional part of
/// the magnitude; a digit that rounds up to 10 carries into the integer part.
pub fn format_temperature(celsius: f64) -> String {
    if !celsius.is_finite() {
        return " --.-°".to_string();
    }

    let sign = if celsius < 0.0 { '-' } else { ' ' };
    let magnitude = celsius.abs();
    let mut whole = magnitude.trunc();
    let mut tenths = ((magnitude - whole) * 10.0).round();
    if tenths >= 10.0 {
        whole += 1.0;
        tenths = 0.0;
    }

    format!("{sign}{:>2}.{}°", whole as u64, tenths as u8)
}

/// Pictographic category for a WMO weather interpretation code.
/// See: https://open-meteo.com/en/docs#weathervariables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherSymbol {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    HeavyRain,
    FreezingRain,
    Snow,
    HeavySnow,
    SnowGrains,
    LightShowers,
    ModerateShowers,
    HeavyShowers,
    LightSnowShowers,
    HeavySnowShowers,
    Thunderstorm,
    ThunderstormLightHail,
    ThunderstormHeavyHail,
    Unknown,
}

impl WeatherSymbol {
    /// Total over `i32`: anything outside the WMO table is [`WeatherSymbol::Unknown`].
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 => Self::Rain,
            65 => Self::HeavyRain,
            66 | 67 => Self::FreezingRain,
            71 | 73 => Self::Snow,
            75 => Self::HeavySnow,
            77 => Self::SnowGrains,
            80 => Self::LightShowers,
            81 => Self::ModerateShowers,
            82 => Self::HeavyShowers,
            85 => Self::LightSnowShowers,
            86 => Self::HeavySnowShowers,
            95 => Self::Thunderstorm,
            96 => Self::ThunderstormLightHail,
            99 => Self::ThunderstormHeavyHail,
            _ => Self::Unknown,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::MainlyClear => "🌤️",
            Self::PartlyCloudy => "⛅",
            Self::Overcast => "☁️",
            Self::Fog => "🌫️",
            Self::Drizzle => "🌦️",
            // freezing drizzle and freezing rain share a glyph
            Self::FreezingDrizzle | Self::FreezingRain => "🌧️❄️",
            Self::Rain => "🌧️",
            Self::HeavyRain => "🌧️🌧️",
            Self::Snow => "🌨️",
            Self::HeavySnow => "❄️❄️",
            Self::SnowGrains => "🌨️⛄",
            Self::LightShowers => "🚿",
            Self::ModerateShowers => "🌧️🚿",
            Self::HeavyShowers => "🌧️🌧️🚿",
            Self::LightSnowShowers => "🌨️🚿",
            Self::HeavySnowShowers => "🌨️❄️❄️",
            Self::Thunderstorm => "⛈️",
            Self::ThunderstormLightHail => "⛈️🧊",
            Self::ThunderstormHeavyHail => "⛈️🧊🧊",
            Self::Unknown => "❔",
        }
    }
}

/// Glyph for a raw weather code.
pub fn weather_symbol(code: i32) -> &'static str {
    WeatherSymbol::from_wmo_code(code).glyph()
}

/// One rendered forecast row: `date  symbol  min / max`.
pub fn format_forecast_line(entry: &DailyForecastEntry) -> String {
    format!(
        "{}  {}  {} / {}",
        format_date_label(entry.date),
        weather_symbol(entry.weather_code),
        format_temperature(entry.temp_min_c),
        format_temperature(entry.temp_max_c),
    )
}

/// Human-readable fetch time in the given zone, `YYYY/MM/DD HH:MM:SS`.
pub fn format_fetched_at(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y/%m/%d %H:%M:%S").to_string()
}
