use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::format::parse_iso_date;

/// Address label used when the geocoder answers without a display name.
pub const UNKNOWN_ADDRESS: &str = "Unknown";

/// Reverse-geocoding answer for a single point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub display_name: Option<String>,
}

impl GeocodeResult {
    /// The address to show for this result, falling back to [`UNKNOWN_ADDRESS`].
    pub fn address(self) -> String {
        self.display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
    }
}

/// Raw daily forecast as delivered upstream: four index-aligned sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub dates: Vec<String>,
    pub weather_codes: Vec<i32>,
    pub temps_min: Vec<f64>,
    pub temps_max: Vec<f64>,
}

impl DailySeries {
    /// Zip the parallel sequences into entries, keeping upstream order.
    ///
    /// Mismatched lengths or unparseable dates make the whole series invalid.
    pub fn into_entries(self) -> Result<Vec<DailyForecastEntry>> {
        let len = self.dates.len();
        if self.weather_codes.len() != len
            || self.temps_min.len() != len
            || self.temps_max.len() != len
        {
            return Err(anyhow!(
                "Daily forecast sequences differ in length: dates={}, codes={}, min={}, max={}",
                len,
                self.weather_codes.len(),
                self.temps_min.len(),
                self.temps_max.len(),
            ));
        }

        self.dates
            .into_iter()
            .zip(self.weather_codes)
            .zip(self.temps_min)
            .zip(self.temps_max)
            .map(|(((date, weather_code), temp_min_c), temp_max_c)| {
                let date = parse_iso_date(&date)
                    .with_context(|| format!("Invalid forecast date '{date}'"))?;
                Ok(DailyForecastEntry {
                    date,
                    weather_code,
                    temp_min_c,
                    temp_max_c,
                })
            })
            .collect()
    }
}

/// One forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize) -> DailySeries {
        DailySeries {
            dates: ["2025-11-03", "2025-11-01", "2025-11-01"][..n]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            weather_codes: [0, 61, 95][..n].to_vec(),
            temps_min: [-3.46, 4.0, 9.04][..n].to_vec(),
            temps_max: [10.0, 12.5, 20.0][..n].to_vec(),
        }
    }

    #[test]
    fn entries_keep_upstream_order_and_duplicates() {
        let entries = series(3).into_entries().unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2025, 11, 3).unwrap());
        assert_eq!(entries[1].date, entries[2].date);
        assert_eq!(entries[2].weather_code, 95);
        assert_eq!(entries[0].temp_min_c, -3.46);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut s = series(3);
        s.temps_max.pop();

        let err = s.into_entries().unwrap_err();
        assert!(err.to_string().contains("differ in length"));
    }

    #[test]
    fn bad_date_is_rejected() {
        let mut s = series(1);
        s.dates[0] = "03/11/2025".into();

        let err = s.into_entries().unwrap_err();
        assert!(err.to_string().contains("Invalid forecast date"));
    }

    #[test]
    fn empty_series_is_fine() {
        assert!(DailySeries::default().into_entries().unwrap().is_empty());
    }

    #[test]
    fn missing_display_name_falls_back() {
        assert_eq!(GeocodeResult::default().address(), UNKNOWN_ADDRESS);
        assert_eq!(
            GeocodeResult { display_name: Some("  ".into()) }.address(),
            UNKNOWN_ADDRESS
        );
        assert_eq!(
            GeocodeResult { display_name: Some("Tokyo".into()) }.address(),
            "Tokyo"
        );
    }
}
