use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use ecoroute_core::environment::{WeatherKind, WeatherReport};

use crate::reading::{FallbackReason, SignalReading};

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: status {0}")]
    Api(u16),

    #[error("response is missing the current conditions block")]
    IncompleteResponse,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    precipitation: f64,
    wind_speed_10m: f64,
    weathercode: u16,
}

pub struct WeatherClientParams {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for WeatherClientParams {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_owned(),
            timeout: Duration::from_secs(3),
        }
    }
}

/// Point-forecast lookup with a single attempt. Any failure resolves to a
/// conservative default (cloudy, 15 °C, light wind) flagged as fallback;
/// no error crosses this boundary.
pub struct WeatherClient {
    params: WeatherClientParams,
    client: reqwest::Client,
}

impl WeatherClient {
    pub fn new(params: WeatherClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub async fn fetch(&self, lat: f64, lon: f64) -> SignalReading<WeatherReport> {
        match self.try_fetch(lat, lon).await {
            Ok(report) => SignalReading::live(report),
            Err(err) => {
                debug!(lat, lon, error = %err, "weather lookup failed, using fallback");
                let reason = match err {
                    WeatherError::Request(_) => FallbackReason::Unreachable,
                    WeatherError::Api(_) => FallbackReason::BadStatus,
                    WeatherError::IncompleteResponse => FallbackReason::MalformedResponse,
                };
                SignalReading::fallback(conservative_default(), reason)
            }
        }
    }

    async fn try_fetch(&self, lat: f64, lon: f64) -> Result<WeatherReport, WeatherError> {
        let response = self
            .client
            .get(&self.params.base_url)
            .timeout(self.params.timeout)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "current",
                    "temperature_2m,precipitation,wind_speed_10m,weathercode".to_owned(),
                ),
                ("timezone", "auto".to_owned()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Api(response.status().as_u16()));
        }

        let forecast: ForecastResponse = response.json().await?;
        let current = forecast.current.ok_or(WeatherError::IncompleteResponse)?;

        Ok(WeatherReport {
            temperature_c: current.temperature_2m,
            kind: WeatherKind::from_wmo_code(current.weathercode),
            wind_speed_kmh: current.wind_speed_10m,
            precipitation_mm: current.precipitation,
            visibility_km: 10.0,
            is_fallback: false,
        })
    }
}

/// Slightly adverse assumptions, safe to plan against when the live source
/// is unavailable.
pub fn conservative_default() -> WeatherReport {
    WeatherReport {
        temperature_c: 15.0,
        kind: WeatherKind::Overcast,
        wind_speed_kmh: 5.0,
        precipitation_mm: 0.0,
        visibility_km: 8.0,
        is_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conservative_default_is_flagged() {
        let report = conservative_default();
        assert!(report.is_fallback);
        assert_eq!(report.temperature_c, 15.0);
        assert_eq!(report.wind_speed_kmh, 5.0);
        assert_eq!(report.precipitation_mm, 0.0);
        assert_eq!(report.visibility_km, 8.0);
        assert_eq!(report.kind, WeatherKind::Overcast);
    }

    #[test]
    fn test_current_conditions_parsing() {
        let json = r#"{
            "current": {
                "temperature_2m": 21.4,
                "precipitation": 0.3,
                "wind_speed_10m": 12.0,
                "weathercode": 61
            }
        }"#;

        let forecast: ForecastResponse = serde_json::from_str(json).unwrap();
        let current = forecast.current.unwrap();
        assert_eq!(current.temperature_2m, 21.4);
        assert_eq!(WeatherKind::from_wmo_code(current.weathercode), WeatherKind::Rain);
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades_to_fallback() {
        let client = WeatherClient::new(WeatherClientParams {
            // Reserved TEST-NET address, nothing listens there
            base_url: "http://192.0.2.1/v1/forecast".to_owned(),
            timeout: Duration::from_millis(50),
        });

        let reading = client.fetch(50.85, 4.35).await;
        assert!(reading.is_fallback());
        assert!(reading.value.is_fallback);
    }
}
