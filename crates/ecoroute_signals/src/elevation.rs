use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use ecoroute_core::{environment::ElevationProfile, geopoint::GeoPoint};

use crate::reading::{FallbackReason, SignalReading};

const MAX_SAMPLES: usize = 5;

#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: status {0}")]
    Api(u16),

    #[error("response carried no elevation results")]
    EmptyResults,
}

#[derive(Serialize)]
struct LookupRequest {
    locations: Vec<LookupLocation>,
}

#[derive(Serialize)]
struct LookupLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Deserialize)]
struct LookupResult {
    elevation: f64,
}

/// Decimate a geometry to at most [`MAX_SAMPLES`] evenly spaced points,
/// always including the final point.
pub fn sample_points(geometry: &[GeoPoint]) -> Vec<GeoPoint> {
    let step = geometry.len().div_ceil(MAX_SAMPLES).max(1);
    let mut samples: Vec<GeoPoint> = geometry.iter().copied().step_by(step).collect();

    if let Some(&last_point) = geometry.last() {
        if samples.last() != Some(&last_point) {
            samples.push(last_point);
        }
    }

    samples
}

/// Cumulative ascent/descent over consecutive elevations, in path order.
pub fn accumulate_profile(elevations: &[f64]) -> ElevationProfile {
    let mut profile = ElevationProfile::flat();

    for pair in elevations.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            profile.ascent_m += delta;
        } else {
            profile.descent_m += -delta;
        }
    }

    profile
}

pub struct ElevationClientParams {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ElevationClientParams {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-elevation.com/api/v1/lookup".to_owned(),
            timeout: Duration::from_secs(3),
        }
    }
}

/// Batch elevation lookup over a sampled route geometry. A geometry too
/// short to sample, or any provider failure, resolves to flat terrain
/// rather than penalizing or rejecting the candidate.
pub struct ElevationClient {
    params: ElevationClientParams,
    client: reqwest::Client,
}

impl ElevationClient {
    pub fn new(params: ElevationClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub async fn profile(&self, geometry: &[GeoPoint]) -> SignalReading<ElevationProfile> {
        if geometry.len() < 2 {
            return SignalReading::fallback(
                ElevationProfile::flat(),
                FallbackReason::InsufficientSamples,
            );
        }

        let samples = sample_points(geometry);
        match self.fetch_elevations(&samples).await {
            Ok(elevations) => SignalReading::live(accumulate_profile(&elevations)),
            Err(err) => {
                debug!(error = %err, "elevation lookup failed, assuming flat terrain");
                let reason = match err {
                    ElevationError::Request(_) => FallbackReason::Unreachable,
                    ElevationError::Api(_) => FallbackReason::BadStatus,
                    ElevationError::EmptyResults => FallbackReason::MalformedResponse,
                };
                SignalReading::fallback(ElevationProfile::flat(), reason)
            }
        }
    }

    async fn fetch_elevations(&self, samples: &[GeoPoint]) -> Result<Vec<f64>, ElevationError> {
        let body = LookupRequest {
            locations: samples
                .iter()
                .map(|point| LookupLocation {
                    latitude: point.lat(),
                    longitude: point.lon(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.params.base_url)
            .timeout(self.params.timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ElevationError::Api(response.status().as_u16()));
        }

        let lookup: LookupResponse = response.json().await?;
        if lookup.results.is_empty() {
            return Err(ElevationError::EmptyResults);
        }

        Ok(lookup.results.into_iter().map(|r| r.elevation).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(count: usize) -> Vec<GeoPoint> {
        (0..count)
            .map(|i| GeoPoint::new(4.0 + i as f64 * 0.01, 50.0))
            .collect()
    }

    #[test]
    fn test_short_geometry_keeps_every_point() {
        let geometry = line(4);
        assert_eq!(sample_points(&geometry).len(), 4);
    }

    #[test]
    fn test_long_geometry_is_decimated_and_keeps_endpoint() {
        let geometry = line(103);
        let samples = sample_points(&geometry);

        assert!(samples.len() <= MAX_SAMPLES + 1);
        assert_eq!(samples.first(), geometry.first());
        assert_eq!(samples.last(), geometry.last());
    }

    #[test]
    fn test_profile_accumulates_in_path_order() {
        // Up 30, down 10, up 20: order matters, these must not be sorted
        let profile = accumulate_profile(&[100.0, 130.0, 120.0, 140.0]);
        assert_eq!(profile.ascent_m, 50.0);
        assert_eq!(profile.descent_m, 10.0);
    }

    #[test]
    fn test_profile_of_single_sample_is_flat() {
        let profile = accumulate_profile(&[250.0]);
        assert_eq!(profile, ElevationProfile::flat());
    }

    #[tokio::test]
    async fn test_one_point_geometry_is_flat_fallback() {
        let client = ElevationClient::new(ElevationClientParams::default());
        let reading = client.profile(&line(1)).await;

        assert!(reading.is_fallback());
        assert_eq!(reading.value, ElevationProfile::flat());
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades_to_flat() {
        let client = ElevationClient::new(ElevationClientParams {
            base_url: "http://192.0.2.1/api/v1/lookup".to_owned(),
            timeout: Duration::from_millis(50),
        });

        let reading = client.profile(&line(10)).await;
        assert!(reading.is_fallback());
        assert_eq!(reading.value, ElevationProfile::flat());
    }
}
