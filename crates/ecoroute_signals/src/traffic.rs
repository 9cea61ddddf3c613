use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use ecoroute_core::{environment::TrafficCondition, geopoint::GeoPoint};

use crate::reading::{FallbackReason, SignalReading};

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: status {0}")]
    Api(u16),

    #[error("response carried no flow segment data")]
    IncompleteResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowResponse {
    flow_segment_data: Option<FlowSegmentData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowSegmentData {
    current_speed: f64,
    free_flow_speed: f64,
}

pub struct FlowClientParams {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Live traffic-flow lookup (TomTom-style flow segment endpoint).
/// Optional: most deployments run without credentials and rely on the
/// lower tiers.
pub struct LiveFlowClient {
    params: FlowClientParams,
    client: reqwest::Client,
}

impl LiveFlowClient {
    pub fn new(params: FlowClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("TRAFFIC_API_URL").ok()?;
        let api_key = std::env::var("TRAFFIC_API_KEY").ok()?;

        Some(Self::new(FlowClientParams {
            base_url,
            api_key,
            timeout: Duration::from_secs(2),
        }))
    }

    async fn fetch(&self, location: &GeoPoint) -> Result<TrafficCondition, TrafficError> {
        let response = self
            .client
            .get(&self.params.base_url)
            .timeout(self.params.timeout)
            .query(&[
                ("key", self.params.api_key.clone()),
                ("point", format!("{},{}", location.lat(), location.lon())),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TrafficError::Api(response.status().as_u16()));
        }

        let flow: FlowResponse = response.json().await?;
        let segment = flow
            .flow_segment_data
            .ok_or(TrafficError::IncompleteResponse)?;

        Ok(condition_from_flow(
            segment.current_speed,
            segment.free_flow_speed,
        ))
    }
}

fn condition_from_flow(current_speed: f64, free_flow_speed: f64) -> TrafficCondition {
    if free_flow_speed <= 0.0 {
        return TrafficCondition::Normal;
    }

    let ratio = current_speed / free_flow_speed;
    if ratio < 0.5 {
        TrafficCondition::Heavy
    } else if ratio < 0.75 {
        TrafficCondition::Moderate
    } else {
        TrafficCondition::Normal
    }
}

/// Infer congestion from the routing provider's own duration/distance
/// pair: if the provider says the trip is slow for its length, it knows
/// about traffic. Degenerate input resolves to normal rather than
/// dividing by zero.
pub fn infer_from_speed(duration_s: f64, distance_km: f64) -> TrafficCondition {
    if distance_km <= 0.0 || duration_s <= 0.0 {
        return TrafficCondition::Normal;
    }

    let avg_speed_kmh = distance_km / (duration_s / 3600.0);
    if avg_speed_kmh < 20.0 {
        TrafficCondition::Heavy
    } else if avg_speed_kmh < 40.0 {
        TrafficCondition::Moderate
    } else {
        TrafficCondition::Normal
    }
}

/// Static time-of-day table: peak commute hours assume heavy traffic,
/// shoulder hours moderate.
pub fn time_of_day_estimate(hour: i8) -> TrafficCondition {
    match hour {
        8 | 9 | 17 | 18 => TrafficCondition::Heavy,
        7 | 10 | 16 | 19 => TrafficCondition::Moderate,
        _ => TrafficCondition::Normal,
    }
}

/// Three-tier traffic resolution, first success wins: live flow provider,
/// inference from provider duration vs distance, static time-of-day
/// table.
pub struct TrafficResolver {
    live: Option<LiveFlowClient>,
}

impl TrafficResolver {
    pub fn new(live: Option<LiveFlowClient>) -> Self {
        TrafficResolver { live }
    }

    pub fn from_env() -> Self {
        TrafficResolver::new(LiveFlowClient::from_env())
    }

    /// `speed_inputs` is the provider-estimated (duration seconds,
    /// distance km) pair; without it the resolver falls through to the
    /// time-of-day table.
    pub async fn resolve(
        &self,
        location: &GeoPoint,
        speed_inputs: Option<(f64, f64)>,
    ) -> SignalReading<TrafficCondition> {
        if let Some(live) = &self.live {
            match live.fetch(location).await {
                Ok(condition) => return SignalReading::live(condition),
                Err(err) => {
                    debug!(error = %err, "live traffic lookup failed, falling through");
                }
            }
        }

        if let Some((duration_s, distance_km)) = speed_inputs {
            return SignalReading::live(infer_from_speed(duration_s, distance_km));
        }

        let hour = jiff::Zoned::now().hour();
        SignalReading::fallback(time_of_day_estimate(hour), FallbackReason::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_inference_thresholds() {
        // 10 km in 1 hour: 10 km/h
        assert_eq!(infer_from_speed(3600.0, 10.0), TrafficCondition::Heavy);
        // 30 km in 1 hour
        assert_eq!(infer_from_speed(3600.0, 30.0), TrafficCondition::Moderate);
        // 60 km in 1 hour
        assert_eq!(infer_from_speed(3600.0, 60.0), TrafficCondition::Normal);
    }

    #[test]
    fn test_degenerate_input_resolves_to_normal() {
        assert_eq!(infer_from_speed(0.0, 10.0), TrafficCondition::Normal);
        assert_eq!(infer_from_speed(3600.0, 0.0), TrafficCondition::Normal);
        assert_eq!(infer_from_speed(-5.0, -1.0), TrafficCondition::Normal);
    }

    #[test]
    fn test_time_of_day_table() {
        assert_eq!(time_of_day_estimate(8), TrafficCondition::Heavy);
        assert_eq!(time_of_day_estimate(17), TrafficCondition::Heavy);
        assert_eq!(time_of_day_estimate(7), TrafficCondition::Moderate);
        assert_eq!(time_of_day_estimate(19), TrafficCondition::Moderate);
        assert_eq!(time_of_day_estimate(3), TrafficCondition::Normal);
        assert_eq!(time_of_day_estimate(13), TrafficCondition::Normal);
    }

    #[test]
    fn test_flow_ratio_thresholds() {
        assert_eq!(condition_from_flow(20.0, 50.0), TrafficCondition::Heavy);
        assert_eq!(condition_from_flow(30.0, 50.0), TrafficCondition::Moderate);
        assert_eq!(condition_from_flow(48.0, 50.0), TrafficCondition::Normal);
        // Broken free-flow reference must not divide by zero
        assert_eq!(condition_from_flow(30.0, 0.0), TrafficCondition::Normal);
    }

    #[tokio::test]
    async fn test_resolver_without_live_tier_uses_inference() {
        let resolver = TrafficResolver::new(None);
        let point = GeoPoint::new(4.35, 50.85);

        let reading = resolver.resolve(&point, Some((3600.0, 15.0))).await;
        assert!(!reading.is_fallback());
        assert_eq!(reading.value, TrafficCondition::Heavy);
    }

    #[tokio::test]
    async fn test_resolver_without_inputs_uses_table() {
        let resolver = TrafficResolver::new(None);
        let point = GeoPoint::new(4.35, 50.85);

        let reading = resolver.resolve(&point, None).await;
        assert!(reading.is_fallback());
    }
}
