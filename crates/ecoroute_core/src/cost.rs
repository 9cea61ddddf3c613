use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::environment::{TrafficCondition, WeatherReport};

/// Tuning constants of the cost model. Passed in at construction so that
/// concurrent simulations can run with different tunings.
///
/// The time blend weight and the confidence penalties are policy
/// heuristics, not derived physical constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTuning {
    /// Liters of fuel per flat kilometer
    pub base_fuel_per_km: f64,

    /// Liters of fuel per 100 m of climb
    pub elevation_factor: f64,

    pub co2_per_liter: f64,
    pub fuel_price_per_liter: f64,

    /// Monetary value of one hour of travel time
    pub value_of_time_per_hour: f64,

    /// Weight of the time cost in the blended total score
    pub time_blend_weight: f64,

    /// Confidence multiplier applied when the weather reading is a fallback
    pub weather_fallback_penalty: f64,

    /// Confidence multiplier applied under heavy traffic
    pub heavy_traffic_penalty: f64,
}

impl Default for CostTuning {
    fn default() -> Self {
        Self {
            base_fuel_per_km: 0.08,
            elevation_factor: 0.15,
            co2_per_liter: 2.31,
            fuel_price_per_liter: 100.0,
            value_of_time_per_hour: 500.0,
            time_blend_weight: 0.5,
            weather_fallback_penalty: 0.8,
            heavy_traffic_penalty: 0.9,
        }
    }
}

/// The intermediate terms of a cost evaluation, retained for
/// explainability. A required output, not a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub distance_cost: f64,
    pub elevation_cost: f64,
    pub traffic_multiplier: f64,
    pub weather_multiplier: f64,
}

impl CostBreakdown {
    pub fn as_map(&self) -> FxHashMap<&'static str, f64> {
        let mut map = FxHashMap::default();
        map.insert("distance_cost", self.distance_cost);
        map.insert("elevation_cost", self.elevation_cost);
        map.insert("traffic_multiplier", self.traffic_multiplier);
        map.insert("weather_multiplier", self.weather_multiplier);
        map
    }
}

/// Derived cost figures for one candidate under one environment snapshot.
/// Never mutated; recomputed as a new instance whenever the snapshot
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMetrics {
    pub fuel_liters: f64,
    pub co2_kg: f64,
    pub monetary_cost: f64,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub estimated_time_min: f64,

    /// The ranking key, lower is better
    pub total_cost_score: f64,

    /// Heuristic trust in this estimate, in [0, 1]
    pub confidence_score: f64,

    pub breakdown: CostBreakdown,
}

/// Pure, deterministic evaluation of (distance, duration, ascent, traffic,
/// weather) into comparable cost metrics.
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    tuning: CostTuning,
}

impl CostModel {
    pub fn new(tuning: CostTuning) -> Self {
        CostModel { tuning }
    }

    pub fn tuning(&self) -> &CostTuning {
        &self.tuning
    }

    pub fn evaluate(
        &self,
        distance_km: f64,
        duration_min: f64,
        ascent_m: f64,
        traffic: TrafficCondition,
        weather: &WeatherReport,
    ) -> CostMetrics {
        let distance_cost = distance_km * self.tuning.base_fuel_per_km;
        let elevation_cost = (ascent_m / 100.0) * self.tuning.elevation_factor;

        let traffic_multiplier = traffic.fuel_multiplier();

        let mut weather_multiplier = 1.0;
        if weather.precipitation_mm > 0.0 {
            weather_multiplier += 0.10;
        }
        if weather.wind_speed_kmh > 25.0 {
            weather_multiplier += 0.05;
        }

        let fuel_liters =
            (distance_cost + elevation_cost) * traffic_multiplier * weather_multiplier;
        let co2_kg = fuel_liters * self.tuning.co2_per_liter;
        let monetary_cost = fuel_liters * self.tuning.fuel_price_per_liter;

        let time_cost = (duration_min / 60.0) * self.tuning.value_of_time_per_hour;
        let total_cost_score = monetary_cost + self.tuning.time_blend_weight * time_cost;

        let mut confidence_score = 1.0;
        if weather.is_fallback {
            confidence_score *= self.tuning.weather_fallback_penalty;
        }
        if traffic == TrafficCondition::Heavy {
            confidence_score *= self.tuning.heavy_traffic_penalty;
        }

        CostMetrics {
            fuel_liters,
            co2_kg,
            monetary_cost,
            distance_km,
            elevation_gain_m: ascent_m,
            estimated_time_min: duration_min,
            total_cost_score,
            confidence_score,
            breakdown: CostBreakdown {
                distance_cost,
                elevation_cost,
                traffic_multiplier,
                weather_multiplier,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::WeatherKind;

    const TOLERANCE: f64 = 1e-9;

    fn live_weather(precipitation_mm: f64, wind_speed_kmh: f64) -> WeatherReport {
        WeatherReport {
            temperature_c: 20.0,
            kind: WeatherKind::Clear,
            wind_speed_kmh,
            precipitation_mm,
            visibility_km: 10.0,
            is_fallback: false,
        }
    }

    #[test]
    fn test_flat_route_normal_conditions() {
        let model = CostModel::default();
        let metrics = model.evaluate(
            10.0,
            15.0,
            0.0,
            TrafficCondition::Normal,
            &live_weather(0.0, 10.0),
        );

        assert!((metrics.breakdown.distance_cost - 0.8).abs() < TOLERANCE);
        assert_eq!(metrics.breakdown.elevation_cost, 0.0);
        assert_eq!(metrics.breakdown.traffic_multiplier, 1.0);
        assert_eq!(metrics.breakdown.weather_multiplier, 1.0);
        assert!((metrics.fuel_liters - 0.8).abs() < TOLERANCE);
        assert!((metrics.co2_kg - 1.848).abs() < TOLERANCE);
        assert_eq!(metrics.confidence_score, 1.0);
    }

    #[test]
    fn test_heavy_traffic_wind_and_rain() {
        let model = CostModel::default();
        let metrics = model.evaluate(
            10.0,
            15.0,
            0.0,
            TrafficCondition::Heavy,
            &live_weather(5.0, 30.0),
        );

        assert!((metrics.breakdown.weather_multiplier - 1.15).abs() < TOLERANCE);
        assert!((metrics.fuel_liters - 0.8 * 1.6 * 1.15).abs() < TOLERANCE);
        // Live reading, so only the heavy-traffic penalty applies
        assert!((metrics.confidence_score - 0.9).abs() < TOLERANCE);
    }

    #[test]
    fn test_weather_fallback_reduces_confidence() {
        let model = CostModel::default();
        let mut weather = live_weather(0.0, 5.0);

        let live = model.evaluate(12.0, 20.0, 50.0, TrafficCondition::Normal, &weather);
        weather.is_fallback = true;
        let fallback = model.evaluate(12.0, 20.0, 50.0, TrafficCondition::Normal, &weather);

        assert!((fallback.confidence_score - live.confidence_score * 0.8).abs() < TOLERANCE);
        // Fallback only affects confidence, not the physical estimate
        assert_eq!(fallback.fuel_liters, live.fuel_liters);
    }

    #[test]
    fn test_fuel_identity_holds_for_all_traffic_levels() {
        let model = CostModel::default();
        let weather = live_weather(3.0, 40.0);

        for traffic in TrafficCondition::ALL {
            let m = model.evaluate(42.0, 55.0, 320.0, traffic, &weather);
            let expected = (m.breakdown.distance_cost + m.breakdown.elevation_cost)
                * m.breakdown.traffic_multiplier
                * m.breakdown.weather_multiplier;

            assert!((m.fuel_liters - expected).abs() < TOLERANCE);
            assert!(m.total_cost_score >= 0.0);
            assert!((0.0..=1.0).contains(&m.confidence_score));
        }
    }

    #[test]
    fn test_breakdown_map_has_all_terms() {
        let model = CostModel::default();
        let metrics = model.evaluate(
            5.0,
            8.0,
            100.0,
            TrafficCondition::Moderate,
            &live_weather(0.0, 0.0),
        );

        let map = metrics.breakdown.as_map();
        assert_eq!(map.len(), 4);
        assert_eq!(map["traffic_multiplier"], 1.25);
        assert!((map["elevation_cost"] - 0.15).abs() < TOLERANCE);
    }
}
