use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Congestion level on a route, validated at the signal adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficCondition {
    Normal,
    Moderate,
    Heavy,
}

impl TrafficCondition {
    pub const ALL: [TrafficCondition; 3] = [
        TrafficCondition::Normal,
        TrafficCondition::Moderate,
        TrafficCondition::Heavy,
    ];

    /// Fuel consumption multiplier. Monotonically increasing with severity.
    pub fn fuel_multiplier(&self) -> f64 {
        match self {
            TrafficCondition::Normal => 1.0,
            TrafficCondition::Moderate => 1.25,
            TrafficCondition::Heavy => 1.6,
        }
    }
}

impl Display for TrafficCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TrafficCondition::Normal => "normal",
                TrafficCondition::Moderate => "moderate",
                TrafficCondition::Heavy => "heavy",
            }
        )
    }
}

/// Weather condition mapped from WMO weather codes at the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl WeatherKind {
    pub fn from_wmo_code(code: u16) -> Self {
        match code {
            0 => WeatherKind::Clear,
            1 => WeatherKind::MainlyClear,
            2 => WeatherKind::PartlyCloudy,
            3 => WeatherKind::Overcast,
            45 | 48 => WeatherKind::Fog,
            51..=57 => WeatherKind::Drizzle,
            61..=67 | 80..=82 => WeatherKind::Rain,
            71..=77 | 85 | 86 => WeatherKind::Snow,
            95..=99 => WeatherKind::Thunderstorm,
            _ => WeatherKind::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherKind::Clear => "Clear",
            WeatherKind::MainlyClear => "Mainly Clear",
            WeatherKind::PartlyCloudy => "Partly Cloudy",
            WeatherKind::Overcast => "Overcast",
            WeatherKind::Fog => "Foggy",
            WeatherKind::Drizzle => "Drizzle",
            WeatherKind::Rain => "Rain",
            WeatherKind::Snow => "Snow",
            WeatherKind::Thunderstorm => "Thunderstorm",
            WeatherKind::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub kind: WeatherKind,
    pub wind_speed_kmh: f64,
    pub precipitation_mm: f64,
    pub visibility_km: f64,
    pub is_fallback: bool,
}

impl WeatherReport {
    pub fn summary(&self) -> String {
        format!("{}°C, {}", self.temperature_c, self.kind.label())
    }
}

/// Cumulative climb/drop over the sampled points of a route geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElevationProfile {
    pub ascent_m: f64,
    pub descent_m: f64,
}

impl ElevationProfile {
    /// Flat terrain, the conservative assumption when sampling fails.
    pub fn flat() -> Self {
        ElevationProfile::default()
    }
}

/// The full environment picture for one candidate. All three sub-records
/// are always present; unreachable sources resolve to flagged fallbacks,
/// never to a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub weather: WeatherReport,
    pub traffic: TrafficCondition,
    pub elevation: ElevationProfile,
}
