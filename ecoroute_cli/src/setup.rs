use ecoroute_core::cost::{CostModel, CostTuning};
use ecoroute_osrm::client::{OsrmRouteClient, OsrmRouteClientParams};
use ecoroute_planner::planner::TripPlanner;
use ecoroute_signals::{
    elevation::{ElevationClient, ElevationClientParams},
    traffic::TrafficResolver,
    weather::{WeatherClient, WeatherClientParams},
};

/// Wires a planner from environment configuration and defaults. The OSRM
/// endpoint honors ECOROUTE_OSRM_URL; the live traffic tier activates
/// itself when TRAFFIC_API_URL and TRAFFIC_API_KEY are present.
pub fn build_planner() -> TripPlanner {
    let mut osrm_params = OsrmRouteClientParams::default();
    if let Ok(url) = std::env::var("ECOROUTE_OSRM_URL") {
        osrm_params.osrm_url = url;
    }

    TripPlanner::new(
        OsrmRouteClient::new(osrm_params),
        WeatherClient::new(WeatherClientParams::default()),
        ElevationClient::new(ElevationClientParams::default()),
        TrafficResolver::from_env(),
        CostModel::new(CostTuning::default()),
    )
}
