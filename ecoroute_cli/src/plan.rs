use clap::Args;
use tracing::info;

use ecoroute_core::geopoint::GeoPoint;

use crate::{parsers::parse_geopoint, setup::build_planner};

#[derive(Args)]
pub struct PlanArgs {
    /// Origin as LAT,LON
    #[arg(short, long, value_parser = parse_geopoint)]
    pub origin: GeoPoint,

    /// Destination as LAT,LON
    #[arg(short, long, value_parser = parse_geopoint)]
    pub dest: GeoPoint,

    /// Emit the ranked alternatives as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: PlanArgs) -> Result<(), anyhow::Error> {
    let planner = build_planner();
    let ranked = planner.plan(args.origin, args.dest).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    for route in &ranked {
        info!(
            "{} — {}: {:.1} km, {:.0} min, {:.2} L fuel, {:.3} kg CO2, score {:.2} (confidence {:.0}%)",
            route.role,
            route.candidate.label,
            route.metrics.distance_km,
            route.metrics.estimated_time_min,
            route.metrics.fuel_liters,
            route.metrics.co2_kg,
            route.metrics.total_cost_score,
            route.metrics.confidence_score * 100.0,
        );
        info!(
            "    breakdown: distance {:.3} L, elevation {:.3} L, traffic x{:.2}, weather x{:.2} | {} traffic, {}",
            route.metrics.breakdown.distance_cost,
            route.metrics.breakdown.elevation_cost,
            route.metrics.breakdown.traffic_multiplier,
            route.metrics.breakdown.weather_multiplier,
            route.snapshot.traffic,
            route.snapshot.weather.summary(),
        );
    }

    Ok(())
}
