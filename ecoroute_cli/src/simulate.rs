use clap::Args;
use rand::{Rng, seq::IndexedRandom};
use tracing::info;

use ecoroute_core::{
    engine::{EngineParams, EnvironmentUpdate, RerouteDecision},
    environment::{TrafficCondition, WeatherKind},
    geopoint::GeoPoint,
};

use crate::{parsers::parse_geopoint, setup::build_planner};

#[derive(Args)]
pub struct SimulateArgs {
    /// Origin as LAT,LON
    #[arg(short, long, value_parser = parse_geopoint)]
    pub origin: GeoPoint,

    /// Destination as LAT,LON
    #[arg(short, long, value_parser = parse_geopoint)]
    pub dest: GeoPoint,

    /// Simulation speed multiplier
    #[arg(long, default_value_t = 500.0)]
    pub speed: f64,

    /// Seconds between re-evaluation ticks
    #[arg(long, default_value_t = 3)]
    pub interval: u64,

    /// Minimum score improvement required to switch routes
    #[arg(long, default_value_t = 1.0)]
    pub hysteresis: f64,
}

pub async fn run(args: SimulateArgs) -> Result<(), anyhow::Error> {
    let planner = build_planner();
    let mut engine = planner
        .plan_engine(
            args.origin,
            args.dest,
            EngineParams {
                hysteresis_margin: args.hysteresis,
            },
        )
        .await?;

    for route in engine.routes() {
        info!(
            "candidate {} ({}): {:.1} km, {:.0} min, score {:.2}",
            route.candidate.index,
            route.role,
            route.metrics.distance_km,
            route.metrics.estimated_time_min,
            route.metrics.total_cost_score,
        );
    }

    let rationale = engine.explain();
    info!(
        "selected route {}: {} (savings {:.2}, confidence {}%)",
        rationale.active_index, rationale.reason, rationale.savings, rationale.confidence_pct
    );

    let mut rng = rand::rng();
    let mut progress = 0.0_f64;

    while progress < 100.0 {
        progress = (progress + 5.0 * (args.speed / 1000.0)).min(100.0);

        let mut update = EnvironmentUpdate::default();

        if rng.random_bool(0.05) {
            let mut weather = engine.active().snapshot.weather.clone();
            weather.precipitation_mm = *[0.0, 5.0, 20.0].choose(&mut rng).unwrap_or(&0.0);
            weather.wind_speed_kmh = *[5.0, 15.0, 40.0].choose(&mut rng).unwrap_or(&5.0);
            weather.kind = if weather.precipitation_mm > 0.0 {
                WeatherKind::Rain
            } else {
                WeatherKind::PartlyCloudy
            };
            info!(
                "weather change: rain {} mm, wind {} km/h",
                weather.precipitation_mm, weather.wind_speed_kmh
            );
            update.weather = Some(weather);
        }

        if rng.random_bool(0.05) {
            let indices: Vec<usize> =
                engine.routes().iter().map(|r| r.candidate.index).collect();
            if let (Some(&index), Some(&condition)) = (
                indices.choose(&mut rng),
                TrafficCondition::ALL.choose(&mut rng),
            ) {
                info!("traffic update: route {index} is now {condition}");
                update.traffic.push((index, condition));
            }
        }

        if !update.is_empty() {
            match engine.on_environment_change(update) {
                RerouteDecision::Switched {
                    from,
                    to,
                    previous_score,
                    new_score,
                } => {
                    info!(
                        "rerouting: switching from route {from} to route {to} \
                         (score {previous_score:.2} -> {new_score:.2})"
                    );
                    let rationale = engine.explain();
                    info!("reason: {}", rationale.reason);
                }
                RerouteDecision::Kept { active_score, .. } => {
                    info!("keeping active route (score {active_score:.2})");
                }
            }
        }

        info!(
            "travel {progress:.1}% | score {:.2} | {}",
            engine.active().metrics.total_cost_score,
            engine.active().snapshot.weather.summary(),
        );

        tokio::time::sleep(std::time::Duration::from_secs(args.interval)).await;
    }

    let active = engine.active();
    info!("destination reached");
    info!(
        "final route {}: {:.2} L fuel, {:.3} kg CO2, cost {:.2}",
        active.candidate.index,
        active.metrics.fuel_liters,
        active.metrics.co2_kg,
        active.metrics.monetary_cost,
    );

    Ok(())
}
