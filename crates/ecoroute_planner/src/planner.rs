use fxhash::FxHashSet;
use thiserror::Error;
use tracing::{debug, warn};

use ecoroute_core::{
    candidate::RouteCandidate,
    cost::CostModel,
    engine::{DecisionEngine, EngineParams},
    environment::EnvironmentSnapshot,
    geopoint::GeoPoint,
    ranker::{RankedCandidate, rank_candidates},
    signature::GeometrySignature,
};
use ecoroute_osrm::client::OsrmRouteClient;
use ecoroute_signals::{
    elevation::ElevationClient, traffic::TrafficResolver, weather::WeatherClient,
};

const TARGET_UNIQUE_CANDIDATES: usize = 3;

#[derive(Debug, Error)]
pub enum PlanError {
    /// The routing collaborator answered with zero candidates. Fatal to
    /// this planning attempt, unlike a signal fallback.
    #[error("no route available between origin and destination")]
    NoRoute,
}

/// Fetches candidates, acquires the environment signals, and produces the
/// ranked alternative set. Signal failures degrade to flagged fallbacks;
/// only an empty candidate batch is an error.
pub struct TripPlanner {
    osrm: OsrmRouteClient,
    weather: WeatherClient,
    elevation: ElevationClient,
    traffic: TrafficResolver,
    model: CostModel,
}

impl TripPlanner {
    pub fn new(
        osrm: OsrmRouteClient,
        weather: WeatherClient,
        elevation: ElevationClient,
        traffic: TrafficResolver,
        model: CostModel,
    ) -> Self {
        Self {
            osrm,
            weather,
            elevation,
            traffic,
            model,
        }
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }

    /// Plan a trip: fetch and diversify candidates, enrich each with the
    /// three environment signals, evaluate costs and rank.
    pub async fn plan(
        &self,
        origin: GeoPoint,
        dest: GeoPoint,
    ) -> Result<Vec<RankedCandidate>, PlanError> {
        let candidates = self.collect_candidates(origin, dest).await?;

        let weather = self.weather.fetch(origin.lat(), origin.lon()).await;
        debug!(
            fallback = weather.is_fallback(),
            "origin weather: {}",
            weather.value.summary()
        );

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let lookup_point = *candidate.midpoint().unwrap_or(&origin);

            // Elevation and traffic are independent sources; fetch both at
            // once, each behind its own timeout
            let (elevation, traffic) = tokio::join!(
                self.elevation.profile(&candidate.geometry),
                self.traffic.resolve(
                    &lookup_point,
                    Some((candidate.duration_s, candidate.distance_km())),
                ),
            );

            let snapshot = EnvironmentSnapshot {
                weather: weather.value.clone(),
                traffic: traffic.value,
                elevation: elevation.value,
            };
            let metrics = self.model.evaluate(
                candidate.distance_km(),
                candidate.duration_min(),
                snapshot.elevation.ascent_m,
                snapshot.traffic,
                &snapshot.weather,
            );

            scored.push(RankedCandidate::new(candidate, metrics, snapshot));
        }

        Ok(rank_candidates(scored))
    }

    /// Plan and hand the batch to a decision engine for continuous
    /// re-evaluation.
    pub async fn plan_engine(
        &self,
        origin: GeoPoint,
        dest: GeoPoint,
        params: EngineParams,
    ) -> Result<DecisionEngine, PlanError> {
        let ranked = self.plan(origin, dest).await?;

        // plan() never returns an empty batch, so the engine accepts it
        DecisionEngine::new(self.model.clone(), params, ranked)
            .map_err(|_| PlanError::NoRoute)
    }

    /// Candidate collection: provider alternatives first, then via-point
    /// variants until three physically distinct options exist. A provider
    /// transport failure degrades to the straight-line heuristic; a
    /// provider that answers with zero routes is a hard "no route".
    async fn collect_candidates(
        &self,
        origin: GeoPoint,
        dest: GeoPoint,
    ) -> Result<Vec<RouteCandidate>, PlanError> {
        let mut seen: FxHashSet<GeometrySignature> = FxHashSet::default();
        let mut unique: Vec<RouteCandidate> = Vec::new();

        let mut add_if_new = |candidate: RouteCandidate,
                              unique: &mut Vec<RouteCandidate>|
         -> bool {
            match GeometrySignature::of(&candidate.geometry) {
                Some(signature) if seen.insert(signature) => {
                    unique.push(candidate);
                    true
                }
                _ => false,
            }
        };

        match self.osrm.fetch_routes(&[origin, dest], true).await {
            Ok(routes) => {
                if routes.is_empty() {
                    return Err(PlanError::NoRoute);
                }
                for route in routes {
                    let index = unique.len();
                    add_if_new(route.into_candidate(index), &mut unique);
                }
            }
            Err(err) => {
                warn!(error = %err, "routing provider unreachable, using straight-line heuristic");
                add_if_new(
                    crate::diversity::straight_line_candidate(&origin, &dest),
                    &mut unique,
                );
            }
        }

        // Force diversity through perpendicular via points
        let scale = crate::diversity::deviation_scale(&origin, &dest);
        for side in [scale, -scale] {
            if unique.len() >= TARGET_UNIQUE_CANDIDATES {
                break;
            }
            let via = crate::diversity::deviation_point(&origin, &dest, side);
            match self.osrm.fetch_routes(&[origin, via, dest], false).await {
                Ok(routes) => {
                    for route in routes {
                        let index = unique.len();
                        add_if_new(route.into_candidate(index), &mut unique);
                    }
                }
                Err(err) => {
                    debug!(error = %err, "via-point request failed, skipping variant");
                }
            }
        }

        if unique.is_empty() {
            return Err(PlanError::NoRoute);
        }

        debug!(count = unique.len(), "collected unique candidates");
        Ok(unique)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Duration;

    use ecoroute_core::ranker::RouteRole;
    use ecoroute_osrm::client::OsrmRouteClientParams;
    use ecoroute_signals::{
        elevation::ElevationClientParams, weather::WeatherClientParams,
    };

    use super::*;

    /// One-shot HTTP server answering every request on the listener with
    /// the given JSON body.
    fn serve_json(listener: TcpListener, body: &'static str, requests: usize) {
        std::thread::spawn(move || {
            for _ in 0..requests {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut buffer = [0u8; 4096];
                let _ = stream.read(&mut buffer);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
    }

    fn offline_planner(osrm_url: String) -> TripPlanner {
        // Signal endpoints on a reserved TEST-NET address: every adapter
        // degrades to its fallback quickly
        TripPlanner::new(
            OsrmRouteClient::new(OsrmRouteClientParams {
                osrm_url,
                timeout: Duration::from_millis(200),
            }),
            WeatherClient::new(WeatherClientParams {
                base_url: "http://192.0.2.1/v1/forecast".to_owned(),
                timeout: Duration::from_millis(50),
            }),
            ElevationClient::new(ElevationClientParams {
                base_url: "http://192.0.2.1/api/v1/lookup".to_owned(),
                timeout: Duration::from_millis(50),
            }),
            TrafficResolver::new(None),
            CostModel::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_a_hard_no_route() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        serve_json(listener, r#"{"code": "Ok", "routes": []}"#, 1);

        let planner = offline_planner(url);
        let result = planner
            .plan(GeoPoint::new(4.35, 50.85), GeoPoint::new(4.40, 51.22))
            .await;

        assert!(matches!(result, Err(PlanError::NoRoute)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_degrades_to_straight_line() {
        // Nothing answers: OSRM transport failure, all signals fall back
        let planner = offline_planner("http://192.0.2.1".to_owned());

        let ranked = planner
            .plan(GeoPoint::new(-74.0060, 40.7128), GeoPoint::new(-71.0589, 42.3601))
            .await
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].role, RouteRole::FastestMostEfficient);
        assert_eq!(ranked[0].candidate.label, "fallback");
        assert!(ranked[0].snapshot.weather.is_fallback);
        // Weather fallback shows up only through reduced confidence
        assert!(ranked[0].metrics.confidence_score <= 0.8);
    }
}
