use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use ecoroute_core::{candidate::RouteCandidate, geopoint::GeoPoint};

#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OSRM rejected the request: {0}")]
    Api(String),
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
pub struct OsrmRoute {
    /// Total distance in meters
    pub distance: f64,

    /// Travel time in seconds
    pub duration: f64,

    #[serde(default)]
    pub weight_name: String,

    pub geometry: OsrmGeometry,
}

#[derive(Deserialize)]
pub struct OsrmGeometry {
    /// GeoJSON (longitude, latitude) pairs
    pub coordinates: Vec<[f64; 2]>,
}

impl OsrmRoute {
    pub fn into_candidate(self, index: usize) -> RouteCandidate {
        let label = if self.weight_name.is_empty() {
            format!("route-{index}")
        } else {
            self.weight_name
        };

        RouteCandidate {
            index,
            label,
            distance_m: self.distance,
            duration_s: self.duration,
            geometry: self
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| GeoPoint::new(lon, lat))
                .collect(),
        }
    }
}

pub struct OsrmRouteClientParams {
    pub osrm_url: String,
    pub timeout: Duration,
}

impl Default for OsrmRouteClientParams {
    fn default() -> Self {
        Self {
            osrm_url: "https://router.project-osrm.org".to_owned(),
            timeout: Duration::from_secs(5),
        }
    }
}

pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/driving/";

pub struct OsrmRouteClient {
    params: OsrmRouteClientParams,
    client: reqwest::Client,
}

impl OsrmRouteClient {
    pub fn new(params: OsrmRouteClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch driving routes through the given waypoints. With
    /// `alternatives` the provider may return several candidates; an empty
    /// list is a valid response meaning "no route found".
    pub async fn fetch_routes(
        &self,
        waypoints: &[GeoPoint],
        alternatives: bool,
    ) -> Result<Vec<OsrmRoute>, OsrmError> {
        let mut url = self.params.osrm_url.clone();
        url.push_str(OSRM_ROUTE_API_PATH);

        for (i, point) in waypoints.iter().enumerate() {
            url.push_str(&format!("{},{}", point.lon(), point.lat()));
            if i < waypoints.len() - 1 {
                url.push(';');
            }
        }

        let response = self
            .client
            .get(url)
            .timeout(self.params.timeout)
            .query(&[
                ("alternatives", if alternatives { "true" } else { "false" }),
                ("steps", "false"),
                ("geometries", "geojson"),
                ("overview", "full"),
            ])
            .send()
            .await?;

        let body: RouteResponse = response.json().await?;
        if body.code != "Ok" {
            return Err(OsrmError::Api(body.code));
        }

        debug!(routes = body.routes.len(), "fetched route candidates");
        Ok(body.routes)
    }
}
