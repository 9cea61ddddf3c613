use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cost::CostModel,
    environment::{TrafficCondition, WeatherReport},
    ranker::RankedCandidate,
};

#[derive(Debug, Clone)]
pub struct EngineParams {
    /// Minimum score improvement an alternative must show before a switch
    /// is performed. Suppresses oscillation on noisy re-evaluations.
    pub hysteresis_margin: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            hysteresis_margin: 1.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot monitor an empty candidate batch")]
    EmptyBatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Steady travel, no reconsideration pending
    Active,
    /// Metrics for the active route and all alternates are being recomputed
    Evaluating,
}

/// A change in the environment feeding one or more candidates. Weather
/// applies to every candidate; traffic readings are per candidate index.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentUpdate {
    pub weather: Option<WeatherReport>,
    pub traffic: Vec<(usize, TrafficCondition)>,
}

impl EnvironmentUpdate {
    pub fn weather(weather: WeatherReport) -> Self {
        EnvironmentUpdate {
            weather: Some(weather),
            traffic: Vec::new(),
        }
    }

    pub fn traffic(index: usize, condition: TrafficCondition) -> Self {
        EnvironmentUpdate {
            weather: None,
            traffic: vec![(index, condition)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weather.is_none() && self.traffic.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RerouteDecision {
    Kept {
        active_index: usize,
        active_score: f64,
    },
    Switched {
        from: usize,
        to: usize,
        previous_score: f64,
        new_score: f64,
    },
}

/// Human-readable account of why the active route is the active route.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionRationale {
    pub active_index: usize,
    pub reason: String,
    pub factors: Vec<&'static str>,

    /// Score advantage over the next-best alternative
    pub savings: f64,

    pub confidence_pct: u8,
}

/// Owns the active-route state and decides, under the hysteresis rule,
/// whether a newly favorable alternative justifies switching.
///
/// Single writer: re-evaluation recomputes every candidate into a scratch
/// batch and publishes it with one assignment, so a reader never observes
/// a half-updated batch.
pub struct DecisionEngine {
    params: EngineParams,
    model: CostModel,
    routes: Vec<RankedCandidate>,
    active: usize,
    state: EngineState,
}

impl DecisionEngine {
    /// Starts monitoring a ranked batch. The initially active route is the
    /// one with the lowest total cost score.
    pub fn new(
        model: CostModel,
        params: EngineParams,
        routes: Vec<RankedCandidate>,
    ) -> Result<Self, EngineError> {
        if routes.is_empty() {
            return Err(EngineError::EmptyBatch);
        }

        let mut active = 0;
        for (position, route) in routes.iter().enumerate().skip(1) {
            if route.metrics.total_cost_score < routes[active].metrics.total_cost_score {
                active = position;
            }
        }

        Ok(DecisionEngine {
            params,
            model,
            routes,
            active,
            state: EngineState::Active,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn active(&self) -> &RankedCandidate {
        &self.routes[self.active]
    }

    pub fn routes(&self) -> &[RankedCandidate] {
        &self.routes
    }

    fn alternates(&self) -> impl Iterator<Item = (usize, &RankedCandidate)> {
        self.routes
            .iter()
            .enumerate()
            .filter(move |(position, _)| *position != self.active)
    }

    /// One re-evaluation pass: apply the update, recompute metrics for the
    /// active route and every alternate, then either keep the active route
    /// or switch to the best qualifying alternative. The recomputed batch
    /// and the (possibly new) active route are committed together.
    pub fn on_environment_change(&mut self, update: EnvironmentUpdate) -> RerouteDecision {
        self.state = EngineState::Evaluating;

        let mut scratch = self.routes.clone();
        for route in scratch.iter_mut() {
            if let Some(weather) = &update.weather {
                route.snapshot.weather = weather.clone();
            }
            if let Some(&(_, condition)) = update
                .traffic
                .iter()
                .find(|(index, _)| *index == route.candidate.index)
            {
                route.snapshot.traffic = condition;
            }

            route.metrics = self.model.evaluate(
                route.candidate.distance_km(),
                route.candidate.duration_min(),
                route.snapshot.elevation.ascent_m,
                route.snapshot.traffic,
                &route.snapshot.weather,
            );
        }

        let active_score = scratch[self.active].metrics.total_cost_score;

        // Best alternate, ties broken by lowest candidate index
        let mut best: Option<usize> = None;
        for (position, route) in scratch.iter().enumerate() {
            if position == self.active {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => {
                    let current_metrics = &scratch[current];
                    route.metrics.total_cost_score
                        < current_metrics.metrics.total_cost_score
                        || (route.metrics.total_cost_score
                            == current_metrics.metrics.total_cost_score
                            && route.candidate.index < current_metrics.candidate.index)
                }
            };
            if better {
                best = Some(position);
            }
        }

        let decision = match best {
            // Strict inequality: an alternate exactly at the margin does
            // not trigger a switch
            Some(position)
                if scratch[position].metrics.total_cost_score
                    < active_score - self.params.hysteresis_margin =>
            {
                let from = self.routes[self.active].candidate.index;
                let to = scratch[position].candidate.index;
                let new_score = scratch[position].metrics.total_cost_score;

                info!(
                    from,
                    to, previous_score = active_score, new_score, "switching active route"
                );

                self.active = position;
                RerouteDecision::Switched {
                    from,
                    to,
                    previous_score: active_score,
                    new_score,
                }
            }
            _ => {
                debug!(
                    active = self.routes[self.active].candidate.index,
                    score = active_score,
                    "keeping active route"
                );
                RerouteDecision::Kept {
                    active_index: self.routes[self.active].candidate.index,
                    active_score,
                }
            }
        };

        // Single publish point for the recomputed batch
        self.routes = scratch;
        self.state = EngineState::Active;

        decision
    }

    /// Explains the current selection: the dominant advantageous factors
    /// and the numeric savings versus the next-best alternative.
    pub fn explain(&self) -> SelectionRationale {
        let active = self.active();
        let active_score = active.metrics.total_cost_score;

        let savings = self
            .alternates()
            .map(|(_, route)| route.metrics.total_cost_score)
            .fold(None, |best: Option<f64>, score| {
                Some(best.map_or(score, |b| b.min(score)))
            })
            .map(|next_best| next_best - active_score)
            .unwrap_or(0.0);

        let mut factors = Vec::new();
        if active.metrics.breakdown.traffic_multiplier == 1.0 {
            factors.push("optimal traffic flow");
        }
        if active.metrics.elevation_gain_m < 100.0 {
            factors.push("flat terrain");
        }

        let reason = if factors.is_empty() {
            "balanced profile resulting in lowest combined cost".to_owned()
        } else {
            format!("{} resulting in lowest combined cost", factors.join(", "))
        };

        SelectionRationale {
            active_index: active.candidate.index,
            reason,
            factors,
            savings,
            confidence_pct: (active.metrics.confidence_score * 100.0).round() as u8,
        }
    }
}
