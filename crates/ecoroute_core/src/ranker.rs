use std::fmt::Display;

use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    candidate::RouteCandidate, cost::CostMetrics, environment::EnvironmentSnapshot,
    signature::GeometrySignature,
};

/// Functional role a candidate plays within a ranked batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRole {
    MostEfficient,
    Fastest,
    Balanced,
    /// The efficiency and time minimizers share one geometry; a genuine
    /// single-answer case, not an error.
    FastestMostEfficient,
    Unassigned,
}

impl Display for RouteRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RouteRole::MostEfficient => "Most Efficient",
                RouteRole::Fastest => "Fastest Route",
                RouteRole::Balanced => "Balanced Option",
                RouteRole::FastestMostEfficient => "Fastest & Most Efficient",
                RouteRole::Unassigned => "Unassigned",
            }
        )
    }
}

/// A route candidate together with its current cost evaluation and the
/// environment it was evaluated under. Metrics are replaced wholesale by
/// the decision engine as conditions change; the role is assigned only at
/// ranking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate: RouteCandidate,
    pub metrics: CostMetrics,
    pub snapshot: EnvironmentSnapshot,
    pub role: RouteRole,
}

impl RankedCandidate {
    pub fn new(
        candidate: RouteCandidate,
        metrics: CostMetrics,
        snapshot: EnvironmentSnapshot,
    ) -> Self {
        RankedCandidate {
            candidate,
            metrics,
            snapshot,
            role: RouteRole::Unassigned,
        }
    }

    pub fn signature(&self) -> Option<GeometrySignature> {
        GeometrySignature::of(&self.candidate.geometry)
    }
}

/// Index of the candidate minimizing `key`, first occurrence winning ties.
fn index_of_min<F>(candidates: &[RankedCandidate], key: F) -> usize
where
    F: Fn(&CostMetrics) -> f64,
{
    let mut best = 0;
    for (index, candidate) in candidates.iter().enumerate().skip(1) {
        if key(&candidate.metrics) < key(&candidates[best].metrics) {
            best = index;
        }
    }
    best
}

/// Deduplicate a scored batch by geometry signature and assign the
/// canonical roles. Returns 1 to 3 candidates, never duplicated by
/// signature:
///
/// - most efficient: minimum CO2 among survivors
/// - fastest: minimum estimated time among survivors
/// - balanced: minimum total cost score among the rest, omitted when no
///   distinct candidate remains
///
/// When the efficiency and time minimizers share a signature they collapse
/// into a single combined-role result and no balanced slot is produced.
pub fn rank_candidates(candidates: Vec<RankedCandidate>) -> Vec<RankedCandidate> {
    let mut seen: FxHashSet<GeometrySignature> = FxHashSet::default();
    let mut survivors: Vec<RankedCandidate> = Vec::new();

    for candidate in candidates {
        // Candidates without geometry cannot be identified or displayed
        let Some(signature) = candidate.signature() else {
            continue;
        };
        if seen.insert(signature) {
            survivors.push(candidate);
        }
    }

    if survivors.is_empty() {
        return Vec::new();
    }

    let efficient_index = index_of_min(&survivors, |m| m.co2_kg);
    let fastest_index = index_of_min(&survivors, |m| m.estimated_time_min);

    let mut result = Vec::new();

    if survivors[efficient_index].signature() == survivors[fastest_index].signature() {
        let mut combined = survivors.swap_remove(efficient_index);
        combined.role = RouteRole::FastestMostEfficient;
        result.push(combined);
        return result;
    }

    let excluded = [
        survivors[efficient_index].signature(),
        survivors[fastest_index].signature(),
    ];

    let mut efficient = survivors[efficient_index].clone();
    efficient.role = RouteRole::MostEfficient;
    result.push(efficient);

    let mut fastest = survivors[fastest_index].clone();
    fastest.role = RouteRole::Fastest;
    result.push(fastest);

    let remaining: Vec<RankedCandidate> = survivors
        .into_iter()
        .filter(|c| !excluded.contains(&c.signature()))
        .collect();

    if !remaining.is_empty() {
        let balanced_index = index_of_min(&remaining, |m| m.total_cost_score);
        let mut balanced = remaining[balanced_index].clone();
        balanced.role = RouteRole::Balanced;
        result.push(balanced);
    }

    result
}
