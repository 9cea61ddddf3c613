use serde::{Deserialize, Serialize};

/// Why an adapter substituted a default for a live reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Network error or timeout
    Unreachable,
    /// Non-success HTTP status
    BadStatus,
    /// Response arrived but could not be interpreted
    MalformedResponse,
    /// Not enough input to measure (e.g. a geometry of one point)
    InsufficientSamples,
    /// The provider tier is not configured for this deployment
    NotConfigured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Live,
    Fallback(FallbackReason),
}

/// A measurement with its provenance. Adapters never fail upward; an
/// unreachable source yields a conservative default carrying the reason,
/// so "is this a fallback?" is an inspectable field rather than inferred
/// control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReading<T> {
    pub value: T,
    pub source: SignalSource,
}

impl<T> SignalReading<T> {
    pub fn live(value: T) -> Self {
        SignalReading {
            value,
            source: SignalSource::Live,
        }
    }

    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        SignalReading {
            value,
            source: SignalSource::Fallback(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, SignalSource::Fallback(_))
    }
}
