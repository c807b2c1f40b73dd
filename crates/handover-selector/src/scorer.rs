//! Satellite scoring implementation
//!
//! Implements the 2-factor handover scoring model:
//! Score(sat) = w_T·T_avail + w_R·R
//!
//! Every satellite is scored so the full tick can be reported; eligibility
//! (coverage) is decided here but enforced by the selector.

use crate::availability;
use crate::signal;
use crate::{HandoverError, Result, SatelliteMetrics};
use leo_kinematics::{Satellite, User};
use serde::Serialize;
use tracing::debug;

/// Scoring weights (2-factor model, 9 decimal precision)
/// Sum = 1.000000000
pub const W_TIME: f64 = 0.400000000;
pub const W_RESOURCE: f64 = 0.600000000;

/// Scorer configuration
///
/// Weights must be finite and non-negative. They need not sum to one, but
/// scores are easier to compare across runs when they do.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorerConfig {
    /// Weight for remaining in-coverage time (T_avail)
    pub time_weight: f64,
    /// Weight for resource availability (R)
    pub resource_weight: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            time_weight: W_TIME,
            resource_weight: W_RESOURCE,
        }
    }
}

impl ScorerConfig {
    pub fn new(time_weight: f64, resource_weight: f64) -> Self {
        Self {
            time_weight,
            resource_weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("time_weight", self.time_weight),
            ("resource_weight", self.resource_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(HandoverError::InvalidConfig(format!(
                    "{} must be finite and >= 0, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }

    /// Weighted score for one satellite
    pub fn score(&self, available_time: f64, resource_availability: f64) -> f64 {
        self.time_weight * available_time + self.resource_weight * resource_availability
    }
}

/// Score all satellites against the user, ascending id order
pub fn score_satellites(
    satellites: &[Satellite],
    user: &User,
    coverage_radius_km: f64,
    config: &ScorerConfig,
) -> Vec<SatelliteMetrics> {
    let mut metrics: Vec<SatelliteMetrics> = satellites
        .iter()
        .map(|s| score_satellite(s, user, coverage_radius_km, config))
        .collect();
    metrics.sort_by_key(|m| m.id);
    metrics
}

/// Score a single satellite
pub fn score_satellite(
    satellite: &Satellite,
    user: &User,
    coverage_radius_km: f64,
    config: &ScorerConfig,
) -> SatelliteMetrics {
    let estimate = availability::estimate(satellite, user, coverage_radius_km);
    let signal_strength = signal::signal_strength(satellite, user);
    let in_coverage = estimate.distance_km <= coverage_radius_km;
    let score = config.score(estimate.available_time, satellite.resource_availability());

    debug!(
        "Scored {}: {:.3} (d={:.1}km, v_rel={:.2}, t_avail={:.2}s, res={:.2}, covered={})",
        satellite.id(),
        score,
        estimate.distance_km,
        estimate.relative_speed,
        estimate.available_time,
        satellite.resource_availability(),
        in_coverage
    );

    SatelliteMetrics {
        id: satellite.id(),
        position: satellite.position(),
        distance_km: estimate.distance_km,
        relative_speed: estimate.relative_speed,
        available_time: estimate.available_time,
        signal_strength,
        resource_availability: satellite.resource_availability(),
        score,
        in_coverage,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(5000))]

        // Fuzz: score is monotone in both factors for non-negative weights
        #[test]
        fn fuzz_score_monotone(
            w_t in 0.0f64..10.0,
            w_r in 0.0f64..10.0,
            t in 0.0f64..10_000.0,
            dt in 0.0f64..1_000.0,
            r in 0.0f64..1.0,
            dr in 0.0f64..1.0,
        ) {
            let config = ScorerConfig::new(w_t, w_r);
            let base = config.score(t, r);
            prop_assert!(config.score(t + dt, r) >= base);
            prop_assert!(config.score(t, (r + dr).min(1.0)) >= base);
        }
    }
}
