//! Serving-satellite selection with deterministic tie-break

use crate::{HandoverEvent, HandoverKind, SatelliteMetrics, Selection};
use leo_kinematics::SatelliteId;
use std::cmp::Ordering;

/// Satellites eligible to serve: those within the coverage radius
pub fn candidates(metrics: &[SatelliteMetrics]) -> impl Iterator<Item = &SatelliteMetrics> {
    metrics.iter().filter(|m| m.in_coverage)
}

/// Candidate preference: higher score first, then lower id
fn preference(a: &SatelliteMetrics, b: &SatelliteMetrics) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.id.cmp(&b.id))
}

/// Pick the highest-scoring in-coverage satellite.
///
/// Exact ties go to the lowest id. Returns `None` when nothing is in coverage.
pub fn select(metrics: &[SatelliteMetrics]) -> Option<Selection> {
    candidates(metrics)
        .min_by(|a, b| preference(a, b))
        .map(|best| Selection {
            id: best.id,
            available_time: best.available_time,
            score: best.score,
        })
}

/// In-coverage satellites in preference order (best first)
pub fn rank(metrics: &[SatelliteMetrics]) -> Vec<&SatelliteMetrics> {
    let mut ranked: Vec<&SatelliteMetrics> = candidates(metrics).collect();
    ranked.sort_by(|a, b| preference(a, b));
    ranked
}

/// Classify a change of serving satellite between consecutive ticks
pub fn handover_event(
    previous: Option<SatelliteId>,
    current: Option<SatelliteId>,
) -> Option<HandoverEvent> {
    let kind = match (previous, current) {
        (None, None) => return None,
        (Some(a), Some(b)) if a == b => return None,
        (None, Some(_)) => HandoverKind::Acquire,
        (Some(_), None) => HandoverKind::Release,
        (Some(_), Some(_)) => HandoverKind::Switch,
    };

    Some(HandoverEvent {
        from: previous,
        to: current,
        kind,
    })
}
