//! LEO Handover Selector
//!
//! Decides, once per simulation tick, which LEO satellite should serve a
//! user terminal. Satellites move on straight lines in the plane; each tick
//! they are advanced, measured against the user, scored, and the best
//! in-coverage satellite is selected.
//!
//! # Scoring Model (2-Factor)
//!
//! ```text
//! Score(sat) = w_T·T_avail + w_R·R
//! ```
//!
//! | Factor  | Weight | Description |
//! |---------|--------|-------------|
//! | T_avail | 0.40   | Remaining in-coverage time, linear projection (s) |
//! | R       | 0.60   | Resource availability (0-1) |
//!
//! Only satellites within the coverage radius are candidates. Exact score
//! ties go to the lowest satellite id. An empty candidate set yields no
//! selection for that tick.
//!
//! # Pipeline
//!
//! ```text
//! step(): mobility → propagation → availability + signal → scorer → selector → TickResult
//! ```

use leo_kinematics::{KinematicsError, SatelliteId};
use nalgebra::Vector2;
use serde::Serialize;
use thiserror::Error;

pub mod availability;
pub mod config;
pub mod loader;
pub mod report;
pub mod scorer;
pub mod selector;
pub mod signal;
pub mod sim;

pub use config::{Scenario, SimulationConfig};
pub use leo_kinematics::{Satellite, User};
pub use scorer::ScorerConfig;
pub use sim::{CancelHandle, RunSummary, SimState, Simulation, StopReason, UserMobility};

#[derive(Error, Debug)]
pub enum HandoverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Duplicate satellite id: {0}")]
    DuplicateSatellite(SatelliteId),
    #[error("Invalid satellite: {0}")]
    Kinematics(#[from] KinematicsError),
}

pub type Result<T> = std::result::Result<T, HandoverError>;

/// Per-satellite measurements for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteMetrics {
    pub id: SatelliteId,
    /// Post-update position (km)
    pub position: Vector2<f64>,
    /// Satellite-to-user distance (km)
    pub distance_km: f64,
    /// Velocity component toward the user (km/s, negative when receding)
    pub relative_speed: f64,
    /// Projected remaining in-coverage time (s, never negative)
    pub available_time: f64,
    /// 1/distance, or infinity when the satellite sits on the user
    pub signal_strength: f64,
    pub resource_availability: f64,
    pub score: f64,
    pub in_coverage: bool,
}

/// The satellite chosen to serve the user for a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Selection {
    pub id: SatelliteId,
    pub available_time: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandoverKind {
    /// No serving satellite before, one now
    Acquire,
    /// Serving satellite changed
    Switch,
    /// Serving satellite lost, nothing in coverage
    Release,
}

/// Change of serving satellite between consecutive ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HandoverEvent {
    pub from: Option<SatelliteId>,
    pub to: Option<SatelliteId>,
    pub kind: HandoverKind,
}

/// Everything computed for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickResult {
    /// Zero-based tick index
    pub tick: u64,
    /// Simulated time after this tick's propagation (s)
    pub elapsed: f64,
    /// One entry per satellite, ascending id
    pub metrics: Vec<SatelliteMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handover: Option<HandoverEvent>,
}

impl TickResult {
    pub fn selected_id(&self) -> Option<SatelliteId> {
        self.selection.map(|s| s.id)
    }

    pub fn metrics_for(&self, id: SatelliteId) -> Option<&SatelliteMetrics> {
        self.metrics
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &self.metrics[idx])
    }

    pub fn in_coverage_count(&self) -> usize {
        self.metrics.iter().filter(|m| m.in_coverage).count()
    }
}
