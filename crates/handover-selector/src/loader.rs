//! Scenario loading from JSON files

use crate::config::{Scenario, SimulationConfig, DEFAULT_TICKS};
use crate::scorer::ScorerConfig;
use crate::{HandoverError, Result};
use leo_kinematics::{Satellite, SatelliteId, User};
use nalgebra::Vector2;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

fn default_ticks() -> Option<u64> {
    Some(DEFAULT_TICKS)
}

/// Raw scenario document
#[derive(Debug, Deserialize)]
struct RawScenario {
    name: Option<String>,
    coverage_radius_km: Option<f64>,
    time_weight: Option<f64>,
    resource_weight: Option<f64>,
    dt: Option<f64>,
    /// Absent: default limit. `null`: run until cancelled.
    #[serde(default = "default_ticks")]
    ticks: Option<u64>,
    user: RawUser,
    satellites: Vec<RawSatellite>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    position: [f64; 2],
}

/// Raw satellite entry. The direction need not be unit length.
///
/// Entries without an `id` are numbered in file order, starting after the
/// largest explicit id in the file.
#[derive(Debug, Deserialize)]
struct RawSatellite {
    id: Option<u32>,
    position: [f64; 2],
    direction: [f64; 2],
    speed: f64,
    resource_availability: f64,
}

/// Load and validate a scenario from a JSON file
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    info!("Loading scenario from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: RawScenario = serde_json::from_reader(reader)?;

    let fallback_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scenario".to_string());

    build_scenario(raw, fallback_name)
}

/// Parse and validate a scenario from a JSON string
pub fn parse_scenario(json: &str) -> Result<Scenario> {
    let raw: RawScenario = serde_json::from_str(json)?;
    build_scenario(raw, "scenario".to_string())
}

fn build_scenario(raw: RawScenario, fallback_name: String) -> Result<Scenario> {
    let defaults = SimulationConfig::default();
    let config = SimulationConfig {
        coverage_radius_km: raw.coverage_radius_km.unwrap_or(defaults.coverage_radius_km),
        scorer: ScorerConfig::new(
            raw.time_weight.unwrap_or(defaults.scorer.time_weight),
            raw.resource_weight.unwrap_or(defaults.scorer.resource_weight),
        ),
        dt: raw.dt.unwrap_or(defaults.dt),
        tick_limit: raw.ticks,
        retain_history: false,
    };

    let mut next_id = raw.satellites.iter().filter_map(|s| s.id).max().unwrap_or(0);
    let satellites = raw
        .satellites
        .into_iter()
        .map(|s| {
            let id = match s.id {
                Some(id) => SatelliteId(id),
                None => {
                    next_id = next_id.checked_add(1).ok_or_else(|| {
                        HandoverError::InvalidConfig(
                            "no satellite id left for unlabelled satellite".to_string(),
                        )
                    })?;
                    SatelliteId(next_id)
                }
            };
            let heading = Vector2::new(s.direction[0], s.direction[1]);
            let norm = heading.norm();
            if norm.is_finite() && norm > 0.0 && (norm - 1.0).abs() > 1e-9 {
                warn!("{}: heading has length {:.6}, normalizing", id, norm);
            }
            Satellite::from_heading(
                id,
                Vector2::new(s.position[0], s.position[1]),
                heading,
                s.speed,
                s.resource_availability,
            )
            .map_err(HandoverError::from)
        })
        .collect::<Result<Vec<_>>>()?;

    let user = User::at(raw.user.position[0], raw.user.position[1]);
    let name = raw.name.unwrap_or(fallback_name);

    let scenario = Scenario::new(name, config, satellites, user)?;

    info!(
        "Loaded scenario '{}': {} satellites, r_cov={:.1}km, dt={}, ticks={:?}",
        scenario.name,
        scenario.satellites.len(),
        scenario.config.coverage_radius_km,
        scenario.config.dt,
        scenario.config.tick_limit
    );

    Ok(scenario)
}
