//! Run configuration and validated scenario

use crate::scorer::ScorerConfig;
use crate::{HandoverError, Result};
use leo_kinematics::{Satellite, User};
use serde::Serialize;
use std::collections::HashSet;

/// Default coverage radius in km (9 decimal precision)
pub const DEFAULT_COVERAGE_RADIUS_KM: f64 = 1000.000000000;

/// Default tick length in seconds (9 decimal precision)
pub const DEFAULT_DT: f64 = 1.000000000;

/// Default tick limit
pub const DEFAULT_TICKS: u64 = 100;

/// Construction-time settings for a run, immutable once the run starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub coverage_radius_km: f64,
    #[serde(flatten)]
    pub scorer: ScorerConfig,
    /// Tick length (s)
    pub dt: f64,
    /// `None` runs until cancelled
    pub tick_limit: Option<u64>,
    /// Keep every tick result on the driver
    pub retain_history: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            coverage_radius_km: DEFAULT_COVERAGE_RADIUS_KM,
            scorer: ScorerConfig::default(),
            dt: DEFAULT_DT,
            tick_limit: Some(DEFAULT_TICKS),
            retain_history: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_coverage_radius(mut self, radius_km: f64) -> Self {
        self.coverage_radius_km = radius_km;
        self
    }

    pub fn with_weights(mut self, time_weight: f64, resource_weight: f64) -> Self {
        self.scorer = ScorerConfig::new(time_weight, resource_weight);
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.tick_limit = None;
        self
    }

    pub fn with_history(mut self, retain: bool) -> Self {
        self.retain_history = retain;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.coverage_radius_km.is_finite() || self.coverage_radius_km <= 0.0 {
            return Err(HandoverError::InvalidConfig(format!(
                "coverage_radius_km must be finite and > 0, got {}",
                self.coverage_radius_km
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(HandoverError::InvalidConfig(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        self.scorer.validate()
    }
}

/// Everything a run needs: settings, satellites and the user
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub config: SimulationConfig,
    pub satellites: Vec<Satellite>,
    pub user: User,
}

impl Scenario {
    /// Build and validate a scenario. Satellites are stored in ascending id order.
    pub fn new(
        name: impl Into<String>,
        config: SimulationConfig,
        mut satellites: Vec<Satellite>,
        user: User,
    ) -> Result<Self> {
        satellites.sort_by_key(|s| s.id());
        let scenario = Self {
            name: name.into(),
            config,
            satellites,
            user,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;

        if !self.user.position.iter().all(|c| c.is_finite()) {
            return Err(HandoverError::InvalidConfig(
                "user position must be finite".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.satellites.len());
        for satellite in &self.satellites {
            if !seen.insert(satellite.id()) {
                return Err(HandoverError::DuplicateSatellite(satellite.id()));
            }
        }

        Ok(())
    }
}
