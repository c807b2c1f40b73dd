//! JSON run report for external consumers (renderers, dashboards)

use crate::config::SimulationConfig;
use crate::sim::RunSummary;
use crate::{Result, TickResult};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub generated_at: String,
    pub coverage_radius_km: f64,
    pub dt: f64,
    pub time_weight: f64,
    pub resource_weight: f64,
    pub satellite_count: usize,
}

/// Final run report
///
/// Non-finite signal strengths (satellite on the user) serialize as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub summary: RunSummary,
    pub ticks: Vec<TickResult>,
    pub metadata: RunMetadata,
}

impl RunReport {
    pub fn new(
        scenario: impl Into<String>,
        config: &SimulationConfig,
        satellite_count: usize,
        summary: RunSummary,
        ticks: Vec<TickResult>,
    ) -> Self {
        Self {
            scenario: scenario.into(),
            summary,
            ticks,
            metadata: RunMetadata {
                generated_at: chrono::Utc::now().to_rfc3339(),
                coverage_radius_km: config.coverage_radius_km,
                dt: config.dt,
                time_weight: config.scorer.time_weight,
                resource_weight: config.scorer.resource_weight,
                satellite_count,
            },
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Writing run report to {:?}", path);
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SatelliteMetrics, Selection};
    use leo_kinematics::SatelliteId;
    use nalgebra::Vector2;
    use tempfile::NamedTempFile;

    fn make_tick() -> TickResult {
        TickResult {
            tick: 0,
            elapsed: 1.0,
            metrics: vec![SatelliteMetrics {
                id: SatelliteId(1),
                position: Vector2::new(0.0, 0.0),
                distance_km: 0.0,
                relative_speed: 0.0,
                available_time: 0.0,
                signal_strength: f64::INFINITY,
                resource_availability: 0.5,
                score: 0.3,
                in_coverage: true,
            }],
            selection: Some(Selection {
                id: SatelliteId(1),
                available_time: 0.0,
                score: 0.3,
            }),
            handover: None,
        }
    }

    #[test]
    fn test_report_round_trips_to_json() {
        let config = SimulationConfig::default();
        let summary = RunSummary {
            ticks: 1,
            ..RunSummary::default()
        };
        let report = RunReport::new("unit", &config, 1, summary, vec![make_tick()]);

        let file = NamedTempFile::new().unwrap();
        report.write_json(file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["scenario"], "unit");
        assert_eq!(value["summary"]["ticks"], 1);
        assert_eq!(value["metadata"]["coverage_radius_km"], 1000.0);
        assert_eq!(value["ticks"][0]["selection"]["id"], 1);
        assert!(value["ticks"][0]["metrics"][0]["signal_strength"].is_null());
        assert_eq!(value["ticks"][0]["metrics"][0]["position"], serde_json::json!([0.0, 0.0]));
        assert!(value["ticks"][0].get("handover").is_none());
    }
}
