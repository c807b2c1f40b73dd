//! Simulation driver
//!
//! Owns the run context (satellites, user, tick counter) and executes one
//! tick per [`Simulation::step`]:
//!
//! 1. user mobility hook (if any)
//! 2. propagate every satellite by `dt`
//! 3. availability + signal + score for every satellite
//! 4. select the serving satellite
//! 5. attach a handover event if the serving satellite changed
//!
//! Cancellation is cooperative and only observed between ticks; a tick that
//! has started always completes.

use crate::config::{Scenario, SimulationConfig};
use crate::{scorer, selector, HandoverKind, Result, TickResult};
use leo_kinematics::{Satellite, SatelliteId, User};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// External per-tick user position update
pub trait UserMobility {
    /// Return the user for `tick`, given where it was last tick.
    fn update(&mut self, tick: u64, user: &User) -> User;
}

impl<F> UserMobility for F
where
    F: FnMut(u64, &User) -> User,
{
    fn update(&mut self, tick: u64, user: &User) -> User {
        self(tick, user)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    TickLimit,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimState {
    Running,
    Stopped(StopReason),
}

/// Cloneable stop request, safe to trigger from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Totals for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    /// Serving satellite changed from one satellite to another
    pub handovers: u64,
    pub acquisitions: u64,
    pub releases: u64,
    /// Ticks with nothing in coverage
    pub unserved_ticks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

pub struct Simulation {
    config: SimulationConfig,
    satellites: Vec<Satellite>,
    user: User,
    mobility: Option<Box<dyn UserMobility>>,
    tick: u64,
    state: SimState,
    cancel: CancelHandle,
    serving: Option<SatelliteId>,
    summary: RunSummary,
    history: Vec<TickResult>,
}

impl Simulation {
    pub fn new(scenario: Scenario) -> Result<Self> {
        scenario.validate()?;

        let Scenario {
            name,
            config,
            mut satellites,
            user,
        } = scenario;
        satellites.sort_by_key(|s| s.id());

        info!(
            "Starting '{}': {} satellites, r_cov={:.1}km, w_t={:.3}, w_r={:.3}",
            name,
            satellites.len(),
            config.coverage_radius_km,
            config.scorer.time_weight,
            config.scorer.resource_weight
        );

        let mut sim = Self {
            config,
            satellites,
            user,
            mobility: None,
            tick: 0,
            state: SimState::Running,
            cancel: CancelHandle::default(),
            serving: None,
            summary: RunSummary::default(),
            history: Vec::new(),
        };
        if config.tick_limit == Some(0) {
            sim.stop(StopReason::TickLimit);
        }
        Ok(sim)
    }

    /// Attach an external user mobility model, consulted at the start of each tick.
    pub fn with_mobility(mut self, mobility: impl UserMobility + 'static) -> Self {
        self.mobility = Some(Box::new(mobility));
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimState::Running
    }

    /// Number of ticks completed
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Satellite serving after the last completed tick
    pub fn serving(&self) -> Option<SatelliteId> {
        self.serving
    }

    /// Retained tick results; empty unless `retain_history` is set
    pub fn history(&self) -> &[TickResult] {
        &self.history
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Advance one tick. Returns `None` once the run has stopped.
    pub fn step(&mut self) -> Option<TickResult> {
        if self.state != SimState::Running {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.stop(StopReason::Cancelled);
            return None;
        }

        let tick = self.tick;

        if let Some(mobility) = self.mobility.as_mut() {
            self.user = mobility.update(tick, &self.user);
        }

        for satellite in self.satellites.iter_mut() {
            satellite.advance(self.config.dt);
        }

        let metrics = scorer::score_satellites(
            &self.satellites,
            &self.user,
            self.config.coverage_radius_km,
            &self.config.scorer,
        );
        let selection = selector::select(&metrics);
        let selected = selection.map(|s| s.id);
        let handover = selector::handover_event(self.serving, selected);

        if let Some(event) = handover {
            match event.kind {
                HandoverKind::Switch => self.summary.handovers += 1,
                HandoverKind::Acquire => self.summary.acquisitions += 1,
                HandoverKind::Release => self.summary.releases += 1,
            }
            info!(
                "Tick {}: {:?} {:?} -> {:?}",
                tick, event.kind, event.from, event.to
            );
        }
        if selection.is_none() {
            self.summary.unserved_ticks += 1;
        }

        match selection {
            Some(s) => debug!(
                "Tick {}: serving {} (score={:.3}, t_avail={:.2}s)",
                tick, s.id, s.score, s.available_time
            ),
            None => debug!("Tick {}: no satellite in coverage", tick),
        }

        let result = TickResult {
            tick,
            elapsed: (tick + 1) as f64 * self.config.dt,
            metrics,
            selection,
            handover,
        };

        self.serving = selected;
        self.tick += 1;
        self.summary.ticks = self.tick;

        if self.config.retain_history {
            self.history.push(result.clone());
        }
        if self.config.tick_limit.is_some_and(|limit| self.tick >= limit) {
            self.stop(StopReason::TickLimit);
        }

        Some(result)
    }

    /// Step until stopped, handing each result to `sink` in tick order.
    pub fn run<F>(&mut self, mut sink: F) -> RunSummary
    where
        F: FnMut(&TickResult),
    {
        while let Some(result) = self.step() {
            sink(&result);
        }
        self.summary
    }

    fn stop(&mut self, reason: StopReason) {
        self.state = SimState::Stopped(reason);
        self.summary.stop_reason = Some(reason);
        info!(
            "Simulation stopped after {} ticks ({:?}): {} handovers, {} unserved ticks",
            self.tick, reason, self.summary.handovers, self.summary.unserved_ticks
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    fn make_satellite(id: u32, x: f64, y: f64, hx: f64, hy: f64, speed: f64, res: f64) -> Satellite {
        Satellite::from_heading(
            SatelliteId(id),
            Vector2::new(x, y),
            Vector2::new(hx, hy),
            speed,
            res,
        )
        .unwrap()
    }

    fn scenario(config: SimulationConfig, satellites: Vec<Satellite>, user: User) -> Scenario {
        Scenario::new("test", config, satellites, user).unwrap()
    }

    #[test]
    fn test_tick_limit_yields_exact_count() {
        let sats = vec![make_satellite(1, 0.0, 0.0, 1.0, 0.0, 10.0, 0.5)];
        let mut sim =
            Simulation::new(scenario(SimulationConfig::default().with_ticks(5), sats, User::at(500.0, 0.0)))
                .unwrap();

        let mut ticks = Vec::new();
        let summary = sim.run(|r| ticks.push(r.tick));

        assert_eq!(ticks, vec![0, 1, 2, 3, 4]);
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.stop_reason, Some(StopReason::TickLimit));
        assert_eq!(sim.state(), SimState::Stopped(StopReason::TickLimit));
        assert!(sim.step().is_none());
    }

    #[test]
    fn test_zero_tick_limit_never_runs() {
        let mut sim = Simulation::new(scenario(
            SimulationConfig::default().with_ticks(0),
            vec![],
            User::at(0.0, 0.0),
        ))
        .unwrap();
        assert!(!sim.is_running());
        assert!(sim.step().is_none());
    }

    #[test]
    fn test_update_precedes_metrics() {
        // Starts 600 km away, closing at 100 km/s; after one 1 s tick: 500 km
        let sats = vec![make_satellite(1, -100.0, 0.0, 1.0, 0.0, 100.0, 0.5)];
        let mut sim = Simulation::new(scenario(
            SimulationConfig::default().with_ticks(1),
            sats,
            User::at(500.0, 0.0),
        ))
        .unwrap();

        let result = sim.step().unwrap();
        let m = result.metrics_for(SatelliteId(1)).unwrap();
        assert_eq!(m.position, Vector2::new(0.0, 0.0));
        assert_eq!(m.distance_km, 500.0);
        assert_eq!(m.available_time, 5.0);
        assert_eq!(result.elapsed, 1.0);
    }

    #[test]
    fn test_cancel_between_ticks() {
        let sats = vec![make_satellite(1, 0.0, 0.0, 1.0, 0.0, 1.0, 0.5)];
        let mut sim = Simulation::new(scenario(
            SimulationConfig::default().unbounded(),
            sats,
            User::at(0.0, 0.0),
        ))
        .unwrap();
        let handle = sim.cancel_handle();

        let summary = sim.run(|r| {
            if r.tick == 9 {
                handle.cancel();
            }
        });

        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.stop_reason, Some(StopReason::Cancelled));
        assert_eq!(sim.state(), SimState::Stopped(StopReason::Cancelled));
    }

    #[test]
    fn test_handover_switch_and_release() {
        // Sat 1 recedes from the user, sat 2 approaches; both start covered
        let sats = vec![
            make_satellite(1, 0.0, 0.0, -1.0, 0.0, 100.0, 0.9),
            make_satellite(2, 900.0, 0.0, -1.0, 0.0, 100.0, 0.1),
        ];
        let config = SimulationConfig::default()
            .with_coverage_radius(1000.0)
            .with_ticks(30)
            .with_history(true);
        let mut sim = Simulation::new(scenario(config, sats, User::at(0.0, 0.0))).unwrap();
        let summary = sim.run(|_| {});

        let history = sim.history();
        assert_eq!(history.len(), 30);
        assert_eq!(history[0].handover.unwrap().kind, HandoverKind::Acquire);

        // Every selection change carries an event and nothing else does
        for pair in history.windows(2) {
            let changed = pair[0].selected_id() != pair[1].selected_id();
            assert_eq!(changed, pair[1].handover.is_some());
        }

        assert!(summary.handovers >= 1);
        assert_eq!(summary.acquisitions, 1);
        assert_eq!(summary.releases, 1);
        assert_eq!(history.last().unwrap().selection, None);
    }

    #[test]
    fn test_mobility_hook_moves_user() {
        let sats = vec![make_satellite(1, 0.0, 0.0, 0.0, 1.0, 0.0, 0.5)];
        let mut sim = Simulation::new(scenario(
            SimulationConfig::default().with_ticks(3),
            sats,
            User::at(0.0, 0.0),
        ))
        .unwrap()
        .with_mobility(|_tick: u64, user: &User| User::at(user.position.x + 100.0, 0.0));

        let mut distances = Vec::new();
        sim.run(|r| distances.push(r.metrics[0].distance_km));

        assert_eq!(distances, vec![100.0, 200.0, 300.0]);
        assert_eq!(sim.user().position, Vector2::new(300.0, 0.0));
    }

    #[test]
    fn test_history_off_by_default() {
        let mut sim = Simulation::new(scenario(
            SimulationConfig::default().with_ticks(3),
            vec![],
            User::at(0.0, 0.0),
        ))
        .unwrap();
        let summary = sim.run(|r| assert!(r.selection.is_none()));
        assert!(sim.history().is_empty());
        assert_eq!(summary.unserved_ticks, 3);
    }
}
