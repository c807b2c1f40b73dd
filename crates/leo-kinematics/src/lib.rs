//! LEO Kinematics Library
//!
//! Planar satellite and user state for the handover decision engine.
//! Satellites fly straight lines at constant speed; there is no Earth
//! curvature and no orbital dynamics at this layer.
//!
//! - [`propagation`]: one-step position update
//! - [`chord`]: closed-form coverage-disk crossing for a fixed straight pass

use nalgebra::{Unit, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KinematicsError {
    #[error("Invalid direction for satellite {0}: heading must be finite and non-zero")]
    InvalidDirection(SatelliteId),
    #[error("Invalid speed for satellite {0}: {1} (must be finite and >= 0)")]
    InvalidSpeed(SatelliteId, f64),
    #[error("Invalid resource availability for satellite {0}: {1} (must be within [0, 1])")]
    InvalidResource(SatelliteId, f64),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, KinematicsError>;

/// Stable satellite identifier. Ordering of ids is the selection tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SatelliteId(pub u32);

impl fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LEO {}", self.0)
    }
}

/// A satellite moving at constant velocity in the plane.
///
/// Only the position changes after construction, and only through
/// [`Satellite::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Satellite {
    id: SatelliteId,
    position: Vector2<f64>,
    direction: Unit<Vector2<f64>>,
    speed: f64,
    resource_availability: f64,
}

impl Satellite {
    pub fn new(
        id: SatelliteId,
        position: Vector2<f64>,
        direction: Unit<Vector2<f64>>,
        speed: f64,
        resource_availability: f64,
    ) -> Result<Self> {
        if !position.iter().all(|c| c.is_finite()) {
            return Err(KinematicsError::InvalidGeometry(format!(
                "satellite {} position is not finite",
                id
            )));
        }
        if !direction.iter().all(|c| c.is_finite()) {
            return Err(KinematicsError::InvalidDirection(id));
        }
        if !speed.is_finite() || speed < 0.0 {
            return Err(KinematicsError::InvalidSpeed(id, speed));
        }
        if !(0.0..=1.0).contains(&resource_availability) {
            return Err(KinematicsError::InvalidResource(id, resource_availability));
        }

        Ok(Self {
            id,
            position,
            direction,
            speed,
            resource_availability,
        })
    }

    /// Build from an arbitrary heading, normalizing it once.
    ///
    /// A zero-length or non-finite heading is rejected.
    pub fn from_heading(
        id: SatelliteId,
        position: Vector2<f64>,
        heading: Vector2<f64>,
        speed: f64,
        resource_availability: f64,
    ) -> Result<Self> {
        let direction = unit_heading(heading).ok_or(KinematicsError::InvalidDirection(id))?;
        Self::new(id, position, direction, speed, resource_availability)
    }

    pub fn id(&self) -> SatelliteId {
        self.id
    }

    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    pub fn direction(&self) -> Unit<Vector2<f64>> {
        self.direction
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn resource_availability(&self) -> f64 {
        self.resource_availability
    }

    /// Velocity vector (km per unit time)
    pub fn velocity(&self) -> Vector2<f64> {
        self.direction.as_ref() * self.speed
    }

    /// Euclidean distance from this satellite to a point (km)
    pub fn distance_to(&self, point: &Vector2<f64>) -> f64 {
        (self.position - point).norm()
    }

    /// Move the satellite forward by one time step.
    pub fn advance(&mut self, dt: f64) {
        self.position = propagation::advance(self.position, &self.direction, self.speed, dt);
    }
}

/// The served user device. Static unless an external mobility model moves it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub position: Vector2<f64>,
}

impl User {
    pub fn new(position: Vector2<f64>) -> Self {
        Self { position }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self::new(Vector2::new(x, y))
    }
}

/// Normalize a heading, rejecting zero-length and non-finite vectors.
///
/// The heading is scaled by its largest component first so huge or tiny
/// finite inputs do not overflow or underflow the norm.
pub fn unit_heading(heading: Vector2<f64>) -> Option<Unit<Vector2<f64>>> {
    if !heading.iter().all(|c| c.is_finite()) {
        return None;
    }
    let scale = heading.amax();
    if scale == 0.0 {
        return None;
    }
    Unit::try_new(heading / scale, f64::EPSILON)
}

pub mod propagation {
    use super::*;

    /// `position + direction * speed * dt`
    ///
    /// No bounds checking; satellites may leave any notional map extent.
    pub fn advance(
        position: Vector2<f64>,
        direction: &Unit<Vector2<f64>>,
        speed: f64,
        dt: f64,
    ) -> Vector2<f64> {
        position + direction.as_ref() * (speed * dt)
    }
}

pub mod chord {
    //! Closed-form coverage crossing for a satellite on a fixed straight path.
    //!
    //! A path passing at perpendicular offset `d` from the center of a disk of
    //! radius `r` cuts a chord of length `2·sqrt(r² − d²)`. Dividing by the
    //! ground speed gives the total time spent inside the disk.
    //!
    //! This is a one-shot geometric analysis. The per-tick decision engine
    //! uses the instantaneous linear projection instead.

    use super::*;

    /// Chord length (km) cut by a straight path at `offset_km` from the disk center.
    ///
    /// Returns `None` when the path misses the disk or the radius is not positive.
    pub fn chord_length(radius_km: f64, offset_km: f64) -> Option<f64> {
        let offset = offset_km.abs();
        if !radius_km.is_finite() || radius_km <= 0.0 || !offset.is_finite() || offset > radius_km
        {
            return None;
        }
        Some(2.0 * (radius_km * radius_km - offset * offset).sqrt())
    }

    /// Time (s) spent inside the disk at constant `speed_km_s`.
    ///
    /// A path that misses the disk yields zero.
    pub fn crossing_time(radius_km: f64, offset_km: f64, speed_km_s: f64) -> Result<f64> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(KinematicsError::InvalidGeometry(format!(
                "coverage radius must be positive, got {}",
                radius_km
            )));
        }
        if !speed_km_s.is_finite() || speed_km_s <= 0.0 {
            return Err(KinematicsError::InvalidGeometry(format!(
                "crossing speed must be positive, got {}",
                speed_km_s
            )));
        }

        Ok(chord_length(radius_km, offset_km)
            .map(|length| length / speed_km_s)
            .unwrap_or(0.0))
    }

    /// Perpendicular distance from `center` to the line through `path_point`
    /// along `direction`.
    pub fn path_offset(
        path_point: &Vector2<f64>,
        direction: &Unit<Vector2<f64>>,
        center: &Vector2<f64>,
    ) -> f64 {
        (center - path_point).perp(direction.as_ref()).abs()
    }

    /// Total crossing time of a satellite's current straight path through the
    /// coverage disk centered on `center`.
    pub fn satellite_crossing_time(
        satellite: &Satellite,
        center: &Vector2<f64>,
        radius_km: f64,
    ) -> Result<f64> {
        let offset = path_offset(&satellite.position(), &satellite.direction(), center);
        crossing_time(radius_km, offset, satellite.speed())
    }
}
