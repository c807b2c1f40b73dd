//! Signal-strength proxy (inverse distance)
//!
//! Reported alongside the score but not part of it.

use leo_kinematics::{Satellite, User};

/// Sentinel for a satellite sitting exactly on the user
pub const INFINITE_SIGNAL: f64 = f64::INFINITY;

pub fn signal_strength(satellite: &Satellite, user: &User) -> f64 {
    from_distance(satellite.distance_to(&user.position))
}

pub fn from_distance(distance_km: f64) -> f64 {
    if distance_km > 0.0 {
        1.0 / distance_km
    } else {
        INFINITE_SIGNAL
    }
}
