//! Remaining in-coverage time from instantaneous kinematics
//!
//! Linear projection: the satellite's velocity component toward the user is
//! taken as the rate at which the remaining coverage margin is consumed.
//!
//! ```text
//! T_avail = (r_cov − d) / v_rel    if v_rel > 0
//!         = 0                      otherwise
//! ```
//!
//! The estimate is first-order and only valid at the current instant; it is
//! re-evaluated every tick.

use leo_kinematics::{Satellite, User};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Availability {
    pub distance_km: f64,
    pub relative_speed: f64,
    pub available_time: f64,
}

/// Estimate how long `satellite` stays within `coverage_radius_km` of `user`.
pub fn estimate(satellite: &Satellite, user: &User, coverage_radius_km: f64) -> Availability {
    let offset = user.position - satellite.position();
    let distance_km = offset.norm();

    // Satellite on top of the user: no closing direction exists.
    if distance_km == 0.0 {
        return Availability {
            distance_km,
            relative_speed: 0.0,
            available_time: 0.0,
        };
    }

    let closing_unit = offset / distance_km;
    let relative_speed = satellite.speed() * satellite.direction().dot(&closing_unit);

    // Any positive closing speed projects; an underflowing divisor saturates at f64::MAX.
    let available_time = if relative_speed > 0.0 {
        ((coverage_radius_km - distance_km) / relative_speed).clamp(0.0, f64::MAX)
    } else {
        0.0
    };

    Availability {
        distance_km,
        relative_speed,
        available_time,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use leo_kinematics::SatelliteId;
    use nalgebra::Vector2;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(5000))]

        // Fuzz: available time is finite and never negative
        #[test]
        fn fuzz_available_time_non_negative(
            sx in -5000.0f64..5000.0,
            sy in -5000.0f64..5000.0,
            ux in -5000.0f64..5000.0,
            uy in -5000.0f64..5000.0,
            angle in 0.0f64..std::f64::consts::TAU,
            speed in 0.0f64..100.0,
            radius in 1.0f64..5000.0,
        ) {
            let sat = Satellite::from_heading(
                SatelliteId(1),
                Vector2::new(sx, sy),
                Vector2::new(angle.cos(), angle.sin()),
                speed,
                0.5,
            ).unwrap();
            let user = User::at(ux, uy);
            let a = estimate(&sat, &user, radius);

            prop_assert!(a.available_time >= 0.0, "negative: {}", a.available_time);
            prop_assert!(a.available_time.is_finite(), "non-finite: {}", a.available_time);
            prop_assert!(a.relative_speed.abs() <= speed + 1e-9);
        }
    }
}
