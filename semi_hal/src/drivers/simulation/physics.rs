//! Drivetrain kinematics for the simulation loop.
//!
//! Turns the drive motor outputs of one control period into encoder pulses
//! and gyro rotation. Outputs map linearly to wheel speed; there is no
//! inertia or wheel slip.

use super::gyro::Gyro;
use super::motor::SpeedController;
use crate::subsystem::Drivetrain;
use parking_lot::Mutex;
use std::time::Duration;
use tracing::trace;

/// Wheel speed at full output, metres per second.
pub const DEFAULT_TOP_SPEED: f64 = 4.0;

/// Turn rate when the sides run at full output in opposite directions,
/// degrees per second.
pub const DEFAULT_TOP_TURN_RATE: f64 = 300.0;

/// Differential drive model.
#[derive(Debug)]
pub struct DrivePhysics {
    top_speed: f64,
    top_turn_rate: f64,
    /// Sub-pulse travel carried over to the next step (left, right).
    residual: Mutex<(f64, f64)>,
}

impl Default for DrivePhysics {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_SPEED, DEFAULT_TOP_TURN_RATE)
    }
}

impl DrivePhysics {
    /// Model with the given top speed (m/s) and top turn rate (deg/s).
    pub fn new(top_speed: f64, top_turn_rate: f64) -> Self {
        Self {
            top_speed,
            top_turn_rate,
            residual: Mutex::new((0.0, 0.0)),
        }
    }

    /// Advance encoders and gyro by `elapsed` at the current motor outputs.
    pub fn step(&self, drivetrain: &Drivetrain, gyro: &Gyro, elapsed: Duration) {
        let dt = elapsed.as_secs_f64();
        let left = drivetrain.left_motor().output();
        // Right motor is mirrored: negative output drives forward.
        let right = -drivetrain.right_motor().output();

        let per_pulse = drivetrain.left_encoder().preset().distance_per_pulse;
        let mut residual = self.residual.lock();
        let left_pulses = take_pulses(&mut residual.0, left * self.top_speed * dt, per_pulse);
        let right_pulses = take_pulses(&mut residual.1, right * self.top_speed * dt, per_pulse);
        drop(residual);

        drivetrain.left_encoder().add_pulses(left_pulses);
        // Right encoder counts reversed.
        drivetrain.right_encoder().add_pulses(-right_pulses);

        let degrees = (left - right) / 2.0 * self.top_turn_rate * dt;
        gyro.add_rotation(degrees, elapsed);
        trace!(
            "physics: left {:+.3} right {:+.3} -> {} / {} pulses, {:+.2} deg",
            left, right, left_pulses, right_pulses, degrees
        );
    }
}

/// Whole pulses in `residual + travel`, keeping the remainder.
fn take_pulses(residual: &mut f64, travel: f64, per_pulse: f64) -> i64 {
    let total = *residual + travel / per_pulse;
    let whole = total.trunc();
    *residual = total - whole;
    whole as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HardwareContext;
    use crate::util::is_equal;
    use semi_common::config::PortMap;
    use semi_common::port::PortLimits;

    fn rig() -> (Drivetrain, Gyro) {
        let hw = HardwareContext::new(PortLimits::default());
        (Drivetrain::new(&hw, &PortMap::default()).unwrap(), Gyro::new())
    }

    #[test]
    fn test_straight_drive_moves_both_encoders() {
        let (dt, gyro) = rig();
        let physics = DrivePhysics::default();
        dt.tank_drive(0.5, 0.5);
        for _ in 0..50 {
            physics.step(&dt, &gyro, Duration::from_millis(20));
        }
        let per_pulse = dt.left_encoder().preset().distance_per_pulse;
        assert!(is_equal(dt.left_encoder().distance(), 2.0, per_pulse));
        assert!(is_equal(dt.right_encoder().distance(), 2.0, per_pulse));
        assert_eq!(gyro.angle(), 0.0);
    }

    #[test]
    fn test_turn_in_place_is_clockwise_for_positive_rotation() {
        let (dt, gyro) = rig();
        let physics = DrivePhysics::default();
        dt.arcade_drive(0.0, 0.5, false);
        physics.step(&dt, &gyro, Duration::from_secs(1));
        assert!(is_equal(gyro.angle(), 150.0, 1e-9));
        assert_eq!(dt.left_encoder().get(), -dt.right_encoder().get());
    }

    #[test]
    fn test_sub_pulse_travel_carries_over() {
        let mut residual = 0.0;
        assert_eq!(take_pulses(&mut residual, 0.6, 1.0), 0);
        assert_eq!(take_pulses(&mut residual, 0.6, 1.0), 1);
        assert!(is_equal(residual, 0.2, 1e-12));
        assert_eq!(take_pulses(&mut residual, -1.4, 1.0), -1);
    }
}
