//! Robot subsystems: drivetrain, ramp and sensors.
//!
//! Subsystems get their devices from the shared [`HardwareContext`]. Two
//! subsystems configured with the same port receive the same device
//! instance; a subsystem asking for a different controller type on a port
//! already in use fails at construction with `TypeConflict`.

use crate::context::HardwareContext;
use crate::drivers::simulation::{Gyro, Spark, SpeedController};
use crate::sensor::{Encoder, EncoderPreset};
use crate::util::clamp;
use semi_common::config::PortMap;
use semi_common::registry::RegistryError;
use std::sync::Arc;
use tracing::info;

// ─── Drivetrain ─────────────────────────────────────────────────────

/// Two-sided differential drive with an encoder per side.
///
/// The right motor is mounted mirrored, so its commanded output is negated.
#[derive(Debug)]
pub struct Drivetrain {
    left_motor: Arc<Spark>,
    right_motor: Arc<Spark>,
    left_encoder: Encoder,
    right_encoder: Encoder,
}

impl Drivetrain {
    /// Claim the drivetrain motors and encoders.
    pub fn new(hw: &HardwareContext, ports: &PortMap) -> Result<Self, RegistryError> {
        let left_motor = hw.spark(ports.pwm.left_motor)?;
        let right_motor = hw.spark(ports.pwm.right_motor)?;

        let preset = EncoderPreset::cimcoder();
        let left_encoder = Encoder::new(
            hw.digital_input(ports.dio.left_encoder_a)?,
            hw.digital_input(ports.dio.left_encoder_b)?,
            preset,
            false,
        );
        let right_encoder = Encoder::new(
            hw.digital_input(ports.dio.right_encoder_a)?,
            hw.digital_input(ports.dio.right_encoder_b)?,
            preset,
            true,
        );

        info!(
            "Drivetrain ready: motors pwm {}/{}",
            ports.pwm.left_motor, ports.pwm.right_motor
        );
        Ok(Self {
            left_motor,
            right_motor,
            left_encoder,
            right_encoder,
        })
    }

    /// Left drive motor.
    pub fn left_motor(&self) -> &Arc<Spark> {
        &self.left_motor
    }

    /// Right drive motor.
    pub fn right_motor(&self) -> &Arc<Spark> {
        &self.right_motor
    }

    /// Left side encoder.
    pub fn left_encoder(&self) -> &Encoder {
        &self.left_encoder
    }

    /// Right side encoder.
    pub fn right_encoder(&self) -> &Encoder {
        &self.right_encoder
    }

    /// Arcade drive: `speed` forward, `rotation` clockwise, both `-1..=1`.
    ///
    /// With `squared_inputs` the inputs are squared (sign kept) for finer
    /// control at low speed.
    pub fn arcade_drive(&self, speed: f64, rotation: f64, squared_inputs: bool) {
        let mut speed = clamp(speed, -1.0, 1.0);
        let mut rotation = clamp(rotation, -1.0, 1.0);
        if squared_inputs {
            speed = (speed * speed).copysign(speed);
            rotation = (rotation * rotation).copysign(rotation);
        }

        let max_input = speed.abs().max(rotation.abs()).copysign(speed);
        let (left, right) = if speed >= 0.0 {
            if rotation >= 0.0 {
                (max_input, speed - rotation)
            } else {
                (speed + rotation, max_input)
            }
        } else if rotation >= 0.0 {
            (speed + rotation, max_input)
        } else {
            (max_input, speed - rotation)
        };

        self.set_outputs(left, right);
    }

    /// Curvature drive: `rotation` sets the path curvature rather than the
    /// turn rate, so turning scales with `speed`. With `quick_turn` the
    /// rotation applies directly, for turning in place.
    pub fn curvature_drive(&self, speed: f64, rotation: f64, quick_turn: bool) {
        let speed = clamp(speed, -1.0, 1.0);
        let rotation = clamp(rotation, -1.0, 1.0);

        let angular = if quick_turn {
            rotation
        } else {
            speed.abs() * rotation
        };
        let mut left = speed + angular;
        let mut right = speed - angular;

        // Quick turn keeps the rotation and gives up speed on the other side.
        if quick_turn {
            if left > 1.0 {
                right -= left - 1.0;
                left = 1.0;
            } else if right > 1.0 {
                left -= right - 1.0;
                right = 1.0;
            } else if left < -1.0 {
                right -= left + 1.0;
                left = -1.0;
            } else if right < -1.0 {
                left -= right + 1.0;
                right = -1.0;
            }
        }

        let max_magnitude = left.abs().max(right.abs());
        if max_magnitude > 1.0 {
            left /= max_magnitude;
            right /= max_magnitude;
        }
        self.set_outputs(left, right);
    }

    /// Tank drive: independent side speeds.
    pub fn tank_drive(&self, left: f64, right: f64) {
        self.set_outputs(clamp(left, -1.0, 1.0), clamp(right, -1.0, 1.0));
    }

    fn set_outputs(&self, left: f64, right: f64) {
        self.left_motor.set(clamp(left, -1.0, 1.0));
        self.right_motor.set(-clamp(right, -1.0, 1.0));
    }

    /// Stop both sides.
    pub fn stop_motor(&self) {
        self.left_motor.stop_motor();
        self.right_motor.stop_motor();
    }

    /// Zero both encoders.
    pub fn reset_encoders(&self) {
        self.left_encoder.reset();
        self.right_encoder.reset();
    }

    /// Mean distance of both sides since the last reset, metres.
    pub fn distance(&self) -> f64 {
        (self.left_encoder.distance() + self.right_encoder.distance()) / 2.0
    }
}

// ─── Sensors ────────────────────────────────────────────────────────

/// Robot-wide sensors not tied to a mechanism.
#[derive(Debug)]
pub struct Sensors {
    gyro: Arc<Gyro>,
}

impl Sensors {
    /// Sensors with a zeroed gyro.
    pub fn new() -> Self {
        Self::with_gyro(Arc::new(Gyro::new()))
    }

    /// Sensors around an existing gyro.
    pub fn with_gyro(gyro: Arc<Gyro>) -> Self {
        info!("Sensors ready");
        Self { gyro }
    }

    /// Heading gyro.
    pub fn gyro(&self) -> &Arc<Gyro> {
        &self.gyro
    }
}

impl Default for Sensors {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Ramp ───────────────────────────────────────────────────────────

/// Intake and ramp rollers.
///
/// The right intake and left ramp rollers are mounted mirrored and run
/// inverted.
#[derive(Debug)]
pub struct Ramp {
    intake_left: Arc<Spark>,
    intake_right: Arc<Spark>,
    ramp_left: Arc<Spark>,
    ramp_right: Arc<Spark>,
}

impl Ramp {
    /// Claim the roller motors.
    pub fn new(hw: &HardwareContext, ports: &PortMap) -> Result<Self, RegistryError> {
        let ramp = Self {
            intake_left: hw.spark(ports.pwm.left_intake)?,
            intake_right: hw.spark(ports.pwm.right_intake)?,
            ramp_left: hw.spark(ports.pwm.left_ramp)?,
            ramp_right: hw.spark(ports.pwm.right_ramp)?,
        };
        ramp.intake_right.set_inverted(true);
        ramp.ramp_left.set_inverted(true);

        info!("Ramp ready");
        Ok(ramp)
    }

    /// All four rollers: intake left/right, ramp left/right.
    pub fn motors(&self) -> [&Arc<Spark>; 4] {
        [
            &self.intake_left,
            &self.intake_right,
            &self.ramp_left,
            &self.ramp_right,
        ]
    }

    /// Run every roller at `speed` (clamped to `-1..=1`).
    pub fn set_speed(&self, speed: f64) {
        let speed = clamp(speed, -1.0, 1.0);
        for motor in self.motors() {
            motor.set(speed);
        }
    }

    /// Stop every roller.
    pub fn stop_motors(&self) {
        for motor in self.motors() {
            motor.stop_motor();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semi_common::port::PortLimits;

    fn context() -> HardwareContext {
        HardwareContext::new(PortLimits::default())
    }

    #[test]
    fn test_arcade_forward() {
        let hw = context();
        let dt = Drivetrain::new(&hw, &PortMap::default()).unwrap();
        dt.arcade_drive(0.5, 0.0, false);
        assert_eq!(dt.left_motor().get(), 0.5);
        assert_eq!(dt.right_motor().get(), -0.5);
    }

    #[test]
    fn test_arcade_turn_in_place() {
        let hw = context();
        let dt = Drivetrain::new(&hw, &PortMap::default()).unwrap();
        dt.arcade_drive(0.0, 1.0, false);
        assert_eq!(dt.left_motor().get(), 1.0);
        assert_eq!(dt.right_motor().get(), 1.0);
    }

    #[test]
    fn test_arcade_squared_inputs() {
        let hw = context();
        let dt = Drivetrain::new(&hw, &PortMap::default()).unwrap();
        dt.arcade_drive(-0.5, 0.0, true);
        assert_eq!(dt.left_motor().get(), -0.25);
        assert_eq!(dt.right_motor().get(), 0.25);
    }

    #[test]
    fn test_stop_motor() {
        let hw = context();
        let dt = Drivetrain::new(&hw, &PortMap::default()).unwrap();
        dt.tank_drive(0.3, 2.0);
        assert_eq!(dt.right_motor().get(), -1.0);
        dt.stop_motor();
        assert_eq!(dt.left_motor().get(), 0.0);
        assert_eq!(dt.right_motor().get(), 0.0);
    }

    #[test]
    fn test_curvature_scales_turn_with_speed() {
        let hw = context();
        let dt = Drivetrain::new(&hw, &PortMap::default()).unwrap();
        dt.curvature_drive(0.5, 0.5, false);
        assert_eq!(dt.left_motor().get(), 0.75);
        assert_eq!(dt.right_motor().get(), -0.25);

        // No speed, no turn without quick turn.
        dt.curvature_drive(0.0, 1.0, false);
        assert_eq!(dt.left_motor().get(), 0.0);
        assert_eq!(dt.right_motor().get(), 0.0);
    }

    #[test]
    fn test_curvature_quick_turn() {
        let hw = context();
        let dt = Drivetrain::new(&hw, &PortMap::default()).unwrap();
        dt.curvature_drive(0.0, -0.35, true);
        assert_eq!(dt.left_motor().get(), -0.35);
        assert_eq!(dt.right_motor().get(), -0.35);

        // Left saturates, the excess comes off the right side.
        dt.curvature_drive(0.75, 0.5, true);
        assert_eq!(dt.left_motor().get(), 1.0);
        assert_eq!(dt.right_motor().get(), 0.0);
    }

    #[test]
    fn test_distance_averages_sides() {
        let hw = context();
        let dt = Drivetrain::new(&hw, &PortMap::default()).unwrap();
        let per_pulse = dt.left_encoder().preset().distance_per_pulse;
        dt.left_encoder().add_pulses(100);
        dt.right_encoder().add_pulses(-300);
        assert!(crate::util::is_equal(dt.distance(), 200.0 * per_pulse, 1e-12));
    }

    #[test]
    fn test_ramp_inversion_and_clamp() {
        let hw = context();
        let ramp = Ramp::new(&hw, &PortMap::default()).unwrap();
        ramp.set_speed(3.0);

        let [il, ir, rl, rr] = ramp.motors();
        assert_eq!(il.output(), 1.0);
        assert_eq!(ir.output(), -1.0);
        assert_eq!(rl.output(), -1.0);
        assert_eq!(rr.output(), 1.0);

        ramp.stop_motors();
        assert!(ramp.motors().iter().all(|m| m.get() == 0.0));
    }

    #[test]
    fn test_subsystems_share_overlapping_ports() {
        let hw = context();
        let mut ports = PortMap::default();
        ports.pwm.left_intake = ports.pwm.left_motor;

        let dt = Drivetrain::new(&hw, &ports).unwrap();
        let ramp = Ramp::new(&hw, &ports).unwrap();
        assert!(Arc::ptr_eq(dt.left_motor(), ramp.motors()[0]));
    }

    #[test]
    fn test_subsystem_fails_on_type_conflict() {
        let hw = context();
        hw.talon(PortMap::default().pwm.left_motor).unwrap();
        let err = Drivetrain::new(&hw, &PortMap::default()).unwrap_err();
        assert!(matches!(err, RegistryError::TypeConflict { .. }));
    }
}
