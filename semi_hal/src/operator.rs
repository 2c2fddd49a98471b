//! Driver control and dashboard feedback.
//!
//! [`OperatorControl`] maps the driver gamepad onto the drivetrain and the
//! ramp during teleop:
//!
//! | Input | Effect |
//! |-------|--------|
//! | left stick | arcade drive (Y forward, X turn) |
//! | A or B held | full speed, otherwise limited to [`NOT_RUN_LIMIT`] |
//! | X or Y held | lock the heading held when pressed |
//! | triggers | ramp speed, right forward and left reverse |
//!
//! [`SensorFeed`] publishes gyro and encoder readings to the dashboard and
//! serves its reset-encoders button.

use crate::command::GYRO_CORRECTION;
use crate::dashboard::keys;
use crate::drivers::simulation::Gyro;
use crate::input::trigger_axis;
use crate::subsystem::{Drivetrain, Ramp};
use semi_common::collab::{Gamepad, TelemetryStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Drive output limit while the run button is not held.
pub const NOT_RUN_LIMIT: f64 = 0.75;

// ─── Operator control ───────────────────────────────────────────────

/// Teleop driving from the gamepad.
pub struct OperatorControl {
    gamepad: Arc<dyn Gamepad>,
    drivetrain: Arc<Drivetrain>,
    ramp: Arc<Ramp>,
    gyro: Arc<Gyro>,
    telemetry: Arc<dyn TelemetryStore>,
    last_operator_control: bool,
    locked_heading: Option<f64>,
}

impl OperatorControl {
    /// Driver control over `drivetrain` and `ramp`.
    pub fn new(
        gamepad: Arc<dyn Gamepad>,
        drivetrain: Arc<Drivetrain>,
        ramp: Arc<Ramp>,
        gyro: Arc<Gyro>,
        telemetry: Arc<dyn TelemetryStore>,
    ) -> Self {
        Self {
            gamepad,
            drivetrain,
            ramp,
            gyro,
            telemetry,
            last_operator_control: false,
            locked_heading: None,
        }
    }

    /// Heading being held, if the lock is engaged.
    pub fn locked_heading(&self) -> Option<f64> {
        self.locked_heading
    }

    /// Call once per control period. Outside operator control the outputs
    /// are stopped once, on leaving it.
    pub fn periodic_update(&mut self, operator_control: bool) {
        if !operator_control {
            if self.last_operator_control {
                debug!("Leaving operator control, stopping drive and ramp");
                self.drivetrain.stop_motor();
                self.ramp.stop_motors();
                self.locked_heading = None;
            }
            self.last_operator_control = false;
            self.telemetry.put_number(keys::INTAKE_THROTTLE, 0.0);
            return;
        }
        self.last_operator_control = true;

        let pad = self.gamepad.state();
        let angle = self.gyro.angle();
        let lock_held = pad.x || pad.y;
        let run_held = pad.a || pad.b;

        match (lock_held, self.locked_heading) {
            (true, None) => {
                info!("Heading locked at {:.1} deg", angle);
                self.locked_heading = Some(angle);
            }
            (false, Some(_)) => {
                info!("Heading unlocked");
                self.locked_heading = None;
            }
            _ => {}
        }

        let limit = if run_held { 1.0 } else { NOT_RUN_LIMIT };
        // Stick Y is positive towards the driver.
        let magnitude = -pad.left_y * limit;
        let curve = match self.locked_heading {
            Some(target) => -GYRO_CORRECTION * (angle - target),
            None => pad.left_x * limit,
        };
        let intake = trigger_axis(pad.left_trigger, pad.right_trigger);

        self.drivetrain.arcade_drive(magnitude, curve, true);
        self.ramp.set_speed(intake);
        self.telemetry.put_number(keys::INTAKE_THROTTLE, intake);
    }
}

impl std::fmt::Debug for OperatorControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorControl")
            .field("last_operator_control", &self.last_operator_control)
            .field("locked_heading", &self.locked_heading)
            .finish_non_exhaustive()
    }
}

// ─── Sensor feed ────────────────────────────────────────────────────

/// Dashboard readout of the drive sensors.
pub struct SensorFeed {
    telemetry: Arc<dyn TelemetryStore>,
    drivetrain: Arc<Drivetrain>,
    gyro: Arc<Gyro>,
}

impl SensorFeed {
    /// Feed for `drivetrain` and `gyro`.
    pub fn new(telemetry: Arc<dyn TelemetryStore>, drivetrain: Arc<Drivetrain>, gyro: Arc<Gyro>) -> Self {
        telemetry.put_boolean(keys::CMD_RESET_ENCODERS, false);
        Self {
            telemetry,
            drivetrain,
            gyro,
        }
    }

    /// Serve the reset button, then publish the readings.
    pub fn update(&self) {
        if self.telemetry.get_boolean(keys::CMD_RESET_ENCODERS, false) {
            info!("Encoders reset from dashboard");
            self.drivetrain.reset_encoders();
            self.telemetry.put_boolean(keys::CMD_RESET_ENCODERS, false);
        }
        self.telemetry.put_number(keys::GYROSCOPE, self.gyro.angle());
        self.telemetry
            .put_number(keys::LEFT_ENCODER, self.drivetrain.left_encoder().distance());
        self.telemetry
            .put_number(keys::RIGHT_ENCODER, self.drivetrain.right_encoder().distance());
    }
}

impl std::fmt::Debug for SensorFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorFeed").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HardwareContext;
    use crate::drivers::simulation::{MemoryTelemetry, SimGamepad, SpeedController};
    use crate::util::is_equal;
    use semi_common::collab::GamepadState;
    use semi_common::config::PortMap;
    use semi_common::port::PortLimits;
    use std::time::Duration;

    struct Rig {
        pad: Arc<SimGamepad>,
        drivetrain: Arc<Drivetrain>,
        ramp: Arc<Ramp>,
        gyro: Arc<Gyro>,
        telemetry: Arc<MemoryTelemetry>,
    }

    impl Rig {
        fn new() -> Self {
            let hw = HardwareContext::new(PortLimits::default());
            Self {
                pad: Arc::new(SimGamepad::new()),
                drivetrain: Arc::new(Drivetrain::new(&hw, &PortMap::default()).unwrap()),
                ramp: Arc::new(Ramp::new(&hw, &PortMap::default()).unwrap()),
                gyro: Arc::new(Gyro::new()),
                telemetry: Arc::new(MemoryTelemetry::new()),
            }
        }

        fn control(&self) -> OperatorControl {
            OperatorControl::new(
                self.pad.clone(),
                self.drivetrain.clone(),
                self.ramp.clone(),
                self.gyro.clone(),
                self.telemetry.clone(),
            )
        }

        fn sides(&self) -> (f64, f64) {
            (
                self.drivetrain.left_motor().get(),
                -self.drivetrain.right_motor().get(),
            )
        }
    }

    #[test]
    fn test_speed_limited_unless_run_held() {
        let rig = Rig::new();
        let mut control = rig.control();
        rig.pad.set_state(GamepadState {
            left_y: -1.0,
            ..GamepadState::default()
        });
        control.periodic_update(true);
        // 0.75 squared by the arcade drive.
        assert_eq!(rig.sides(), (0.5625, 0.5625));

        rig.pad.update(|s| s.a = true);
        control.periodic_update(true);
        assert_eq!(rig.sides(), (1.0, 1.0));
    }

    #[test]
    fn test_heading_lock_steers_back() {
        let rig = Rig::new();
        let mut control = rig.control();
        rig.gyro.add_rotation(30.0, Duration::from_secs(1));
        rig.pad.set_state(GamepadState {
            left_y: -1.0,
            left_x: 1.0,
            b: true,
            x: true,
            ..GamepadState::default()
        });
        control.periodic_update(true);
        assert_eq!(control.locked_heading(), Some(30.0));
        // Locked and on heading: the stick's turn is ignored.
        assert_eq!(rig.sides(), (1.0, 1.0));

        // Drifted 20 degrees clockwise: correction turns left.
        rig.gyro.add_rotation(20.0, Duration::from_secs(1));
        control.periodic_update(true);
        let (left, right) = rig.sides();
        assert!(left < right);
        assert!(is_equal(right, 1.0, 1e-9));
        assert!(is_equal(left, 0.75, 1e-9));

        rig.pad.update(|s| s.x = false);
        control.periodic_update(true);
        assert_eq!(control.locked_heading(), None);
    }

    #[test]
    fn test_triggers_drive_ramp_and_publish() {
        let rig = Rig::new();
        let mut control = rig.control();
        rig.pad.set_state(GamepadState {
            left_trigger: 0.2,
            right_trigger: 0.8,
            ..GamepadState::default()
        });
        control.periodic_update(true);
        assert!(is_equal(rig.ramp.motors()[3].get(), 0.6, 1e-9));
        assert!(is_equal(
            rig.telemetry.get_number(keys::INTAKE_THROTTLE, -1.0),
            0.6,
            1e-9
        ));
    }

    #[test]
    fn test_leaving_operator_control_stops_once() {
        let rig = Rig::new();
        let mut control = rig.control();
        rig.pad.set_state(GamepadState {
            left_y: -0.5,
            right_trigger: 1.0,
            y: true,
            ..GamepadState::default()
        });
        control.periodic_update(true);
        assert!(control.locked_heading().is_some());

        control.periodic_update(false);
        assert_eq!(rig.sides(), (0.0, 0.0));
        assert_eq!(rig.ramp.motors()[0].get(), 0.0);
        assert_eq!(control.locked_heading(), None);
        assert_eq!(rig.telemetry.get_number(keys::INTAKE_THROTTLE, -1.0), 0.0);

        // Another component may drive while control is inactive.
        rig.drivetrain.tank_drive(0.3, 0.3);
        control.periodic_update(false);
        assert_eq!(rig.sides(), (0.3, 0.3));
    }

    #[test]
    fn test_sensor_feed_publishes_and_resets() {
        let rig = Rig::new();
        let feed = SensorFeed::new(rig.telemetry.clone(), rig.drivetrain.clone(), rig.gyro.clone());
        rig.gyro.add_rotation(12.5, Duration::from_secs(1));
        rig.drivetrain.left_encoder().add_pulses(100);

        feed.update();
        assert_eq!(rig.telemetry.get_number(keys::GYROSCOPE, 0.0), 12.5);
        assert!(rig.telemetry.get_number(keys::LEFT_ENCODER, 0.0) > 0.0);

        rig.telemetry.put_boolean(keys::CMD_RESET_ENCODERS, true);
        feed.update();
        assert_eq!(rig.drivetrain.left_encoder().get(), 0);
        assert_eq!(rig.telemetry.get_number(keys::LEFT_ENCODER, -1.0), 0.0);
        assert!(!rig.telemetry.get_boolean(keys::CMD_RESET_ENCODERS, true));
    }
}
