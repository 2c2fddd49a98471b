//! Robot lifecycle.
//!
//! The controller drives the robot through four modes. Entering a mode runs
//! its `*_init` callback once; while the mode is active its `*_periodic`
//! callback runs every control period, followed by
//! [`Robot::robot_periodic`].
//!
//! Autonomous starts the routine built from the plate assignment; leaving
//! autonomous cancels it. Operator control and the sensor feed, when
//! attached, run in [`Robot::robot_periodic`].
//!
//! ```text
//!            set_mode(Autonomous)         set_mode(Teleop)
//! Disabled ───────────────────▶ Autonomous ───────────────▶ Teleop
//!    ▲                                                          │
//!    └──────────────────────── set_mode(Disabled) ──────────────┘
//! ```

use crate::camera::CameraSetup;
use crate::dashboard::keys;
use crate::game::PlateAssignment;
use crate::operator::{OperatorControl, SensorFeed};
use semi_common::collab::{Command, CommandHandle, DriverStation, TaskScheduler, TelemetryStore};
use semi_common::config::CameraConfig;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Controller operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RobotMode {
    /// Outputs disabled
    Disabled,
    /// Autonomous period
    Autonomous,
    /// Driver-controlled period
    Teleop,
    /// Test mode
    Test,
}

impl fmt::Display for RobotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disabled => "disabled",
            Self::Autonomous => "autonomous",
            Self::Teleop => "teleop",
            Self::Test => "test",
        };
        f.write_str(s)
    }
}

/// Builds the autonomous command once the plate assignment is known.
pub type AutonomousFactory = Box<dyn FnMut(&PlateAssignment) -> Box<dyn Command> + Send>;

/// Top-level robot program.
pub struct Robot {
    scheduler: Arc<dyn TaskScheduler>,
    camera: CameraSetup,
    camera_config: CameraConfig,
    driver_station: Arc<dyn DriverStation>,
    telemetry: Option<Arc<dyn TelemetryStore>>,
    autonomous: Option<AutonomousFactory>,
    autonomous_command: Option<CommandHandle>,
    operator: Option<OperatorControl>,
    sensor_feed: Option<SensorFeed>,
    mode: Option<RobotMode>,
    plate_assignment: Option<PlateAssignment>,
}

impl Robot {
    /// Create the robot program. No callback runs until [`robot_init`](Self::robot_init).
    pub fn new(
        scheduler: Arc<dyn TaskScheduler>,
        camera: CameraSetup,
        camera_config: CameraConfig,
        driver_station: Arc<dyn DriverStation>,
    ) -> Self {
        Self {
            scheduler,
            camera,
            camera_config,
            driver_station,
            telemetry: None,
            autonomous: None,
            autonomous_command: None,
            operator: None,
            sensor_feed: None,
            mode: None,
            plate_assignment: None,
        }
    }

    /// Publish the plate assignment to `store` whenever it changes.
    pub fn with_telemetry(mut self, store: Arc<dyn TelemetryStore>) -> Self {
        self.telemetry = Some(store);
        self
    }

    /// Routine scheduled on entering autonomous.
    pub fn with_autonomous(
        mut self,
        factory: impl FnMut(&PlateAssignment) -> Box<dyn Command> + Send + 'static,
    ) -> Self {
        self.autonomous = Some(Box::new(factory));
        self
    }

    /// Drive from the gamepad during teleop.
    pub fn with_operator_control(mut self, operator: OperatorControl) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Publish sensor readings every period.
    pub fn with_sensor_feed(mut self, feed: SensorFeed) -> Self {
        self.sensor_feed = Some(feed);
        self
    }

    /// Handle of the autonomous command started last.
    pub fn autonomous_command(&self) -> Option<&CommandHandle> {
        self.autonomous_command.as_ref()
    }

    /// Current mode, `None` before the first [`set_mode`](Self::set_mode).
    pub fn mode(&self) -> Option<RobotMode> {
        self.mode
    }

    /// Last plate assignment received from the field.
    pub fn plate_assignment(&self) -> Option<PlateAssignment> {
        self.plate_assignment
    }

    fn update_plate_assignment(&mut self) {
        let Some(message) = self.driver_station.game_specific_message() else {
            if self.plate_assignment != Some(PlateAssignment::ALL_INVALID) {
                info!("Plate assignment set to ALL_INVALID, got no message");
            }
            self.set_plate_assignment(PlateAssignment::ALL_INVALID);
            return;
        };

        let unchanged = self
            .plate_assignment
            .is_some_and(|current| current.to_string() == message);
        if !unchanged {
            let assignment = PlateAssignment::parse(&message);
            info!("Plate assignment set to {}, got {}", assignment, message);
            self.set_plate_assignment(assignment);
        }
    }

    fn start_autonomous(&mut self) {
        let Some(factory) = self.autonomous.as_mut() else {
            debug!("No autonomous routine configured");
            return;
        };
        let plates = self.plate_assignment.unwrap_or(PlateAssignment::ALL_INVALID);
        let command = factory(&plates);
        info!("Starting autonomous command '{}'", command.name());
        self.autonomous_command = Some(self.scheduler.schedule(command));
    }

    fn cancel_autonomous(&mut self) {
        if let Some(handle) = self.autonomous_command.take() {
            if !handle.is_finished() {
                info!("Cancelling autonomous command");
                self.scheduler.cancel(&handle);
            }
        }
    }

    fn set_plate_assignment(&mut self, assignment: PlateAssignment) {
        if self.plate_assignment == Some(assignment) {
            return;
        }
        self.plate_assignment = Some(assignment);
        if let Some(store) = &self.telemetry {
            store.put_string(keys::FMS_GAME_DATA, &assignment.to_string());
        }
    }

    // ─── Mode dispatch ──────────────────────────────────────────────

    /// Switch to `mode`, running its init callback if the mode changed.
    pub fn set_mode(&mut self, mode: RobotMode) {
        if self.mode == Some(mode) {
            return;
        }
        info!("Entering {} mode", mode);
        self.mode = Some(mode);
        match mode {
            RobotMode::Disabled => self.disabled_init(),
            RobotMode::Autonomous => self.autonomous_init(),
            RobotMode::Teleop => self.teleop_init(),
            RobotMode::Test => self.test_init(),
        }
    }

    /// Run one control period.
    pub fn periodic(&mut self) {
        match self.mode {
            Some(RobotMode::Disabled) => self.disabled_periodic(),
            Some(RobotMode::Autonomous) => self.autonomous_periodic(),
            Some(RobotMode::Teleop) => self.teleop_periodic(),
            Some(RobotMode::Test) => self.test_periodic(),
            None => {}
        }
        self.robot_periodic();
    }

    // ─── Callbacks ──────────────────────────────────────────────────

    /// Start-up: disable commands and start the driver camera.
    pub fn robot_init(&mut self) {
        info!("Starting robot initialization");

        self.scheduler.disable();

        if self.camera_config.enabled {
            if self
                .camera
                .setup_camera(&self.camera_config.name, self.camera_config.id)
            {
                info!("Default camera started");
            } else {
                warn!("Failed to start default camera!");
            }
        } else {
            debug!("Camera disabled in configuration");
        }

        info!("Robot initialization complete");
    }

    /// Runs every period in every mode: sensor feed, then operator control.
    pub fn robot_periodic(&mut self) {
        if let Some(feed) = &self.sensor_feed {
            feed.update();
        }
        let teleop = self.mode == Some(RobotMode::Teleop);
        if let Some(operator) = self.operator.as_mut() {
            operator.periodic_update(teleop);
        }
    }

    /// Entering disabled mode.
    pub fn disabled_init(&mut self) {
        self.cancel_autonomous();
        self.scheduler.disable();
    }

    /// Disabled period: poll the field for the plate assignment.
    pub fn disabled_periodic(&mut self) {
        self.update_plate_assignment();
    }

    /// Entering autonomous mode: refresh the plates and start the routine.
    pub fn autonomous_init(&mut self) {
        self.update_plate_assignment();
        self.scheduler.enable();
        self.start_autonomous();
    }

    /// Autonomous period.
    pub fn autonomous_periodic(&mut self) {
        self.scheduler.run();
    }

    /// Entering teleop mode.
    pub fn teleop_init(&mut self) {
        self.cancel_autonomous();
        self.scheduler.enable();
    }

    /// Teleop period.
    pub fn teleop_periodic(&mut self) {
        self.scheduler.run();
    }

    /// Entering test mode.
    pub fn test_init(&mut self) {
        self.cancel_autonomous();
        self.scheduler.enable();
    }

    /// Test period.
    pub fn test_periodic(&mut self) {}
}

impl fmt::Debug for Robot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Robot")
            .field("mode", &self.mode)
            .field("plate_assignment", &self.plate_assignment)
            .field("autonomous_command", &self.autonomous_command)
            .finish_non_exhaustive()
    }
}
