//! Robot commands run by the scheduler.
//!
//! - [`DriveStraightCommand`] - drive a distance holding the starting heading
//! - [`RotateCommand`] - turn in place by a heading change
//! - [`RampMotorCommand`] - run the ramp rollers for a fixed time
//! - [`Sequence`] - run commands one after another
//!
//! Time is counted in scheduler periods, so a command's timeout follows the
//! simulated clock and not the wall clock.

use crate::drivers::simulation::Gyro;
use crate::subsystem::{Drivetrain, Ramp};
use crate::util::{ValueGradient, clamp, is_equal};
use semi_common::collab::Command;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Proportional heading correction, output per degree of error.
pub const GYRO_CORRECTION: f64 = 0.025;

// ─── Drive straight ─────────────────────────────────────────────────

/// Drive `distance` metres (negative for backwards) at a fixed throttle,
/// steering back onto the heading held when the command started.
#[derive(Debug)]
pub struct DriveStraightCommand {
    drivetrain: Arc<Drivetrain>,
    gyro: Arc<Gyro>,
    distance: f64,
    throttle: f64,
    initial_heading: f64,
    start_distance: f64,
}

impl DriveStraightCommand {
    /// `throttle` is taken as a magnitude and capped at 1.
    pub fn new(drivetrain: Arc<Drivetrain>, gyro: Arc<Gyro>, distance: f64, throttle: f64) -> Self {
        Self {
            drivetrain,
            gyro,
            distance,
            throttle: throttle.abs().min(1.0),
            initial_heading: 0.0,
            start_distance: 0.0,
        }
    }

    fn travelled(&self) -> f64 {
        self.drivetrain.distance() - self.start_distance
    }
}

impl Command for DriveStraightCommand {
    fn name(&self) -> &str {
        "drive straight"
    }

    fn initialize(&mut self) {
        self.initial_heading = self.gyro.angle();
        self.start_distance = self.drivetrain.distance();
        debug!(
            "Driving {:.2} m at {:.2}, holding {:.1} deg",
            self.distance, self.throttle, self.initial_heading
        );
    }

    fn execute(&mut self, _period: Duration) {
        let error = self.gyro.angle() - self.initial_heading;
        self.drivetrain.curvature_drive(
            self.throttle.copysign(self.distance),
            -error * GYRO_CORRECTION,
            false,
        );
    }

    fn is_finished(&self) -> bool {
        self.throttle == 0.0 || self.travelled().abs() >= self.distance.abs()
    }

    fn end(&mut self) {
        self.drivetrain.stop_motor();
    }
}

// ─── Rotate ─────────────────────────────────────────────────────────

/// Turn in place by a heading change (degrees, clockwise positive).
///
/// Finishes within [`ANGLE_TOLERANCE`](Self::ANGLE_TOLERANCE) of the target,
/// once the heading passes the target, or after
/// [`TIMEOUT`](Self::TIMEOUT).
#[derive(Debug)]
pub struct RotateCommand {
    drivetrain: Arc<Drivetrain>,
    gyro: Arc<Gyro>,
    heading_change: f64,
    throttle: f64,
    gradient: Option<ValueGradient>,
    target: f64,
    elapsed: Duration,
}

impl RotateCommand {
    /// Turn throttle when none is given.
    pub const DEFAULT_SPEED: f64 = 0.35;
    /// Degrees either side of the target that count as done.
    pub const ANGLE_TOLERANCE: f64 = 4.0;
    /// Give up after this long.
    pub const TIMEOUT: Duration = Duration::from_secs(5);

    /// Turn by `heading_change` at a fixed `throttle` (magnitude, capped at 1).
    pub fn new(drivetrain: Arc<Drivetrain>, gyro: Arc<Gyro>, heading_change: f64, throttle: f64) -> Self {
        Self {
            drivetrain,
            gyro,
            heading_change,
            throttle: clamp(throttle.abs(), 0.0, 1.0),
            gradient: None,
            target: 0.0,
            elapsed: Duration::ZERO,
        }
    }

    /// Slow down towards the target: throttle follows `gradient` over the
    /// degrees remaining.
    pub fn with_gradient(mut self, gradient: ValueGradient) -> Self {
        self.gradient = Some(gradient);
        self
    }

    fn current_throttle(&self) -> f64 {
        match &self.gradient {
            Some(gradient) => gradient.interpolate((self.target - self.gyro.angle()).abs()),
            None => self.throttle,
        }
    }

    fn overshot(&self, angle: f64) -> bool {
        if self.heading_change >= 0.0 {
            angle > self.target
        } else {
            angle < self.target
        }
    }
}

impl Command for RotateCommand {
    fn name(&self) -> &str {
        "rotate"
    }

    fn initialize(&mut self) {
        self.target = self.gyro.angle() + self.heading_change;
        self.elapsed = Duration::ZERO;
        debug!("Rotating {:+.1} deg to {:.1}", self.heading_change, self.target);
    }

    fn execute(&mut self, period: Duration) {
        self.elapsed += period;
        let throttle = self.current_throttle();
        self.drivetrain
            .curvature_drive(0.0, throttle.copysign(self.heading_change), true);
    }

    fn is_finished(&self) -> bool {
        let angle = self.gyro.angle();
        is_equal(angle, self.target, Self::ANGLE_TOLERANCE)
            || self.overshot(angle)
            || self.elapsed >= Self::TIMEOUT
    }

    fn end(&mut self) {
        if self.elapsed >= Self::TIMEOUT {
            info!(
                "Rotate timed out at {:.1} deg, target {:.1}",
                self.gyro.angle(),
                self.target
            );
        }
        self.drivetrain.curvature_drive(0.0, 0.0, true);
    }
}

// ─── Ramp ───────────────────────────────────────────────────────────

/// Run the ramp rollers at a fixed speed for `duration`, then stop them.
#[derive(Debug)]
pub struct RampMotorCommand {
    ramp: Arc<Ramp>,
    speed: f64,
    duration: Duration,
    elapsed: Duration,
}

impl RampMotorCommand {
    /// `speed` is clamped to `-1..=1`.
    pub fn new(ramp: Arc<Ramp>, speed: f64, duration: Duration) -> Self {
        Self {
            ramp,
            speed: clamp(speed, -1.0, 1.0),
            duration,
            elapsed: Duration::ZERO,
        }
    }
}

impl Command for RampMotorCommand {
    fn name(&self) -> &str {
        "ramp motor"
    }

    fn initialize(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn execute(&mut self, period: Duration) {
        self.elapsed += period;
        self.ramp.set_speed(self.speed);
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn end(&mut self) {
        self.ramp.stop_motors();
    }
}

// ─── Sequence ───────────────────────────────────────────────────────

/// Commands run one after another. The next one starts on the pass after
/// the previous one finished.
pub struct Sequence {
    name: String,
    steps: VecDeque<Box<dyn Command>>,
    started: bool,
}

impl Sequence {
    /// Empty sequence.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: VecDeque::new(),
            started: false,
        }
    }

    /// Append a step.
    pub fn then(mut self, step: impl Command + 'static) -> Self {
        self.steps.push_back(Box::new(step));
        self
    }

    /// Steps not yet finished, including the running one.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Name of the running (or next) step.
    pub fn current_step(&self) -> Option<&str> {
        self.steps.front().map(|step| step.name())
    }
}

impl Command for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, period: Duration) {
        let Some(step) = self.steps.front_mut() else {
            return;
        };
        if !self.started {
            step.initialize();
            self.started = true;
        }
        step.execute(period);
        if step.is_finished() {
            step.end();
            debug!("{}: step '{}' done", self.name, step.name());
            self.steps.pop_front();
            self.started = false;
        }
    }

    fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    fn end(&mut self) {
        if self.started {
            if let Some(step) = self.steps.front_mut() {
                step.end();
            }
            self.started = false;
        }
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name)
            .field("remaining", &self.steps.len())
            .field("started", &self.started)
            .finish()
    }
}
