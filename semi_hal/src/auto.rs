//! Autonomous routines.
//!
//! [`AutoDeliver`] drives from the robot's starting position to the lit side
//! of the near switch and, when the switch is reachable from there, runs the
//! ramp to deliver the cube.
//!
//! ```text
//!            far switch
//!              scale
//!         [L] near switch [R]
//!
//!     Left      Centre      Right     <- starting positions
//! ```

use crate::command::{DriveStraightCommand, RampMotorCommand, RotateCommand, Sequence};
use crate::dashboard::keys;
use crate::drivers::simulation::Gyro;
use crate::game::{PlateAssignment, PlateSide};
use crate::subsystem::{Drivetrain, Ramp};
use crate::util::ValueGradient;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Starting position along the alliance wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllianceSide {
    /// Left of the driver stations
    Left,
    /// Middle station
    #[default]
    Centre,
    /// Right of the driver stations
    Right,
}

impl AllianceSide {
    /// Label of this option in the dashboard autonomous chooser.
    pub const fn chooser_label(self) -> &'static str {
        match self {
            Self::Left => keys::AUTO_LEFT,
            Self::Centre => keys::AUTO_CENTRE,
            Self::Right => keys::AUTO_RIGHT,
        }
    }

    /// Side selected by a chooser label.
    pub fn from_chooser(label: &str) -> Option<Self> {
        [Self::Left, Self::Centre, Self::Right]
            .into_iter()
            .find(|side| side.chooser_label() == label)
    }
}

impl fmt::Display for AllianceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Left => "left",
            Self::Centre => "centre",
            Self::Right => "right",
        };
        f.write_str(s)
    }
}

impl FromStr for AllianceSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "centre" | "center" | "c" => Ok(Self::Centre),
            "right" | "r" => Ok(Self::Right),
            other => Err(format!("unknown alliance side '{other}', expected left, centre or right")),
        }
    }
}

/// One leg of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leg {
    /// Drive straight, metres
    Drive(f64),
    /// Turn in place, degrees clockwise
    Rotate(f64),
}

/// Drive to the near switch and deliver.
#[derive(Debug, Clone)]
pub struct AutoDeliver {
    side: AllianceSide,
    throttle: f64,
    turn_gradient: Option<ValueGradient>,
    deliver: bool,
}

impl AutoDeliver {
    /// Drive throttle unless set otherwise.
    pub const DEFAULT_THROTTLE: f64 = 0.6;
    /// Ramp speed while delivering.
    pub const DELIVER_SPEED: f64 = 1.0;
    /// How long the ramp runs to deliver.
    pub const DELIVER_TIME: Duration = Duration::from_secs(1);

    /// Routine starting from `side`.
    pub fn new(side: AllianceSide) -> Self {
        Self {
            side,
            throttle: Self::DEFAULT_THROTTLE,
            turn_gradient: None,
            deliver: true,
        }
    }

    /// Drive throttle for the straight legs.
    pub fn with_throttle(mut self, throttle: f64) -> Self {
        self.throttle = throttle;
        self
    }

    /// Turn speed profile for the rotate legs.
    pub fn with_turn_gradient(mut self, gradient: ValueGradient) -> Self {
        self.turn_gradient = Some(gradient);
        self
    }

    /// Drive the route only, never run the ramp.
    pub fn without_delivery(mut self) -> Self {
        self.deliver = false;
        self
    }

    /// Starting position.
    pub fn side(&self) -> AllianceSide {
        self.side
    }

    /// True if the routine ends next to the lit plate. A side start cannot
    /// reach the far side of the switch, and an unknown plate is never
    /// delivered to.
    pub fn can_deliver(&self, plate: PlateSide) -> bool {
        self.deliver
            && match (self.side, plate) {
                (_, PlateSide::Invalid) => false,
                (AllianceSide::Left, PlateSide::Right) | (AllianceSide::Right, PlateSide::Left) => false,
                _ => true,
            }
    }

    /// Legs driven for a lit near-switch plate on `plate`.
    pub fn route(&self, plate: PlateSide) -> Vec<Leg> {
        match self.side {
            AllianceSide::Centre if plate == PlateSide::Left => vec![
                Leg::Drive(0.6),
                Leg::Rotate(-45.0),
                Leg::Drive(2.8),
                Leg::Rotate(45.0),
                Leg::Drive(0.6),
            ],
            AllianceSide::Centre => vec![
                Leg::Drive(1.3),
                Leg::Rotate(45.0),
                Leg::Drive(0.8),
                Leg::Rotate(-45.0),
                Leg::Drive(1.3),
            ],
            AllianceSide::Left | AllianceSide::Right => {
                let sign = if plate == PlateSide::Left { -1.0 } else { 1.0 };
                vec![
                    Leg::Drive(1.1),
                    Leg::Rotate(-sign * 45.0),
                    Leg::Drive(1.6),
                    Leg::Rotate(sign * 45.0),
                    Leg::Drive(1.1),
                ]
            }
        }
    }

    /// Command for the received plate assignment.
    pub fn build(
        &self,
        plates: &PlateAssignment,
        drivetrain: &Arc<Drivetrain>,
        gyro: &Arc<Gyro>,
        ramp: &Arc<Ramp>,
    ) -> Sequence {
        let plate = plates.nearest();
        let deliver = self.can_deliver(plate);
        info!(
            "Autonomous from {} side, near switch {:?}, deliver: {}",
            self.side, plate, deliver
        );

        let mut sequence = Sequence::new(format!("auto deliver ({})", self.side));
        for leg in self.route(plate) {
            sequence = match leg {
                Leg::Drive(distance) => sequence.then(DriveStraightCommand::new(
                    Arc::clone(drivetrain),
                    Arc::clone(gyro),
                    distance,
                    self.throttle,
                )),
                Leg::Rotate(degrees) => {
                    let mut rotate = RotateCommand::new(
                        Arc::clone(drivetrain),
                        Arc::clone(gyro),
                        degrees,
                        RotateCommand::DEFAULT_SPEED,
                    );
                    if let Some(gradient) = self.turn_gradient {
                        rotate = rotate.with_gradient(gradient);
                    }
                    sequence.then(rotate)
                }
            };
        }
        if deliver {
            sequence = sequence.then(RampMotorCommand::new(
                Arc::clone(ramp),
                Self::DELIVER_SPEED,
                Self::DELIVER_TIME,
            ));
        }
        sequence
    }
}
