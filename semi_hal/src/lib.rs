//! # Semi HAL Library
//!
//! Hardware context, simulation drivers, subsystems and robot lifecycle for
//! the Semi robot.
//!
//! # Module Structure
//!
//! - [`context`] - `HardwareContext`, owner of the per-category port registries
//! - [`devices`] - Device categories stored by the registries
//! - [`drivers`] - Hardware layer implementations (simulation)
//! - [`subsystem`] - Drivetrain, ramp and sensors
//! - [`command`] - Drive, rotate and ramp commands for the scheduler
//! - [`auto`] - Autonomous routines
//! - [`operator`] - Gamepad driving and dashboard sensor feed
//! - [`robot`] - Mode state machine and lifecycle callbacks
//! - [`dashboard`] - Driver-station dashboard slots
//! - [`camera`] - Driver camera start-up
//! - [`sensor`] - Encoders and rangefinders
//! - [`game`] - FMS plate assignment
//! - [`input`], [`util`] - Operator input and numeric helpers
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    semi_hal (single crate)                 │
//! │  ┌───────────┐   ┌──────────────────┐   ┌───────────────┐  │
//! │  │ Subsystems│──►│ HardwareContext  │──►│ PortAllocator │  │
//! │  │ Robot     │   │ (7 registries)   │   │ (simulation)  │  │
//! │  └─────┬─────┘   └──────────────────┘   └───────────────┘  │
//! │        │                                                   │
//! │        ▼                                                   │
//! │  TaskScheduler / TelemetryStore / CaptureService /         │
//! │  DriverStation / Gamepad (semi_common::collab)             │
//! └────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod auto;
pub mod camera;
pub mod command;
pub mod context;
pub mod dashboard;
pub mod devices;
pub mod drivers;
pub mod game;
pub mod input;
pub mod operator;
pub mod robot;
pub mod sensor;
pub mod subsystem;
pub mod util;

// Re-export key types for convenience
pub use crate::auto::{AllianceSide, AutoDeliver};
pub use crate::camera::CameraSetup;
pub use crate::context::{HardwareContext, PortEntry, PortReport};
pub use crate::dashboard::{Dashboard, DashboardError};
pub use crate::operator::{OperatorControl, SensorFeed};
pub use crate::robot::{Robot, RobotMode};
pub use crate::subsystem::{Drivetrain, Ramp, Sensors};
