//! Prelude module for common re-exports.
//!
//! ```rust
//! use semi_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, RobotConfig, SharedConfig};

// ─── Ports & registry ───────────────────────────────────────────────
pub use crate::device::{Bus, DeviceError};
pub use crate::port::{PortError, PortKey, PortLimits, SolenoidId};
pub use crate::registry::{Kind, Member, Registry, RegistryError, Resource};

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::collab::{
    CaptureError, CaptureService, Command, CommandHandle, DriverStation, Gamepad, GamepadState,
    TaskScheduler, TelemetryStore,
};

/// Default periodic callback interval as Duration.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(crate::consts::DEFAULT_PERIOD_MS);
