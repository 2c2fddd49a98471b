//! Interfaces of externally owned collaborators.
//!
//! The robot runs on top of services it does not own: the command scheduler
//! and its commands, the driver-station telemetry panel, the camera server,
//! the field management data feed and the driver gamepad. This module
//! defines them at their boundary only.
//! In-process stand-ins live in `semi_hal::drivers::simulation`.
//!
//! All methods take `&self`; implementations are shared between subsystems
//! behind `Arc` and synchronize internally.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Error reported by a [`CaptureService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The capture service is not running.
    #[error("capture service unavailable")]
    Unavailable,

    /// No camera is attached under the requested id.
    #[error("no camera '{name}' with id {id}")]
    DeviceNotFound {
        /// Stream name
        name: String,
        /// Device id
        id: u32,
    },

    /// The service accepted the request but failed to start the stream.
    #[error("capture failed: {0}")]
    Failed(String),
}

// ─── Commands ───────────────────────────────────────────────────────

/// Unit of robot behaviour run by a [`TaskScheduler`].
///
/// The scheduler calls `initialize` once before the first `execute`, then
/// `execute` once per pass until `is_finished` returns true or the command
/// is cancelled, and finally `end`. `end` is only called on commands that
/// were initialized.
pub trait Command: Send {
    /// Name used in log messages.
    fn name(&self) -> &str {
        "command"
    }

    /// Called once before the first `execute`.
    fn initialize(&mut self) {}

    /// One pass. `period` is the time since the previous pass.
    fn execute(&mut self, period: Duration);

    /// True once the command is done.
    fn is_finished(&self) -> bool {
        false
    }

    /// Called once after the command finished or was cancelled.
    fn end(&mut self) {}
}

#[derive(Debug, Default)]
struct HandleState {
    cancel_requested: AtomicBool,
    finished: AtomicBool,
}

/// Handle to a scheduled command.
#[derive(Clone, Default)]
pub struct CommandHandle {
    state: Arc<HandleState>,
}

impl CommandHandle {
    /// Fresh handle for a command about to be scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for the command to be cancelled.
    pub fn request_cancel(&self) {
        self.state.cancel_requested.store(true, Ordering::Release);
    }

    /// True once cancellation was requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.state.cancel_requested.load(Ordering::Acquire)
    }

    /// Record that the command has ended (finished or cancelled).
    pub fn mark_finished(&self) {
        self.state.finished.store(true, Ordering::Release);
    }

    /// True once the command has ended.
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::Acquire)
    }

    /// True if both handles refer to the same scheduled command.
    pub fn same_command(&self, other: &CommandHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandle")
            .field("cancel_requested", &self.is_cancel_requested())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Periodic command scheduler driven by the robot lifecycle.
pub trait TaskScheduler: Send + Sync {
    /// Allow commands to run.
    fn enable(&self);

    /// Stop running commands.
    fn disable(&self);

    /// Execute one scheduling pass.
    fn run(&self);

    /// Add a command. It starts on the next pass while enabled.
    fn schedule(&self, command: Box<dyn Command>) -> CommandHandle;

    /// Cancel a scheduled command, running its `end` if it was started.
    /// Takes effect immediately, also while disabled.
    fn cancel(&self, handle: &CommandHandle);
}

/// String-keyed telemetry store shown on the driver station.
pub trait TelemetryStore: Send + Sync {
    /// Read a string entry, or `default` if absent.
    fn get_string(&self, key: &str, default: Option<&str>) -> Option<String>;

    /// Write a string entry.
    fn put_string(&self, key: &str, value: &str);

    /// Read a boolean entry, or `default` if absent.
    fn get_boolean(&self, key: &str, default: bool) -> bool;

    /// Write a boolean entry.
    fn put_boolean(&self, key: &str, value: bool);

    /// Read a numeric entry, or `default` if absent.
    fn get_number(&self, key: &str, default: f64) -> f64;

    /// Write a numeric entry.
    fn put_number(&self, key: &str, value: f64);
}

/// Camera stream service.
pub trait CaptureService: Send + Sync {
    /// Start automatic capture for camera `id`, published as `name`.
    fn start_capture(&self, name: &str, id: u32) -> Result<(), CaptureError>;
}

/// Snapshot of the driver's gamepad.
///
/// Stick axes are `-1.0..=1.0` with positive X to the right and positive Y
/// towards the driver (pulled back). Triggers are `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadState {
    /// Left stick X
    pub left_x: f64,
    /// Left stick Y
    pub left_y: f64,
    /// Left trigger
    pub left_trigger: f64,
    /// Right trigger
    pub right_trigger: f64,
    /// A button
    pub a: bool,
    /// B button
    pub b: bool,
    /// X button
    pub x: bool,
    /// Y button
    pub y: bool,
}

/// Driver gamepad as relayed by the driver station.
pub trait Gamepad: Send + Sync {
    /// Current stick, trigger and button state.
    fn state(&self) -> GamepadState;
}

/// Field management data as relayed by the driver station.
pub trait DriverStation: Send + Sync {
    /// Game-specific message for the current match, if one was sent.
    fn game_specific_message(&self) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_handle_state() {
        let handle = CommandHandle::new();
        let copy = handle.clone();
        assert!(handle.same_command(&copy));
        assert!(!handle.same_command(&CommandHandle::new()));

        copy.request_cancel();
        assert!(handle.is_cancel_requested());
        assert!(!handle.is_finished());
        copy.mark_finished();
        assert!(handle.is_finished());
    }

    #[test]
    fn test_capture_error_display() {
        let err = CaptureError::DeviceNotFound {
            name: "cam0".to_string(),
            id: 0,
        };
        assert_eq!(err.to_string(), "no camera 'cam0' with id 0");
        assert_eq!(
            CaptureError::Failed("usb reset".to_string()).to_string(),
            "capture failed: usb reset"
        );
    }
}
