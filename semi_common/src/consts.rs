//! System-wide constants.
//!
//! Default channel counts match the roboRIO (onboard plus MXP expansion).

/// Canonical service name (used for logging).
pub const SEMI_SERVICE_NAME: &str = "semi_hal";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/semi/robot.toml";

/// PWM channels (10 onboard + 10 MXP)
pub const DEFAULT_PWM_CHANNELS: u32 = 20;

/// Digital I/O channels (10 onboard + 16 MXP)
pub const DEFAULT_DIO_CHANNELS: u32 = 26;

/// Analog input channels (4 onboard + 4 MXP)
pub const DEFAULT_ANALOG_INPUTS: u32 = 8;

/// Analog output channels (MXP only)
pub const DEFAULT_ANALOG_OUTPUTS: u32 = 2;

/// Relay channels
pub const DEFAULT_RELAY_CHANNELS: u32 = 4;

/// Pneumatics control module CAN ids
pub const DEFAULT_PCM_MODULES: u32 = 63;

/// Solenoid channels per pneumatics control module
pub const DEFAULT_SOLENOID_CHANNELS: u32 = 8;

/// Pneumatics module used when a caller does not name one.
pub const DEFAULT_PCM_MODULE: u32 = 0;

/// Default camera stream name.
pub const DEFAULT_CAMERA_NAME: &str = "cam0";

/// Default camera device id.
pub const DEFAULT_CAMERA_ID: u32 = 0;

/// Default periodic callback interval in milliseconds.
pub const DEFAULT_PERIOD_MS: u64 = 20;
