//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! for the robot.
//!
//! # Usage
//!
//! ```rust,no_run
//! use semi_common::config::{ConfigLoader, RobotConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RobotConfig::load(Path::new("robot.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::consts::{DEFAULT_CAMERA_ID, DEFAULT_CAMERA_NAME, SEMI_SERVICE_NAME};
use crate::device::Bus;
use crate::port::PortLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn default_service_name() -> String {
    SEMI_SERVICE_NAME.to_string()
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "semi-practice-bot"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// PWM port assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PwmPorts {
    /// Left drivetrain motor
    pub left_motor: u32,
    /// Right drivetrain motor
    pub right_motor: u32,
    /// Left intake roller
    pub left_intake: u32,
    /// Right intake roller
    pub right_intake: u32,
    /// Left ramp roller
    pub left_ramp: u32,
    /// Right ramp roller
    pub right_ramp: u32,
}

impl Default for PwmPorts {
    fn default() -> Self {
        Self {
            left_motor: 0,
            right_motor: 1,
            left_intake: 2,
            right_intake: 3,
            left_ramp: 4,
            right_ramp: 5,
        }
    }
}

/// Digital I/O port assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DioPorts {
    /// Left drive encoder, channel A
    pub left_encoder_a: u32,
    /// Left drive encoder, channel B
    pub left_encoder_b: u32,
    /// Right drive encoder, channel A
    pub right_encoder_a: u32,
    /// Right drive encoder, channel B
    pub right_encoder_b: u32,
}

impl Default for DioPorts {
    fn default() -> Self {
        Self {
            left_encoder_a: 0,
            left_encoder_b: 1,
            right_encoder_a: 2,
            right_encoder_b: 3,
        }
    }
}

/// Port assignments on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortMap {
    /// PWM header
    pub pwm: PwmPorts,
    /// Digital I/O header
    pub dio: DioPorts,
}

impl PortMap {
    /// Every assignment with its bus and name, for validation and logging.
    pub fn assignments(&self) -> [(Bus, &'static str, u32); 10] {
        [
            (Bus::Pwm, "left_motor", self.pwm.left_motor),
            (Bus::Pwm, "right_motor", self.pwm.right_motor),
            (Bus::Pwm, "left_intake", self.pwm.left_intake),
            (Bus::Pwm, "right_intake", self.pwm.right_intake),
            (Bus::Pwm, "left_ramp", self.pwm.left_ramp),
            (Bus::Pwm, "right_ramp", self.pwm.right_ramp),
            (Bus::Dio, "left_encoder_a", self.dio.left_encoder_a),
            (Bus::Dio, "left_encoder_b", self.dio.left_encoder_b),
            (Bus::Dio, "right_encoder_a", self.dio.right_encoder_a),
            (Bus::Dio, "right_encoder_b", self.dio.right_encoder_b),
        ]
    }
}

fn default_true() -> bool {
    true
}

fn default_camera_name() -> String {
    DEFAULT_CAMERA_NAME.to_string()
}

fn default_camera_id() -> u32 {
    DEFAULT_CAMERA_ID
}

/// Driver camera settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Start the camera during robot init.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Published stream name.
    #[serde(default = "default_camera_name")]
    pub name: String,
    /// USB device id.
    #[serde(default = "default_camera_id")]
    pub id: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: default_camera_name(),
            id: DEFAULT_CAMERA_ID,
        }
    }
}

/// Robot configuration loaded from `robot.toml`.
///
/// Every section is optional.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "semi"
///
/// [ports.pwm]
/// left_motor = 0
/// right_motor = 1
///
/// [limits]
/// pwm = 10
///
/// [camera]
/// enabled = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotConfig {
    /// Common fields.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Port assignments.
    #[serde(default)]
    pub ports: PortMap,
    /// Channel counts per bus.
    #[serde(default)]
    pub limits: PortLimits,
    /// Driver camera.
    #[serde(default)]
    pub camera: CameraConfig,
}

impl RobotConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `shared` is invalid
    /// - any port assignment is outside the configured limits
    /// - the camera name is empty while the camera is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        for (bus, name, port) in self.ports.assignments() {
            self.limits
                .check(bus, port)
                .map_err(|e| ConfigError::ValidationError(format!("ports.{name}: {e}")))?;
        }

        if self.camera.enabled && self.camera.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "camera.name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound) => {
                debug!("No configuration at {:?}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for any type implementing
/// `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading configuration from {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_log_level_deserialization() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct TestWrapper {
            level: LogLevel,
        }

        for (text, level) in [
            ("trace", LogLevel::Trace),
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warn", LogLevel::Warn),
            ("error", LogLevel::Error),
        ] {
            let parsed: TestWrapper = toml::from_str(&format!("level = \"{text}\"")).unwrap();
            assert_eq!(parsed.level, level);
        }
    }

    #[test]
    fn test_log_level_to_tracing() {
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert_eq!(tracing::Level::from(LogLevel::Trace), tracing::Level::TRACE);
    }

    #[test]
    fn test_shared_config_validation_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RobotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ports.pwm.left_motor, 0);
        assert_eq!(config.ports.pwm.right_motor, 1);
        assert_eq!(config.camera.name, "cam0");
    }

    #[test]
    fn test_port_outside_limits_rejected() {
        let mut config = RobotConfig::default();
        config.limits.pwm = 4;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ports.left_ramp"));
    }

    #[test]
    fn test_empty_camera_name_rejected_only_when_enabled() {
        let mut config = RobotConfig::default();
        config.camera.name.clear();
        assert!(config.validate().is_err());
        config.camera.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_loader_file_not_found() {
        let result = RobotConfig::load(Path::new("/nonexistent/path/robot.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = RobotConfig::load_or_default(Path::new("/nonexistent/path/robot.toml")).unwrap();
        assert_eq!(config.shared.service_name, SEMI_SERVICE_NAME);
    }

    #[test]
    fn test_config_loader_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = RobotConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_port_name_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[ports.pwm]
left_motr = 3
"#
        )
        .unwrap();
        file.flush().unwrap();

        assert!(matches!(
            RobotConfig::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_config_loader_success() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[shared]
log_level = "debug"
service_name = "practice-bot"

[ports.pwm]
left_motor = 8
right_motor = 9

[limits]
pwm = 10

[camera]
enabled = false
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = RobotConfig::load(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Debug);
        assert_eq!(config.shared.service_name, "practice-bot");
        assert_eq!(config.ports.pwm.left_motor, 8);
        assert_eq!(config.ports.pwm.left_intake, 2);
        assert_eq!(config.ports.dio, DioPorts::default());
        assert_eq!(config.limits.pwm, 10);
        assert!(!config.camera.enabled);
        assert!(config.validate().is_ok());
    }
}
