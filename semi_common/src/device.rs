//! Hardware buses and driver-layer error types.
//!
//! This module defines:
//! - `Bus` enum - The physical connector family a port belongs to
//! - `DeviceError` enum - Failures raised while constructing a device

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Physical connector family of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bus {
    /// PWM header (motor controllers, servos)
    Pwm,
    /// Digital I/O header
    Dio,
    /// Analog input header
    AnalogInput,
    /// Analog output (MXP)
    AnalogOutput,
    /// Spike relay header
    Relay,
    /// Pneumatics control module on CAN
    Pcm,
    /// Solenoid channel on a pneumatics control module
    Solenoid,
}

impl Bus {
    /// Short lowercase name used in log lines and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pwm => "pwm",
            Self::Dio => "dio",
            Self::AnalogInput => "ai",
            Self::AnalogOutput => "ao",
            Self::Relay => "relay",
            Self::Pcm => "pcm",
            Self::Solenoid => "solenoid",
        }
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by the hardware layer while constructing a device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The channel is already bound to another device object.
    #[error("{bus} channel {channel} is already allocated")]
    AlreadyAllocated {
        /// Connector family
        bus: Bus,
        /// Channel number on that bus
        channel: u32,
    },

    /// The hardware layer refused to open the channel.
    #[error("{bus} channel {channel} rejected by hardware layer: {reason}")]
    Rejected {
        /// Connector family
        bus: Bus,
        /// Channel number on that bus
        channel: u32,
        /// Driver supplied reason
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display() {
        let err = DeviceError::AlreadyAllocated {
            bus: Bus::Pwm,
            channel: 3,
        };
        assert_eq!(err.to_string(), "pwm channel 3 is already allocated");

        let err = DeviceError::Rejected {
            bus: Bus::Solenoid,
            channel: 7,
            reason: "module offline".to_string(),
        };
        assert!(err.to_string().contains("module offline"));
    }

    #[test]
    fn test_bus_serde_names() {
        #[derive(Serialize)]
        struct Wrapper {
            bus: Bus,
        }
        let out = toml::to_string(&Wrapper {
            bus: Bus::AnalogInput,
        })
        .unwrap();
        assert!(out.contains("analog_input"));
    }
}
