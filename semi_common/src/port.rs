//! Port identifiers, validation and configured limits.
//!
//! Single-channel devices are keyed by a plain `u32` port number. Solenoids
//! are keyed by [`SolenoidId`], a composite of pneumatics module, primary
//! channel and an optional secondary channel (double solenoids).
//!
//! Equality and hashing of [`SolenoidId`] are both derived from all three
//! fields, so equal identifiers always land in the same map bucket.

use crate::consts::{
    DEFAULT_ANALOG_INPUTS, DEFAULT_ANALOG_OUTPUTS, DEFAULT_DIO_CHANNELS, DEFAULT_PCM_MODULES,
    DEFAULT_PWM_CHANNELS, DEFAULT_RELAY_CHANNELS, DEFAULT_SOLENOID_CHANNELS,
};
use crate::device::Bus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Port identifier validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// Port number is past the last channel of its bus.
    #[error("{bus} port {port} out of range (0..{count})")]
    OutOfRange {
        /// Connector family
        bus: Bus,
        /// Requested port
        port: u32,
        /// Number of channels on the bus
        count: u32,
    },

    /// A double solenoid names the same channel twice.
    #[error("solenoid on module {module} uses channel {channel} for both directions")]
    DuplicateChannel {
        /// Pneumatics module id
        module: u32,
        /// Repeated channel
        channel: u32,
    },
}

/// Key type accepted by [`Registry`](crate::registry::Registry).
///
/// `validate` checks the identifier on its own, before the registry lock is
/// taken. Range checks that depend on configuration happen in the caller.
pub trait PortKey: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Reject malformed identifiers.
    fn validate(&self) -> Result<(), PortError> {
        Ok(())
    }
}

impl PortKey for u32 {}

/// Composite identifier for single and double solenoids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolenoidId {
    /// Pneumatics control module CAN id.
    pub module: u32,
    /// Channel of a single solenoid, forward channel of a double solenoid.
    pub primary: u32,
    /// Reverse channel of a double solenoid.
    pub secondary: Option<u32>,
}

impl SolenoidId {
    /// Identifier of a single-channel solenoid.
    pub const fn single(module: u32, channel: u32) -> Self {
        Self {
            module,
            primary: channel,
            secondary: None,
        }
    }

    /// Identifier of a double solenoid.
    pub const fn double(module: u32, forward: u32, reverse: u32) -> Self {
        Self {
            module,
            primary: forward,
            secondary: Some(reverse),
        }
    }

    /// True for double solenoids.
    pub const fn is_double(&self) -> bool {
        self.secondary.is_some()
    }

    /// All channels occupied on the module.
    pub fn channels(&self) -> impl Iterator<Item = u32> {
        std::iter::once(self.primary).chain(self.secondary)
    }
}

impl PortKey for SolenoidId {
    fn validate(&self) -> Result<(), PortError> {
        if self.secondary == Some(self.primary) {
            return Err(PortError::DuplicateChannel {
                module: self.module,
                channel: self.primary,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SolenoidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.secondary {
            Some(secondary) => write!(f, "pcm{}:{}/{}", self.module, self.primary, secondary),
            None => write!(f, "pcm{}:{}", self.module, self.primary),
        }
    }
}

fn default_pwm() -> u32 {
    DEFAULT_PWM_CHANNELS
}

fn default_dio() -> u32 {
    DEFAULT_DIO_CHANNELS
}

fn default_analog_inputs() -> u32 {
    DEFAULT_ANALOG_INPUTS
}

fn default_analog_outputs() -> u32 {
    DEFAULT_ANALOG_OUTPUTS
}

fn default_relay() -> u32 {
    DEFAULT_RELAY_CHANNELS
}

fn default_pcm_modules() -> u32 {
    DEFAULT_PCM_MODULES
}

fn default_solenoid_channels() -> u32 {
    DEFAULT_SOLENOID_CHANNELS
}

/// Number of channels available on each bus.
///
/// # TOML Example
///
/// ```toml
/// [limits]
/// pwm = 10        # no MXP board fitted
/// dio = 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortLimits {
    /// PWM channels
    #[serde(default = "default_pwm")]
    pub pwm: u32,
    /// Digital I/O channels
    #[serde(default = "default_dio")]
    pub dio: u32,
    /// Analog input channels
    #[serde(default = "default_analog_inputs")]
    pub analog_inputs: u32,
    /// Analog output channels
    #[serde(default = "default_analog_outputs")]
    pub analog_outputs: u32,
    /// Relay channels
    #[serde(default = "default_relay")]
    pub relay: u32,
    /// Pneumatics control module ids
    #[serde(default = "default_pcm_modules")]
    pub pcm_modules: u32,
    /// Solenoid channels per module
    #[serde(default = "default_solenoid_channels")]
    pub solenoid_channels: u32,
}

impl Default for PortLimits {
    fn default() -> Self {
        Self {
            pwm: DEFAULT_PWM_CHANNELS,
            dio: DEFAULT_DIO_CHANNELS,
            analog_inputs: DEFAULT_ANALOG_INPUTS,
            analog_outputs: DEFAULT_ANALOG_OUTPUTS,
            relay: DEFAULT_RELAY_CHANNELS,
            pcm_modules: DEFAULT_PCM_MODULES,
            solenoid_channels: DEFAULT_SOLENOID_CHANNELS,
        }
    }
}

impl PortLimits {
    /// Channel count configured for `bus`.
    pub const fn count(&self, bus: Bus) -> u32 {
        match bus {
            Bus::Pwm => self.pwm,
            Bus::Dio => self.dio,
            Bus::AnalogInput => self.analog_inputs,
            Bus::AnalogOutput => self.analog_outputs,
            Bus::Relay => self.relay,
            Bus::Pcm => self.pcm_modules,
            Bus::Solenoid => self.solenoid_channels,
        }
    }

    /// Check that `port` exists on `bus`.
    pub fn check(&self, bus: Bus, port: u32) -> Result<u32, PortError> {
        let count = self.count(bus);
        if port >= count {
            return Err(PortError::OutOfRange { bus, port, count });
        }
        Ok(port)
    }

    /// Check every part of a solenoid identifier.
    pub fn check_solenoid(&self, id: &SolenoidId) -> Result<(), PortError> {
        self.check(Bus::Pcm, id.module)?;
        for channel in id.channels() {
            self.check(Bus::Solenoid, channel)?;
        }
        Ok(())
    }
}
