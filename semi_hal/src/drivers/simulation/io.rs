//! Simulated digital, analog and relay channels.
//!
//! Inputs expose `set_simulated_*` hooks so tests and the simulation loop can
//! drive what the robot code reads.

use super::allocator::{Channel, PortAllocator};
use crate::util::clamp;
use parking_lot::Mutex;
use semi_common::device::{Bus, DeviceError};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Full-scale voltage of the analog converters.
pub const ANALOG_FULL_SCALE_V: f64 = 5.0;

/// Digital input channel.
#[derive(Debug)]
pub struct DigitalInput {
    channel: u32,
    value: AtomicBool,
}

impl DigitalInput {
    /// Open DIO `channel` as an input.
    pub fn open(allocator: &PortAllocator, channel: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on(Bus::Dio, channel))?;
        Ok(Self {
            channel,
            value: AtomicBool::new(false),
        })
    }

    /// DIO channel.
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Current input level.
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    /// Drive the simulated input level.
    pub fn set_simulated(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }
}

/// Digital output channel.
#[derive(Debug)]
pub struct DigitalOutput {
    channel: u32,
    value: AtomicBool,
}

impl DigitalOutput {
    /// Open DIO `channel` as an output.
    pub fn open(allocator: &PortAllocator, channel: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on(Bus::Dio, channel))?;
        Ok(Self {
            channel,
            value: AtomicBool::new(false),
        })
    }

    /// DIO channel.
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Set the output level.
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }

    /// Last written output level.
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }
}

/// Analog input channel.
#[derive(Debug)]
pub struct AnalogInput {
    channel: u32,
    voltage: Mutex<f64>,
}

impl AnalogInput {
    /// Open analog input `channel`.
    pub fn open(allocator: &PortAllocator, channel: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on(Bus::AnalogInput, channel))?;
        Ok(Self {
            channel,
            voltage: Mutex::new(0.0),
        })
    }

    /// Analog channel.
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Instantaneous voltage.
    pub fn voltage(&self) -> f64 {
        *self.voltage.lock()
    }

    /// Oversampled voltage. The simulation has no noise, so this equals
    /// [`voltage`](Self::voltage).
    pub fn average_voltage(&self) -> f64 {
        self.voltage()
    }

    /// Drive the simulated input voltage (clamped to the converter range).
    pub fn set_simulated_voltage(&self, volts: f64) {
        *self.voltage.lock() = clamp(volts, 0.0, ANALOG_FULL_SCALE_V);
    }
}

/// Analog output channel.
#[derive(Debug)]
pub struct AnalogOutput {
    channel: u32,
    voltage: Mutex<f64>,
}

impl AnalogOutput {
    /// Open analog output `channel`.
    pub fn open(allocator: &PortAllocator, channel: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on(Bus::AnalogOutput, channel))?;
        Ok(Self {
            channel,
            voltage: Mutex::new(0.0),
        })
    }

    /// Analog channel.
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Set the output voltage (clamped to the converter range).
    pub fn set_voltage(&self, volts: f64) {
        *self.voltage.lock() = clamp(volts, 0.0, ANALOG_FULL_SCALE_V);
    }

    /// Last written voltage.
    pub fn voltage(&self) -> f64 {
        *self.voltage.lock()
    }
}

/// State of a Spike relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayValue {
    /// Both outputs off.
    #[default]
    Off,
    /// Both outputs on.
    On,
    /// Forward output on.
    Forward,
    /// Reverse output on.
    Reverse,
}

/// Spike relay channel.
#[derive(Debug)]
pub struct Relay {
    channel: u32,
    value: Mutex<RelayValue>,
}

impl Relay {
    /// Open relay `channel`.
    pub fn open(allocator: &PortAllocator, channel: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on(Bus::Relay, channel))?;
        Ok(Self {
            channel,
            value: Mutex::new(RelayValue::Off),
        })
    }

    /// Relay channel.
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Set relay state.
    pub fn set(&self, value: RelayValue) {
        *self.value.lock() = value;
    }

    /// Current relay state.
    pub fn get(&self) -> RelayValue {
        *self.value.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digital_input_and_output_share_dio_channels() {
        let alloc = PortAllocator::new();
        let input = DigitalInput::open(&alloc, 4).unwrap();
        assert!(DigitalOutput::open(&alloc, 4).is_err());

        assert!(!input.get());
        input.set_simulated(true);
        assert!(input.get());
    }

    #[test]
    fn test_analog_voltage_clamped() {
        let alloc = PortAllocator::new();
        let ai = AnalogInput::open(&alloc, 0).unwrap();
        ai.set_simulated_voltage(7.5);
        assert_eq!(ai.average_voltage(), ANALOG_FULL_SCALE_V);

        let ao = AnalogOutput::open(&alloc, 0).unwrap();
        ao.set_voltage(-1.0);
        assert_eq!(ao.voltage(), 0.0);
    }

    #[test]
    fn test_relay_states() {
        let alloc = PortAllocator::new();
        let relay = Relay::open(&alloc, 1).unwrap();
        assert_eq!(relay.get(), RelayValue::Off);
        relay.set(RelayValue::Forward);
        assert_eq!(relay.get(), RelayValue::Forward);
    }
}
