//! Simulated pneumatics: compressor, single and double solenoids.

use super::allocator::{Channel, PortAllocator};
use parking_lot::Mutex;
use semi_common::device::{Bus, DeviceError};
use semi_common::port::SolenoidId;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Compressor driven by a pneumatics control module.
#[derive(Debug)]
pub struct Compressor {
    module: u32,
    closed_loop: AtomicBool,
    running: AtomicBool,
}

impl Compressor {
    /// Open the compressor output of `module`.
    pub fn open(allocator: &PortAllocator, module: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on(Bus::Pcm, module))?;
        Ok(Self {
            module,
            closed_loop: AtomicBool::new(true),
            running: AtomicBool::new(false),
        })
    }

    /// Pneumatics module id.
    pub fn module(&self) -> u32 {
        self.module
    }

    /// Enable or disable pressure-switch control.
    pub fn set_closed_loop_control(&self, enabled: bool) {
        self.closed_loop.store(enabled, Ordering::Release);
        if !enabled {
            self.running.store(false, Ordering::Release);
        }
    }

    /// True if the compressor follows the pressure switch.
    pub fn closed_loop_control(&self) -> bool {
        self.closed_loop.load(Ordering::Acquire)
    }

    /// Feed the simulated pressure switch. The compressor runs while the
    /// switch reports low pressure and closed-loop control is on.
    pub fn set_simulated_pressure_low(&self, low: bool) {
        self.running
            .store(low && self.closed_loop_control(), Ordering::Release);
    }

    /// True while the compressor motor is running.
    pub fn enabled(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Single-channel solenoid.
#[derive(Debug)]
pub struct Solenoid {
    id: SolenoidId,
    on: AtomicBool,
}

impl Solenoid {
    /// Open `channel` on pneumatics `module`.
    pub fn open(allocator: &PortAllocator, module: u32, channel: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on_module(Bus::Solenoid, module, channel))?;
        Ok(Self {
            id: SolenoidId::single(module, channel),
            on: AtomicBool::new(false),
        })
    }

    /// Identifier of the occupied channel.
    pub fn id(&self) -> SolenoidId {
        self.id
    }

    /// Energize or release the valve.
    pub fn set(&self, on: bool) {
        self.on.store(on, Ordering::Release);
    }

    /// True while energized.
    pub fn get(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }
}

/// Position of a double solenoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoubleSolenoidValue {
    /// Both coils released.
    #[default]
    Off,
    /// Forward coil energized.
    Forward,
    /// Reverse coil energized.
    Reverse,
}

/// Two-channel solenoid.
#[derive(Debug)]
pub struct DoubleSolenoid {
    id: SolenoidId,
    value: Mutex<DoubleSolenoidValue>,
}

impl DoubleSolenoid {
    /// Open `forward` and `reverse` on pneumatics `module`.
    pub fn open(
        allocator: &PortAllocator,
        module: u32,
        forward: u32,
        reverse: u32,
    ) -> Result<Self, DeviceError> {
        allocator.allocate_all(&[
            Channel::on_module(Bus::Solenoid, module, forward),
            Channel::on_module(Bus::Solenoid, module, reverse),
        ])?;
        Ok(Self {
            id: SolenoidId::double(module, forward, reverse),
            value: Mutex::new(DoubleSolenoidValue::Off),
        })
    }

    /// Identifier of the occupied channels.
    pub fn id(&self) -> SolenoidId {
        self.id
    }

    /// Move the valve.
    pub fn set(&self, value: DoubleSolenoidValue) {
        *self.value.lock() = value;
    }

    /// Current valve position.
    pub fn get(&self) -> DoubleSolenoidValue {
        *self.value.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressor_follows_pressure_switch() {
        let alloc = PortAllocator::new();
        let c = Compressor::open(&alloc, 0).unwrap();
        assert!(!c.enabled());
        c.set_simulated_pressure_low(true);
        assert!(c.enabled());
        c.set_closed_loop_control(false);
        assert!(!c.enabled());
        c.set_simulated_pressure_low(true);
        assert!(!c.enabled());
    }

    #[test]
    fn test_double_solenoid_claims_both_channels() {
        let alloc = PortAllocator::new();
        let ds = DoubleSolenoid::open(&alloc, 0, 2, 3).unwrap();
        assert_eq!(ds.id(), SolenoidId::double(0, 2, 3));
        assert!(Solenoid::open(&alloc, 0, 3).is_err());
        assert!(Solenoid::open(&alloc, 1, 3).is_ok());

        ds.set(DoubleSolenoidValue::Reverse);
        assert_eq!(ds.get(), DoubleSolenoidValue::Reverse);
    }
}
