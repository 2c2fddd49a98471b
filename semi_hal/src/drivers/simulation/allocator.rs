//! Simulated hardware channel table.
//!
//! Mirrors the driver layer's own bookkeeping: every physical channel can be
//! opened once. Opening it again fails with `DeviceError::AlreadyAllocated`,
//! which is exactly the failure the port registry exists to avoid.

use parking_lot::Mutex;
use semi_common::device::{Bus, DeviceError};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// One physical channel. `module` is 0 for buses without modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel {
    /// Connector family
    pub bus: Bus,
    /// Pneumatics module id (solenoids, compressors)
    pub module: u32,
    /// Channel on the bus or module
    pub channel: u32,
}

impl Channel {
    /// Channel on a bus without modules.
    pub const fn on(bus: Bus, channel: u32) -> Self {
        Self {
            bus,
            module: 0,
            channel,
        }
    }

    /// Channel on a pneumatics module.
    pub const fn on_module(bus: Bus, module: u32, channel: u32) -> Self {
        Self {
            bus,
            module,
            channel,
        }
    }
}

#[derive(Debug, Default)]
struct AllocatorState {
    allocated: HashSet<Channel>,
    faults: HashMap<Channel, String>,
}

/// Simulated channel allocation table.
#[derive(Debug, Default)]
pub struct PortAllocator {
    state: Mutex<AllocatorState>,
}

impl PortAllocator {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a single channel.
    pub fn allocate(&self, channel: Channel) -> Result<(), DeviceError> {
        self.allocate_all(&[channel])
    }

    /// Claim several channels at once. Either all are claimed or none.
    pub fn allocate_all(&self, channels: &[Channel]) -> Result<(), DeviceError> {
        let mut state = self.state.lock();

        for ch in channels {
            if let Some(reason) = state.faults.remove(ch) {
                warn!("Injected fault on {} channel {}: {}", ch.bus, ch.channel, reason);
                return Err(DeviceError::Rejected {
                    bus: ch.bus,
                    channel: ch.channel,
                    reason,
                });
            }
            if state.allocated.contains(ch) {
                return Err(DeviceError::AlreadyAllocated {
                    bus: ch.bus,
                    channel: ch.channel,
                });
            }
        }

        for ch in channels {
            state.allocated.insert(*ch);
            debug!("Allocated {} module {} channel {}", ch.bus, ch.module, ch.channel);
        }
        Ok(())
    }

    /// Make the next allocation touching `channel` fail with `reason`.
    ///
    /// The fault is consumed by that allocation attempt.
    pub fn inject_fault(&self, channel: Channel, reason: impl Into<String>) {
        self.state.lock().faults.insert(channel, reason.into());
    }

    /// True if `channel` has been claimed.
    pub fn is_allocated(&self, channel: Channel) -> bool {
        self.state.lock().allocated.contains(&channel)
    }

    /// Number of claimed channels.
    pub fn allocated_count(&self) -> usize {
        self.state.lock().allocated.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_allocation_fails() {
        let alloc = PortAllocator::new();
        alloc.allocate(Channel::on(Bus::Pwm, 3)).unwrap();
        let err = alloc.allocate(Channel::on(Bus::Pwm, 3)).unwrap_err();
        assert_eq!(
            err,
            DeviceError::AlreadyAllocated {
                bus: Bus::Pwm,
                channel: 3
            }
        );
        // Same number on another bus is a different channel.
        assert!(alloc.allocate(Channel::on(Bus::Dio, 3)).is_ok());
    }

    #[test]
    fn test_allocate_all_is_atomic() {
        let alloc = PortAllocator::new();
        alloc.allocate(Channel::on_module(Bus::Solenoid, 0, 1)).unwrap();

        let err = alloc.allocate_all(&[
            Channel::on_module(Bus::Solenoid, 0, 0),
            Channel::on_module(Bus::Solenoid, 0, 1),
        ]);
        assert!(err.is_err());
        assert!(!alloc.is_allocated(Channel::on_module(Bus::Solenoid, 0, 0)));
        assert_eq!(alloc.allocated_count(), 1);
    }

    #[test]
    fn test_injected_fault_is_one_shot() {
        let alloc = PortAllocator::new();
        let ch = Channel::on(Bus::AnalogInput, 2);
        alloc.inject_fault(ch, "no sensor");

        assert!(matches!(
            alloc.allocate(ch),
            Err(DeviceError::Rejected { channel: 2, .. })
        ));
        assert!(!alloc.is_allocated(ch));
        assert!(alloc.allocate(ch).is_ok());
    }
}
