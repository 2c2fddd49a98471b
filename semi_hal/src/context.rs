//! Hardware context: the robot's single owner of every port registry.
//!
//! Created once at start-up and shared (`Arc<HardwareContext>`) with every
//! subsystem. Subsystems ask for devices by port; the first request builds
//! the device through the driver layer, later requests for the same port
//! and kind get the same instance back.
//!
//! ```
//! use semi_hal::context::HardwareContext;
//! use semi_common::port::PortLimits;
//! use std::sync::Arc;
//!
//! let hw = HardwareContext::new(PortLimits::default());
//! let a = hw.spark(0).unwrap();
//! let b = hw.spark(0).unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! assert!(hw.talon(0).is_err());
//! ```

use crate::devices::{
    AnalogInputDevice, AnalogOutputDevice, CompressorDevice, DioDevice, PwmDevice, RelayDevice,
    SolenoidDevice,
};
use crate::drivers::simulation::{
    AnalogInput, AnalogOutput, Compressor, DigitalInput, DigitalOutput, DoubleSolenoid, Jaguar,
    PortAllocator, Relay, Sd540, Servo, Solenoid, Spark, SpeedController, Talon, TalonSrx, Victor,
    VictorSp,
};
use semi_common::consts::DEFAULT_PCM_MODULE;
use semi_common::device::Bus;
use semi_common::port::{PortKey, PortLimits, SolenoidId};
use semi_common::registry::{Registry, RegistryError, Resource};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

/// Owner of the per-category port registries.
#[derive(Debug)]
pub struct HardwareContext {
    limits: PortLimits,
    allocator: Arc<PortAllocator>,
    pwm: Registry<u32, PwmDevice>,
    dio: Registry<u32, DioDevice>,
    analog_inputs: Registry<u32, AnalogInputDevice>,
    analog_outputs: Registry<u32, AnalogOutputDevice>,
    relays: Registry<u32, RelayDevice>,
    compressors: Registry<u32, CompressorDevice>,
    solenoids: Registry<SolenoidId, SolenoidDevice>,
}

/// Fetch from a `u32`-keyed registry after checking the port against the
/// bus limits.
macro_rules! port_device {
    ($(#[$meta:meta])* $fn_name:ident, $registry:ident, $bus:expr, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(&self, port: u32) -> Result<Arc<$ty>, RegistryError> {
            let port = self.limits.check($bus, port)?;
            let allocator = &self.allocator;
            let device = self.$registry.fetch(port, || <$ty>::open(allocator, port))?;
            debug!("{} ready on {} {}", stringify!($ty), $bus, port);
            Ok(device)
        }
    };
}

impl HardwareContext {
    /// Create a context with a fresh simulated driver layer.
    pub fn new(limits: PortLimits) -> Self {
        Self::with_allocator(limits, Arc::new(PortAllocator::new()))
    }

    /// Create a context on top of an existing driver layer.
    pub fn with_allocator(limits: PortLimits, allocator: Arc<PortAllocator>) -> Self {
        Self {
            limits,
            allocator,
            pwm: Registry::new(),
            dio: Registry::new(),
            analog_inputs: Registry::new(),
            analog_outputs: Registry::new(),
            relays: Registry::new(),
            compressors: Registry::new(),
            solenoids: Registry::new(),
        }
    }

    /// Channel limits the context checks against.
    pub fn limits(&self) -> &PortLimits {
        &self.limits
    }

    /// Driver layer the devices are opened on.
    pub fn allocator(&self) -> &Arc<PortAllocator> {
        &self.allocator
    }

    // ─── Registries ─────────────────────────────────────────────────

    /// PWM registry.
    pub fn pwm_registry(&self) -> &Registry<u32, PwmDevice> {
        &self.pwm
    }

    /// Digital I/O registry.
    pub fn dio_registry(&self) -> &Registry<u32, DioDevice> {
        &self.dio
    }

    /// Solenoid registry.
    pub fn solenoid_registry(&self) -> &Registry<SolenoidId, SolenoidDevice> {
        &self.solenoids
    }

    // ─── PWM ────────────────────────────────────────────────────────

    port_device!(
        /// Spark motor controller on a PWM port.
        spark, pwm, Bus::Pwm, Spark
    );
    port_device!(
        /// Talon motor controller on a PWM port.
        talon, pwm, Bus::Pwm, Talon
    );
    port_device!(
        /// Talon SRX (PWM mode) on a PWM port.
        talon_srx, pwm, Bus::Pwm, TalonSrx
    );
    port_device!(
        /// Jaguar motor controller on a PWM port.
        jaguar, pwm, Bus::Pwm, Jaguar
    );
    port_device!(
        /// Victor motor controller on a PWM port.
        victor, pwm, Bus::Pwm, Victor
    );
    port_device!(
        /// Victor SP motor controller on a PWM port.
        victor_sp, pwm, Bus::Pwm, VictorSp
    );
    port_device!(
        /// SD540 motor controller on a PWM port.
        sd540, pwm, Bus::Pwm, Sd540
    );
    port_device!(
        /// Servo on a PWM port.
        servo, pwm, Bus::Pwm, Servo
    );

    // ─── Digital / analog / relay ───────────────────────────────────

    port_device!(
        /// Digital input. Fails with `TypeConflict` if the channel is
        /// already used as an output.
        digital_input, dio, Bus::Dio, DigitalInput
    );
    port_device!(
        /// Digital output. Fails with `TypeConflict` if the channel is
        /// already used as an input.
        digital_output, dio, Bus::Dio, DigitalOutput
    );
    port_device!(
        /// Analog input channel.
        analog_input, analog_inputs, Bus::AnalogInput, AnalogInput
    );
    port_device!(
        /// Analog output channel.
        analog_output, analog_outputs, Bus::AnalogOutput, AnalogOutput
    );
    port_device!(
        /// Relay channel.
        relay, relays, Bus::Relay, Relay
    );
    port_device!(
        /// Compressor on pneumatics module `port`.
        compressor, compressors, Bus::Pcm, Compressor
    );

    // ─── Pneumatics ─────────────────────────────────────────────────

    /// Single solenoid on `module`/`channel`.
    pub fn solenoid(&self, module: u32, channel: u32) -> Result<Arc<Solenoid>, RegistryError> {
        let id = SolenoidId::single(module, channel);
        self.limits.check_solenoid(&id)?;
        let allocator = &self.allocator;
        let device = self
            .solenoids
            .fetch(id, || Solenoid::open(allocator, module, channel))?;
        debug!("Solenoid ready on {}", id);
        Ok(device)
    }

    /// Single solenoid on the default pneumatics module.
    pub fn solenoid_default(&self, channel: u32) -> Result<Arc<Solenoid>, RegistryError> {
        self.solenoid(DEFAULT_PCM_MODULE, channel)
    }

    /// Double solenoid on `module` with its forward and reverse channels.
    ///
    /// Identified by all three values: `(0, 1, 2)` and `(0, 1, 3)` are
    /// different entries, although the second cannot be opened while the
    /// first holds channel 1.
    pub fn double_solenoid(
        &self,
        module: u32,
        forward: u32,
        reverse: u32,
    ) -> Result<Arc<DoubleSolenoid>, RegistryError> {
        let id = SolenoidId::double(module, forward, reverse);
        self.limits.check_solenoid(&id)?;
        let allocator = &self.allocator;
        let device = self
            .solenoids
            .fetch(id, || DoubleSolenoid::open(allocator, module, forward, reverse))?;
        debug!("DoubleSolenoid ready on {}", id);
        Ok(device)
    }

    /// Double solenoid on the default pneumatics module.
    pub fn double_solenoid_default(
        &self,
        forward: u32,
        reverse: u32,
    ) -> Result<Arc<DoubleSolenoid>, RegistryError> {
        self.double_solenoid(DEFAULT_PCM_MODULE, forward, reverse)
    }

    // ─── Shutdown ───────────────────────────────────────────────────

    /// Stop every motor controller bound to a PWM port, whichever
    /// subsystem claimed it. Servos keep their position. Returns the number
    /// of controllers stopped.
    pub fn stop_all_motors(&self) -> usize {
        let stopped = self
            .pwm
            .snapshot()
            .into_iter()
            .filter_map(|(_, device)| device.as_speed_controller())
            .inspect(|motor| motor.stop_motor())
            .count();
        debug!("Stopped {} motor controllers", stopped);
        stopped
    }

    // ─── Diagnostics ────────────────────────────────────────────────

    /// Every bound port across all registries, ordered by bus then port.
    pub fn port_report(&self) -> PortReport {
        let mut entries = Vec::new();
        collect(&mut entries, Bus::Pwm, &self.pwm);
        collect(&mut entries, Bus::Dio, &self.dio);
        collect(&mut entries, Bus::AnalogInput, &self.analog_inputs);
        collect(&mut entries, Bus::AnalogOutput, &self.analog_outputs);
        collect(&mut entries, Bus::Relay, &self.relays);
        collect(&mut entries, Bus::Pcm, &self.compressors);
        collect(&mut entries, Bus::Solenoid, &self.solenoids);
        PortReport { entries }
    }
}

fn collect<Id, B>(out: &mut Vec<PortEntry>, bus: Bus, registry: &Registry<Id, B>)
where
    Id: PortKey + Ord,
    B: Resource,
{
    let mut snapshot = registry.snapshot();
    snapshot.sort_by(|(a, _), (b, _)| a.cmp(b));
    out.extend(snapshot.into_iter().map(|(id, device)| PortEntry::new(bus, &id, device.kind())));
}

/// One bound port in a [`PortReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortEntry {
    /// Bus of the port
    pub bus: Bus,
    /// Port identifier
    pub port: String,
    /// Kind of the bound device
    pub kind: String,
}

impl PortEntry {
    fn new(bus: Bus, port: &impl Display, kind: impl Display) -> Self {
        Self {
            bus,
            port: port.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// Point-in-time listing of bound ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortReport {
    /// Entries ordered by bus, then port
    pub entries: Vec<PortEntry>,
}

impl PortReport {
    /// Number of bound ports.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
