//! Simulation driver module.
//!
//! Software stand-ins for the hardware layer and the external services, for
//! development and testing without a robot controller.

mod allocator;
mod gyro;
mod io;
mod motor;
mod physics;
mod pneumatics;
mod services;

pub use allocator::{Channel, PortAllocator};
pub use gyro::Gyro;
pub use io::{ANALOG_FULL_SCALE_V, AnalogInput, AnalogOutput, DigitalInput, DigitalOutput, Relay, RelayValue};
pub use motor::{Jaguar, PwmOutput, Sd540, Servo, Spark, SpeedController, Talon, TalonSrx, Victor, VictorSp};
pub use physics::{DEFAULT_TOP_SPEED, DEFAULT_TOP_TURN_RATE, DrivePhysics};
pub use pneumatics::{Compressor, DoubleSolenoid, DoubleSolenoidValue, Solenoid};
pub use services::{
    CommandScheduler, MemoryTelemetry, RunCommand, SimCamera, SimDriverStation, SimGamepad, TelemetryValue,
};
