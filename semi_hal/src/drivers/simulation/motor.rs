//! Simulated PWM devices: motor controllers and servos.
//!
//! All PWM motor controllers share one behaviour (`PwmOutput`) and differ
//! only in their type, which is what the port registry keys its type check
//! on. Speeds are clamped to `-1.0..=1.0`; inversion is applied to the
//! output, not to the value reported by `get`.

use super::allocator::{Channel, PortAllocator};
use crate::util::clamp;
use parking_lot::Mutex;
use semi_common::device::{Bus, DeviceError};
use std::sync::atomic::{AtomicBool, Ordering};

/// Common interface of PWM motor controllers.
pub trait SpeedController: Send + Sync {
    /// PWM channel.
    fn port(&self) -> u32;

    /// Command a speed in `-1.0..=1.0` (clamped).
    fn set(&self, speed: f64);

    /// Last commanded speed.
    fn get(&self) -> f64;

    /// Invert the output direction.
    fn set_inverted(&self, inverted: bool);

    /// True if the output direction is inverted.
    fn is_inverted(&self) -> bool;

    /// Signal actually driven on the PWM line (after inversion).
    fn output(&self) -> f64;

    /// Command zero output.
    fn stop_motor(&self) {
        self.set(0.0);
    }
}

/// Shared state of a simulated PWM output.
#[derive(Debug)]
pub struct PwmOutput {
    port: u32,
    speed: Mutex<f64>,
    inverted: AtomicBool,
}

impl PwmOutput {
    fn open(allocator: &PortAllocator, port: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on(Bus::Pwm, port))?;
        Ok(Self {
            port,
            speed: Mutex::new(0.0),
            inverted: AtomicBool::new(false),
        })
    }
}

impl SpeedController for PwmOutput {
    fn port(&self) -> u32 {
        self.port
    }

    fn set(&self, speed: f64) {
        *self.speed.lock() = clamp(speed, -1.0, 1.0);
    }

    fn get(&self) -> f64 {
        *self.speed.lock()
    }

    fn set_inverted(&self, inverted: bool) {
        self.inverted.store(inverted, Ordering::Relaxed);
    }

    fn is_inverted(&self) -> bool {
        self.inverted.load(Ordering::Relaxed)
    }

    fn output(&self) -> f64 {
        let speed = self.get();
        if self.is_inverted() { -speed } else { speed }
    }
}

macro_rules! pwm_motor_controller {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            pub struct $name {
                output: PwmOutput,
            }

            impl $name {
                /// Open the controller on `port`.
                pub fn open(allocator: &PortAllocator, port: u32) -> Result<Self, DeviceError> {
                    Ok(Self {
                        output: PwmOutput::open(allocator, port)?,
                    })
                }
            }

            impl SpeedController for $name {
                fn port(&self) -> u32 {
                    self.output.port()
                }

                fn set(&self, speed: f64) {
                    self.output.set(speed)
                }

                fn get(&self) -> f64 {
                    self.output.get()
                }

                fn set_inverted(&self, inverted: bool) {
                    self.output.set_inverted(inverted)
                }

                fn is_inverted(&self) -> bool {
                    self.output.is_inverted()
                }

                fn output(&self) -> f64 {
                    self.output.output()
                }
            }
        )+
    };
}

pwm_motor_controller! {
    /// REV Spark.
    Spark;
    /// CTRE Talon SR.
    Talon;
    /// CTRE Talon SRX driven over PWM.
    TalonSrx;
    /// Jaguar.
    Jaguar;
    /// Victor 888.
    Victor;
    /// Victor SP.
    VictorSp;
    /// Mindsensors SD540.
    Sd540;
}

/// Hobby servo on a PWM channel.
#[derive(Debug)]
pub struct Servo {
    port: u32,
    position: Mutex<f64>,
}

impl Servo {
    /// Sweep of the servo in degrees.
    pub const MAX_ANGLE: f64 = 180.0;

    /// Open the servo on `port`.
    pub fn open(allocator: &PortAllocator, port: u32) -> Result<Self, DeviceError> {
        allocator.allocate(Channel::on(Bus::Pwm, port))?;
        Ok(Self {
            port,
            position: Mutex::new(0.0),
        })
    }

    /// PWM channel.
    pub fn port(&self) -> u32 {
        self.port
    }

    /// Set position in `0.0..=1.0` (clamped).
    pub fn set(&self, position: f64) {
        *self.position.lock() = clamp(position, 0.0, 1.0);
    }

    /// Current position in `0.0..=1.0`.
    pub fn get(&self) -> f64 {
        *self.position.lock()
    }

    /// Set angle in degrees (clamped to the sweep).
    pub fn set_angle(&self, degrees: f64) {
        self.set(degrees / Self::MAX_ANGLE);
    }

    /// Current angle in degrees.
    pub fn angle(&self) -> f64 {
        self.get() * Self::MAX_ANGLE
    }
}
