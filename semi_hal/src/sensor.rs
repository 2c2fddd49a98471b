//! Sensors built on top of the I/O devices.
//!
//! - [`Encoder`] - quadrature encoder on two digital inputs
//! - [`AnalogRangefinder`] - ultrasonic rangefinder on an analog input

use crate::drivers::simulation::{AnalogInput, DigitalInput};
use std::f64::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

// ─── Encoder ────────────────────────────────────────────────────────

/// Edges counted per quadrature cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingType {
    /// Rising edges of channel A
    K1X,
    /// Both edges of channel A
    K2X,
    /// Both edges of both channels
    K4X,
}

impl EncodingType {
    /// Counts per encoder pulse.
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::K1X => 1,
            Self::K2X => 2,
            Self::K4X => 4,
        }
    }
}

/// Mechanical description of an encoder mounting. Distances are in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderPreset {
    /// Decoding mode
    pub encoding_type: EncodingType,
    /// Pulses per encoder shaft revolution
    pub pulses_per_revolution: u32,
    /// Distance travelled per encoder shaft revolution
    pub distance_per_revolution: f64,
    /// Distance travelled per pulse
    pub distance_per_pulse: f64,
}

impl EncoderPreset {
    /// Build a preset; distance per pulse is derived.
    pub fn new(encoding_type: EncodingType, pulses_per_revolution: u32, distance_per_revolution: f64) -> Self {
        Self {
            encoding_type,
            pulses_per_revolution,
            distance_per_revolution,
            distance_per_pulse: distance_per_revolution / f64::from(pulses_per_revolution),
        }
    }

    /// CIMcoder on a 10.71:1 gearbox driving 6" (0.1524 m) wheels.
    pub fn cimcoder() -> Self {
        Self::new(EncodingType::K2X, 20, (PI * 0.1524) / 10.71)
    }
}

/// Quadrature encoder on two digital input channels.
///
/// The simulated hardware has no edge counter; tests and the simulation
/// loop feed counts with [`add_pulses`](Self::add_pulses).
#[derive(Debug)]
pub struct Encoder {
    channel_a: Arc<DigitalInput>,
    channel_b: Arc<DigitalInput>,
    preset: EncoderPreset,
    reversed: AtomicBool,
    count: AtomicI64,
}

impl Encoder {
    /// Build an encoder on two inputs.
    pub fn new(
        channel_a: Arc<DigitalInput>,
        channel_b: Arc<DigitalInput>,
        preset: EncoderPreset,
        reversed: bool,
    ) -> Self {
        Self {
            channel_a,
            channel_b,
            preset,
            reversed: AtomicBool::new(reversed),
            count: AtomicI64::new(0),
        }
    }

    /// DIO channels (A, B).
    pub fn channels(&self) -> (u32, u32) {
        (self.channel_a.channel(), self.channel_b.channel())
    }

    /// Mounting description.
    pub fn preset(&self) -> &EncoderPreset {
        &self.preset
    }

    /// Flip the counting direction.
    pub fn set_reverse_direction(&self, reversed: bool) {
        self.reversed.store(reversed, Ordering::Relaxed);
    }

    /// Signed pulse count since the last reset.
    pub fn get(&self) -> i64 {
        let raw = self.count.load(Ordering::Relaxed);
        if self.reversed.load(Ordering::Relaxed) {
            -raw
        } else {
            raw
        }
    }

    /// Distance since the last reset, in metres.
    pub fn distance(&self) -> f64 {
        self.get() as f64 * self.preset.distance_per_pulse
    }

    /// Zero the count.
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }

    /// Simulation: register `pulses` shaft pulses (negative for backwards).
    pub fn add_pulses(&self, pulses: i64) {
        self.count.fetch_add(pulses, Ordering::Relaxed);
    }
}

// ─── Rangefinder ────────────────────────────────────────────────────

/// Distance unit of [`AnalogRangefinder`] readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    /// Inches
    Inches,
    /// Centimetres
    Cm,
}

impl Units {
    /// Multiplier from inches.
    pub const fn inch_mult(self) -> f64 {
        match self {
            Self::Inches => 1.0,
            Self::Cm => 2.54,
        }
    }

    /// Unit suffix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inches => "in",
            Self::Cm => "cm",
        }
    }
}

/// Ultrasonic rangefinder (MB1010 LV-MaxSonar-EZ1 style) with a linear
/// volts-per-inch output.
#[derive(Debug)]
pub struct AnalogRangefinder {
    input: Arc<AnalogInput>,
    volts_per_inch: f64,
}

impl AnalogRangefinder {
    /// Output scaling of the MB1010 at 5 V supply.
    pub const DEFAULT_SCALING_FACTOR: f64 = 5.0 / 512.0;

    /// Rangefinder with the default scaling.
    pub fn new(input: Arc<AnalogInput>) -> Self {
        Self::with_scaling(input, Self::DEFAULT_SCALING_FACTOR)
    }

    /// Rangefinder with a custom volts-per-inch factor.
    pub fn with_scaling(input: Arc<AnalogInput>, volts_per_inch: f64) -> Self {
        Self {
            input,
            volts_per_inch,
        }
    }

    /// Measured distance.
    pub fn distance(&self, units: Units) -> f64 {
        (self.input.average_voltage() / self.volts_per_inch) * units.inch_mult()
    }

    /// Measured distance with its unit, e.g. `"12.00 in"`.
    pub fn distance_string(&self, units: Units) -> String {
        format!("{:.2} {}", self.distance(units), units.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::PortAllocator;
    use crate::util::is_equal;

    #[test]
    fn test_cimcoder_preset() {
        let p = EncoderPreset::cimcoder();
        assert_eq!(p.encoding_type, EncodingType::K2X);
        assert_eq!(p.pulses_per_revolution, 20);
        assert!(is_equal(p.distance_per_revolution, 0.044_704, 1e-5));
        assert!(is_equal(p.distance_per_pulse * 20.0, p.distance_per_revolution, 1e-12));
    }

    #[test]
    fn test_encoder_distance_and_reverse() {
        let alloc = PortAllocator::new();
        let a = Arc::new(DigitalInput::open(&alloc, 0).unwrap());
        let b = Arc::new(DigitalInput::open(&alloc, 1).unwrap());
        let preset = EncoderPreset::new(EncodingType::K1X, 10, 1.0);
        let enc = Encoder::new(a, b, preset, false);

        assert_eq!(enc.channels(), (0, 1));
        enc.add_pulses(25);
        assert_eq!(enc.get(), 25);
        assert!(is_equal(enc.distance(), 2.5, 1e-12));

        enc.set_reverse_direction(true);
        assert!(is_equal(enc.distance(), -2.5, 1e-12));

        enc.reset();
        assert_eq!(enc.get(), 0);
    }

    #[test]
    fn test_rangefinder() {
        let alloc = PortAllocator::new();
        let input = Arc::new(AnalogInput::open(&alloc, 0).unwrap());
        input.set_simulated_voltage(2.5);
        let rf = AnalogRangefinder::new(input);

        assert!(is_equal(rf.distance(Units::Inches), 256.0, 1e-9));
        assert!(is_equal(rf.distance(Units::Cm), 650.24, 1e-9));
        assert_eq!(rf.distance_string(Units::Inches), "256.00 in");
    }
}
