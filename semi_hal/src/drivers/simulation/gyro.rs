//! Simulated rate gyro.
//!
//! Stands in for the SPI gyro on the robot controller. The heading is
//! cumulative and not wrapped: two clockwise turns read 720 degrees.

use parking_lot::Mutex;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Default)]
struct GyroState {
    angle: f64,
    rate: f64,
}

/// Single-axis gyro. Angles in degrees, clockwise positive.
#[derive(Debug, Default)]
pub struct Gyro {
    state: Mutex<GyroState>,
}

impl Gyro {
    /// Gyro at heading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading since the last reset.
    pub fn angle(&self) -> f64 {
        self.state.lock().angle
    }

    /// Turn rate over the last simulated step, degrees per second.
    pub fn rate(&self) -> f64 {
        self.state.lock().rate
    }

    /// Zero the heading.
    pub fn reset(&self) {
        debug!("Gyro reset");
        *self.state.lock() = GyroState::default();
    }

    /// Simulation: the robot turned `degrees` over `elapsed`.
    pub fn add_rotation(&self, degrees: f64, elapsed: Duration) {
        let mut state = self.state.lock();
        state.angle += degrees;
        state.rate = if elapsed.is_zero() {
            0.0
        } else {
            degrees / elapsed.as_secs_f64()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_accumulates_unwrapped() {
        let gyro = Gyro::new();
        gyro.add_rotation(270.0, Duration::from_secs(1));
        gyro.add_rotation(180.0, Duration::from_millis(500));
        assert_eq!(gyro.angle(), 450.0);
        assert_eq!(gyro.rate(), 360.0);

        gyro.reset();
        assert_eq!(gyro.angle(), 0.0);
        assert_eq!(gyro.rate(), 0.0);
    }

    #[test]
    fn test_zero_elapsed_has_no_rate() {
        let gyro = Gyro::new();
        gyro.add_rotation(-5.0, Duration::ZERO);
        assert_eq!(gyro.angle(), -5.0);
        assert_eq!(gyro.rate(), 0.0);
    }
}
