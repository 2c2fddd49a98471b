//! Numeric helpers.

use thiserror::Error;

/// Clamp `value` to `min..=max`. NaN is passed through unchanged.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation from `from` to `to` by `alpha`.
pub fn lerp(from: f64, to: f64, alpha: f64) -> f64 {
    from + (to - from) * alpha
}

/// True if `a` and `b` are within `tolerance` of each other.
pub fn is_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Invalid [`ValueGradient`] parameters.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid value gradient: max={maximum} min={minimum} range={range} offset={range_offset}")]
pub struct GradientError {
    /// Rejected maximum
    pub maximum: f64,
    /// Rejected minimum
    pub minimum: f64,
    /// Rejected range
    pub range: f64,
    /// Rejected range offset
    pub range_offset: f64,
}

/// Output that ramps linearly from `minimum` to `maximum` over a distance.
///
/// Below `range_offset` units remaining the output is `minimum`; past
/// `range_offset + range` it is `maximum`. Used to slow a mechanism down as
/// it approaches its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueGradient {
    maximum: f64,
    minimum: f64,
    range: f64,
    range_offset: f64,
}

impl ValueGradient {
    /// Build a gradient.
    ///
    /// # Errors
    /// `maximum` must be in `0..=1`, `minimum` in `0..=maximum`, `range`
    /// positive and `range_offset` non-negative. NaN fails every check.
    pub fn new(
        maximum: f64,
        minimum: f64,
        range: f64,
        range_offset: f64,
    ) -> Result<Self, GradientError> {
        let valid = (0.0..=1.0).contains(&maximum)
            && (0.0..=maximum).contains(&minimum)
            && range > 0.0
            && range_offset >= 0.0;
        if !valid {
            return Err(GradientError {
                maximum,
                minimum,
                range,
                range_offset,
            });
        }
        Ok(Self {
            maximum,
            minimum,
            range,
            range_offset,
        })
    }

    /// Upper output.
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Lower output.
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Output for `units_remaining`, between `minimum` and `maximum`.
    pub fn interpolate(&self, units_remaining: f64) -> f64 {
        if units_remaining < self.range_offset {
            return self.minimum;
        }
        if units_remaining > self.range_offset + self.range {
            return self.maximum;
        }
        let percentage = clamp((units_remaining - self.range_offset) / self.range, 0.0, 1.0);
        lerp(self.minimum, self.maximum, percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_and_lerp() {
        assert_eq!(clamp(2.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-2.0, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25, -1.0, 1.0), 0.25);
        assert_eq!(lerp(0.0, 10.0, 0.3), 3.0);
    }

    #[test]
    fn test_is_equal() {
        assert!(is_equal(1.0, 1.05, 0.1));
        assert!(!is_equal(1.0, 1.2, 0.1));
    }

    #[test]
    fn test_gradient_validation() {
        assert!(ValueGradient::new(1.2, 0.1, 1.0, 0.0).is_err());
        assert!(ValueGradient::new(0.5, 0.6, 1.0, 0.0).is_err());
        assert!(ValueGradient::new(0.5, 0.1, 1.0, -0.1).is_err());
        assert!(ValueGradient::new(0.8, 0.2, 1.0, 0.5).is_ok());
    }

    #[test]
    fn test_gradient_rejects_empty_range() {
        for range in [0.0, -1.0, f64::NAN] {
            let err = ValueGradient::new(0.8, 0.2, range, 0.0).unwrap_err();
            assert!(err.range == range || (range.is_nan() && err.range.is_nan()));
        }
        let err = ValueGradient::new(0.8, 0.2, 0.0, 0.5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value gradient: max=0.8 min=0.2 range=0 offset=0.5"
        );
    }

    #[test]
    fn test_gradient_interpolate() {
        let g = ValueGradient::new(0.8, 0.2, 1.0, 0.5).unwrap();
        assert_eq!(g.interpolate(0.1), 0.2);
        assert_eq!(g.interpolate(5.0), 0.8);
        assert!(is_equal(g.interpolate(1.0), 0.5, 1e-9));
    }
}
