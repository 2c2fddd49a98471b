//! Operator input helpers.

use crate::util::clamp;

/// Combined trigger axis from the left and right trigger readings.
///
/// Returns `-1.0..=1.0`: negative when the left trigger dominates, positive
/// for the right.
pub fn trigger_axis(left: f64, right: f64) -> f64 {
    clamp(-left.abs() + right.abs(), -1.0, 1.0)
}
