//! Servo calibration: which pulse widths correspond to 0°, 90°, and 180°.
//!
//! See [`ServoCalibration`] for the mapping and the built-in presets.

use serde::{Deserialize, Serialize};

/// Largest angle a servo joint accepts, in degrees.
pub const MAX_ANGLE_DEGREES: f32 = 180.0;

const MID_ANGLE_DEGREES: f32 = 90.0;

/// Pulse widths for 0°, 90°, and 180°, measured in calibration ticks.
///
/// A tick is `1 / full_scale` of one PWM period. The calibration is independent of the timer
/// that eventually produces the pulse: a [`PwmChannel`](crate::pwm_channel::PwmChannel)
/// turns `ticks / full_scale` into a compare value for whatever period count it runs at.
///
/// Angles map piecewise-linearly: 0°–90° spans `min_ticks..=mid_ticks` and 90°–180° spans
/// `mid_ticks..=max_ticks`. When the mid point sits halfway between min and max this is one
/// straight line. Angles outside `0..=180` pin to the end points.
///
/// # Example
///
/// ```rust
/// use hexapod_pwm::calibration::ServoCalibration;
///
/// let calibration = ServoCalibration::PCA9685;
/// assert_eq!(calibration.angle_to_ticks(0.0), 125.0);
/// assert_eq!(calibration.angle_to_ticks(90.0), 350.0);
/// assert_eq!(calibration.angle_to_ticks(200.0), 575.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoCalibration {
    min_ticks: u16,
    mid_ticks: u16,
    max_ticks: u16,
    full_scale: u16,
}

impl ServoCalibration {
    /// Calibration for servos behind a PCA9685-style driver: 12-bit ticks at 50 Hz.
    pub const PCA9685: Self = Self::new(125, 350, 575, 4096);

    /// Calibration for servos wired straight to a Pico PWM output at 50 Hz, in 10-bit levels.
    ///
    /// 0.5 ms, 1.5 ms, and 2.5 ms of a 20 ms frame.
    pub const DIRECT_PWM: Self = Self::new(26, 77, 128, 1024);

    /// Create a calibration.
    ///
    /// # Panics
    ///
    /// Panics unless `min_ticks <= mid_ticks <= max_ticks <= full_scale` and `full_scale > 0`.
    /// In a `const` context the panic is a compile error.
    #[must_use]
    pub const fn new(min_ticks: u16, mid_ticks: u16, max_ticks: u16, full_scale: u16) -> Self {
        assert!(full_scale > 0, "full_scale must be positive");
        assert!(min_ticks <= mid_ticks, "min_ticks must not exceed mid_ticks");
        assert!(mid_ticks <= max_ticks, "mid_ticks must not exceed max_ticks");
        assert!(max_ticks <= full_scale, "max_ticks must fit in one period");
        Self {
            min_ticks,
            mid_ticks,
            max_ticks,
            full_scale,
        }
    }

    /// Pulse width for 0°.
    #[must_use]
    pub const fn min_ticks(&self) -> u16 {
        self.min_ticks
    }

    /// Pulse width for 90°.
    #[must_use]
    pub const fn mid_ticks(&self) -> u16 {
        self.mid_ticks
    }

    /// Pulse width for 180°.
    #[must_use]
    pub const fn max_ticks(&self) -> u16 {
        self.max_ticks
    }

    /// Ticks in one full PWM period.
    #[must_use]
    pub const fn full_scale(&self) -> u16 {
        self.full_scale
    }

    /// Whether the ordering checked by [`new`](Self::new) holds.
    ///
    /// Values built with `new` always pass; deserialized values may not.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.full_scale > 0
            && self.min_ticks <= self.mid_ticks
            && self.mid_ticks <= self.max_ticks
            && self.max_ticks <= self.full_scale
    }

    /// Map an angle in degrees to a pulse width in ticks (not rounded).
    #[must_use]
    pub fn angle_to_ticks(&self, angle: f32) -> f32 {
        let angle = clamp_angle(angle);
        let (from, to, span_start) = if angle <= MID_ANGLE_DEGREES {
            (self.min_ticks, self.mid_ticks, 0.0)
        } else {
            (self.mid_ticks, self.max_ticks, MID_ANGLE_DEGREES)
        };
        let from = f32::from(from);
        let to = f32::from(to);
        from + (to - from) * (angle - span_start) / MID_ANGLE_DEGREES
    }
}

impl Default for ServoCalibration {
    fn default() -> Self {
        Self::DIRECT_PWM
    }
}

/// Clamp to `0..=180` degrees. NaN becomes 0°.
#[must_use]
pub fn clamp_angle(angle: f32) -> f32 {
    if angle.is_nan() {
        0.0
    } else {
        angle.clamp(0.0, MAX_ANGLE_DEGREES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_points_and_mid_point_hit_calibration() {
        let calibration = ServoCalibration::DIRECT_PWM;
        assert_eq!(calibration.angle_to_ticks(0.0), 26.0);
        assert_eq!(calibration.angle_to_ticks(90.0), 77.0);
        assert_eq!(calibration.angle_to_ticks(180.0), 128.0);
    }

    #[test]
    fn halfway_through_each_span() {
        let calibration = ServoCalibration::new(100, 300, 400, 4096);
        assert_eq!(calibration.angle_to_ticks(45.0), 200.0);
        assert_eq!(calibration.angle_to_ticks(135.0), 350.0);
    }

    #[test]
    fn out_of_range_angles_pin_to_end_points() {
        let calibration = ServoCalibration::PCA9685;
        assert_eq!(calibration.angle_to_ticks(-30.0), 125.0);
        assert_eq!(calibration.angle_to_ticks(720.0), 575.0);
        assert_eq!(calibration.angle_to_ticks(f32::NAN), 125.0);
    }

    #[test]
    fn mapping_is_monotonic() {
        let calibration = ServoCalibration::new(10, 90, 100, 1024);
        let mut previous = calibration.angle_to_ticks(0.0);
        for tenth in 1..=1800_u16 {
            let ticks = calibration.angle_to_ticks(f32::from(tenth) / 10.0);
            assert!(ticks >= previous, "{ticks} < {previous} at {tenth}");
            previous = ticks;
        }
    }

    #[test]
    fn deserialized_values_are_checked() {
        let reversed = ServoCalibration {
            min_ticks: 500,
            mid_ticks: 300,
            max_ticks: 100,
            full_scale: 4096,
        };
        assert!(!reversed.is_valid());
        assert!(ServoCalibration::PCA9685.is_valid());
    }
}
