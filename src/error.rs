//! Error and result types shared by every module.

use derive_more::{Display, Error};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by PWM channels and configuration lookups.
///
/// Out-of-range duty cycles, levels, and angles are never errors; they are clamped.
#[derive(Clone, Copy, Debug, Display, Error, PartialEq, Eq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum Error {
    /// The requested frequency is outside `1..=max_hz`.
    #[display("frequency {frequency_hz} Hz is outside 1..={max_hz} Hz")]
    InvalidFrequency {
        /// Frequency that was requested.
        frequency_hz: u32,
        /// Highest frequency the channel's clock supports.
        max_hz: u32,
    },

    /// `begin` was called on a channel that is already bound to a pin.
    #[display("PWM channel is already bound to pin {pin}")]
    AlreadyBound {
        /// Pin the channel is bound to.
        pin: u8,
    },

    /// The operation needs a bound channel; call `begin` first.
    #[display("PWM channel is not bound to a pin")]
    NotBound,

    /// The platform has no PWM output on this pin.
    #[display("pin {pin} has no PWM output")]
    InvalidPin {
        /// Pin that was requested.
        pin: u8,
    },

    /// A leg or joint index is outside the 3 × 3 topology.
    #[display("leg {leg} joint {joint} is outside the leg topology")]
    IndexOutOfBounds {
        /// Leg index that was requested.
        leg: usize,
        /// Joint index that was requested.
        joint: usize,
    },

    /// Configuration bytes could not be encoded or decoded.
    #[display("configuration could not be encoded or decoded")]
    FormatError,
}

impl embedded_hal::pwm::Error for Error {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}
