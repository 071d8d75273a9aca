//! The platform services a [`PwmChannel`](super::PwmChannel) drives, and pin addressing.

use crate::{Error, Result};

// Pico 2B exposes GPIO 0..=47; Pico 1 exposes GPIO 0..=29.
#[cfg(feature = "pico2")]
const PWM_PIN_COUNT: u8 = 48;
#[cfg(not(feature = "pico2"))]
const PWM_PIN_COUNT: u8 = 30;

/// Which of a slice's two outputs a pin drives.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum PwmOutput {
    /// Even pins.
    A,
    /// Odd pins.
    B,
}

/// Hardware addressing for one PWM output: the pin, its slice, and the slice output.
///
/// Derived from the pin number; never set independently.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct PwmAddress {
    pin: u8,
    slice: u8,
    output: PwmOutput,
}

impl PwmAddress {
    /// Resolve a GPIO number to its PWM slice and output.
    ///
    /// GPIO 0–31 cycle through slices 0–7 (`slice = (pin / 2) % 8`); on Pico 2B, GPIO 32–47
    /// cycle through slices 8–11. Even pins drive output A, odd pins output B.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPin`] if the board has no such GPIO.
    pub const fn for_pin(pin: u8) -> Result<Self> {
        if pin >= PWM_PIN_COUNT {
            return Err(Error::InvalidPin { pin });
        }
        let slice = if pin < 32 {
            (pin / 2) % 8
        } else {
            8 + ((pin - 32) / 2) % 4
        };
        let output = if pin % 2 == 0 {
            PwmOutput::A
        } else {
            PwmOutput::B
        };
        Ok(Self { pin, slice, output })
    }

    /// GPIO number.
    #[must_use]
    pub const fn pin(&self) -> u8 {
        self.pin
    }

    /// PWM slice (timer unit).
    #[must_use]
    pub const fn slice(&self) -> u8 {
        self.slice
    }

    /// Slice output (timer sub-channel).
    #[must_use]
    pub const fn output(&self) -> PwmOutput {
        self.output
    }
}

/// Register-level access to a timer-based PWM peripheral.
///
/// Every call is a direct, bounded register write. Implementations do no range checking:
/// [`PwmChannel`](super::PwmChannel) has already clamped and truncated every value it passes.
pub trait PwmHardware {
    /// What [`PwmChannel::begin`](super::PwmChannel::begin) consumes to claim an output.
    type Pin;

    /// All-ones mask of the counter width (`0xFFFF` for a 16-bit counter).
    ///
    /// Period and compare values are masked with it before they are written.
    const COUNTER_MASK: u32;

    /// Resolve the pin's addressing and switch the pin to its PWM function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPin`] if the pin has no PWM output.
    fn claim(&mut self, pin: Self::Pin) -> Result<PwmAddress>;

    /// Give the pin back after the channel is torn down.
    fn release(&mut self, address: PwmAddress);

    /// Program the period ("wrap", TOP) register.
    fn set_wrap(&mut self, address: PwmAddress, wrap: u32);

    /// Program the per-output compare register.
    fn set_compare(&mut self, address: PwmAddress, compare: u32);

    /// Program the integer clock divider.
    fn set_clock_divider(&mut self, address: PwmAddress, divider: u8);

    /// Start or stop the output.
    fn set_enabled(&mut self, address: PwmAddress, enabled: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_pins_cycle_through_eight_slices() {
        let address = PwmAddress::for_pin(5).expect("pin 5 exists");
        assert_eq!(address.slice(), 2);
        assert_eq!(address.output(), PwmOutput::B);

        let address = PwmAddress::for_pin(16).expect("pin 16 exists");
        assert_eq!(address.slice(), 0);
        assert_eq!(address.output(), PwmOutput::A);

        let address = PwmAddress::for_pin(29).expect("pin 29 exists");
        assert_eq!(address.slice(), 6);
        assert_eq!(address.output(), PwmOutput::B);
    }

    #[cfg(not(feature = "pico2"))]
    #[test]
    fn pins_past_the_header_are_rejected() {
        assert_eq!(PwmAddress::for_pin(30), Err(Error::InvalidPin { pin: 30 }));
        assert_eq!(
            PwmAddress::for_pin(u8::MAX),
            Err(Error::InvalidPin { pin: u8::MAX })
        );
    }
}
