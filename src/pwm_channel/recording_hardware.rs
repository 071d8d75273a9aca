#![cfg(feature = "host")]
//! A [`PwmHardware`] backend that records register writes instead of making them.
//!
//! Clones share one log, so a test can keep a handle and inspect it after the channel that
//! owns the other handle has been dropped.

use core::cell::RefCell;
use std::rc::Rc;

use super::hardware::{PwmAddress, PwmHardware, PwmOutput};
use crate::Result;

/// One recorded register write.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegisterWrite {
    /// The pin was switched to its PWM function.
    PinFunction {
        /// GPIO number.
        pin: u8,
    },
    /// The pin was handed back.
    Released {
        /// GPIO number.
        pin: u8,
    },
    /// Period register.
    Wrap {
        /// PWM slice.
        slice: u8,
        /// Value written.
        wrap: u32,
    },
    /// Compare register of one output.
    Compare {
        /// PWM slice.
        slice: u8,
        /// Slice output.
        output: PwmOutput,
        /// Value written.
        compare: u32,
    },
    /// Clock divider register.
    ClockDivider {
        /// PWM slice.
        slice: u8,
        /// Value written.
        divider: u8,
    },
    /// Output enable.
    Enabled {
        /// PWM slice.
        slice: u8,
        /// Value written.
        enabled: bool,
    },
}

/// Records every register write for inspection in tests.
///
/// `COUNTER_BITS` sets the counter width the channel truncates to; the default of 32 keeps
/// every value intact, 16 matches the Pico.
#[derive(Clone, Debug, Default)]
pub struct RecordingHardware<const COUNTER_BITS: u32 = 32> {
    writes: Rc<RefCell<Vec<RegisterWrite>>>,
}

impl RecordingHardware {
    /// A recorder with a 32-bit counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordingHardware<16> {
    /// A recorder with the Pico's 16-bit counter.
    #[must_use]
    pub fn with_16_bit_counter() -> Self {
        Self::default()
    }
}

impl<const COUNTER_BITS: u32> RecordingHardware<COUNTER_BITS> {
    /// Every write so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<RegisterWrite> {
        self.writes.borrow().clone()
    }

    /// Forget the writes so far.
    pub fn clear(&self) {
        self.writes.borrow_mut().clear();
    }

    /// Last value written to the slice's period register.
    #[must_use]
    pub fn wrap(&self, slice: u8) -> Option<u32> {
        self.writes.borrow().iter().rev().find_map(|write| match *write {
            RegisterWrite::Wrap { slice: s, wrap } if s == slice => Some(wrap),
            _ => None,
        })
    }

    /// Last value written to the output's compare register.
    #[must_use]
    pub fn compare(&self, slice: u8, output: PwmOutput) -> Option<u32> {
        self.writes.borrow().iter().rev().find_map(|write| match *write {
            RegisterWrite::Compare {
                slice: s,
                output: o,
                compare,
            } if s == slice && o == output => Some(compare),
            _ => None,
        })
    }

    /// Last value written to the slice's clock divider.
    #[must_use]
    pub fn clock_divider(&self, slice: u8) -> Option<u8> {
        self.writes.borrow().iter().rev().find_map(|write| match *write {
            RegisterWrite::ClockDivider { slice: s, divider } if s == slice => Some(divider),
            _ => None,
        })
    }

    /// Whether the slice was last enabled.
    #[must_use]
    pub fn is_enabled(&self, slice: u8) -> bool {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find_map(|write| match *write {
                RegisterWrite::Enabled { slice: s, enabled } if s == slice => Some(enabled),
                _ => None,
            })
            .unwrap_or(false)
    }

    fn record(&self, write: RegisterWrite) {
        self.writes.borrow_mut().push(write);
    }
}

impl<const COUNTER_BITS: u32> PwmHardware for RecordingHardware<COUNTER_BITS> {
    type Pin = u8;

    const COUNTER_MASK: u32 = u32::MAX >> (32 - COUNTER_BITS);

    fn claim(&mut self, pin: u8) -> Result<PwmAddress> {
        let address = PwmAddress::for_pin(pin)?;
        self.record(RegisterWrite::PinFunction { pin });
        Ok(address)
    }

    fn release(&mut self, address: PwmAddress) {
        self.record(RegisterWrite::Released {
            pin: address.pin(),
        });
    }

    fn set_wrap(&mut self, address: PwmAddress, wrap: u32) {
        self.record(RegisterWrite::Wrap {
            slice: address.slice(),
            wrap,
        });
    }

    fn set_compare(&mut self, address: PwmAddress, compare: u32) {
        self.record(RegisterWrite::Compare {
            slice: address.slice(),
            output: address.output(),
            compare,
        });
    }

    fn set_clock_divider(&mut self, address: PwmAddress, divider: u8) {
        self.record(RegisterWrite::ClockDivider {
            slice: address.slice(),
            divider,
        });
    }

    fn set_enabled(&mut self, address: PwmAddress, enabled: bool) {
        self.record(RegisterWrite::Enabled {
            slice: address.slice(),
            enabled,
        });
    }
}
