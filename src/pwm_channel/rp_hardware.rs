//! [`PwmHardware`] for the RP2040 / RP2350 PWM slices, via `embassy-rp`.
//!
//! A pin and its slice are paired at compile time: [`RpPwmPin::new`] only accepts a slice
//! that actually drives the pin. Each [`RpPwmHardware`] then owns that slice exclusively.
//!
//! ```rust,no_run
//! # #![no_std]
//! # #![no_main]
//! # use panic_probe as _;
//! use hexapod_pwm::pwm_channel::rp_hardware::{RpPwmHardware, RpPwmPin};
//! use hexapod_pwm::pwm_channel::{ChannelConfig, PwmChannel};
//!
//! fn example(p: embassy_rp::Peripherals) -> hexapod_pwm::Result<()> {
//!     // GPIO 5 is output B of slice 2 ((5 / 2) % 8 = 2).
//!     let pin = RpPwmPin::new(p.PIN_5, p.PWM_SLICE2);
//!     let mut channel = PwmChannel::new(RpPwmHardware::new(), ChannelConfig::from_clk_sys());
//!     channel.begin(pin, 2_000)?;
//!     channel.set_duty_cycle(25.0)
//! }
//! ```

use embassy_rp::pwm::{Config, Pwm};
use embassy_rp::{Peri, PeripheralType};

use super::hardware::{PwmAddress, PwmHardware, PwmOutput};
use crate::Result;

/// A GPIO pin that slice `S` can drive.
// Public so downstream crates can name it in bounds.
#[doc(hidden)]
pub trait PwmPin<S: PeripheralType>: PeripheralType {
    /// GPIO number.
    const PIN: u8;

    /// Route the pin to the slice's A or B output.
    fn new_pwm<'d>(slice: Peri<'d, S>, pin: Peri<'d, Self>) -> Pwm<'d>;
}

macro_rules! pwm_pin_map {
    ($pin:ident = $number:literal, $slice:ident, A) => {
        impl PwmPin<embassy_rp::peripherals::$slice> for embassy_rp::peripherals::$pin {
            const PIN: u8 = $number;
            fn new_pwm<'d>(
                slice: Peri<'d, embassy_rp::peripherals::$slice>,
                pin: Peri<'d, Self>,
            ) -> Pwm<'d> {
                Pwm::new_output_a(slice, pin, disabled_config())
            }
        }
    };
    ($pin:ident = $number:literal, $slice:ident, B) => {
        impl PwmPin<embassy_rp::peripherals::$slice> for embassy_rp::peripherals::$pin {
            const PIN: u8 = $number;
            fn new_pwm<'d>(
                slice: Peri<'d, embassy_rp::peripherals::$slice>,
                pin: Peri<'d, Self>,
            ) -> Pwm<'d> {
                Pwm::new_output_b(slice, pin, disabled_config())
            }
        }
    };
}

pwm_pin_map!(PIN_0 = 0, PWM_SLICE0, A);
pwm_pin_map!(PIN_1 = 1, PWM_SLICE0, B);
pwm_pin_map!(PIN_2 = 2, PWM_SLICE1, A);
pwm_pin_map!(PIN_3 = 3, PWM_SLICE1, B);
pwm_pin_map!(PIN_4 = 4, PWM_SLICE2, A);
pwm_pin_map!(PIN_5 = 5, PWM_SLICE2, B);
pwm_pin_map!(PIN_6 = 6, PWM_SLICE3, A);
pwm_pin_map!(PIN_7 = 7, PWM_SLICE3, B);
pwm_pin_map!(PIN_8 = 8, PWM_SLICE4, A);
pwm_pin_map!(PIN_9 = 9, PWM_SLICE4, B);
pwm_pin_map!(PIN_10 = 10, PWM_SLICE5, A);
pwm_pin_map!(PIN_11 = 11, PWM_SLICE5, B);
pwm_pin_map!(PIN_12 = 12, PWM_SLICE6, A);
pwm_pin_map!(PIN_13 = 13, PWM_SLICE6, B);
pwm_pin_map!(PIN_14 = 14, PWM_SLICE7, A);
pwm_pin_map!(PIN_15 = 15, PWM_SLICE7, B);
pwm_pin_map!(PIN_16 = 16, PWM_SLICE0, A);
pwm_pin_map!(PIN_17 = 17, PWM_SLICE0, B);
pwm_pin_map!(PIN_18 = 18, PWM_SLICE1, A);
pwm_pin_map!(PIN_19 = 19, PWM_SLICE1, B);
pwm_pin_map!(PIN_20 = 20, PWM_SLICE2, A);
pwm_pin_map!(PIN_21 = 21, PWM_SLICE2, B);
pwm_pin_map!(PIN_22 = 22, PWM_SLICE3, A);
pwm_pin_map!(PIN_23 = 23, PWM_SLICE3, B);
pwm_pin_map!(PIN_24 = 24, PWM_SLICE4, A);
pwm_pin_map!(PIN_25 = 25, PWM_SLICE4, B);
pwm_pin_map!(PIN_26 = 26, PWM_SLICE5, A);
pwm_pin_map!(PIN_27 = 27, PWM_SLICE5, B);
pwm_pin_map!(PIN_28 = 28, PWM_SLICE6, A);
pwm_pin_map!(PIN_29 = 29, PWM_SLICE6, B);

#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_30 = 30, PWM_SLICE7, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_31 = 31, PWM_SLICE7, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_32 = 32, PWM_SLICE8, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_33 = 33, PWM_SLICE8, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_34 = 34, PWM_SLICE9, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_35 = 35, PWM_SLICE9, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_36 = 36, PWM_SLICE10, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_37 = 37, PWM_SLICE10, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_38 = 38, PWM_SLICE11, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_39 = 39, PWM_SLICE11, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_40 = 40, PWM_SLICE8, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_41 = 41, PWM_SLICE8, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_42 = 42, PWM_SLICE9, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_43 = 43, PWM_SLICE9, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_44 = 44, PWM_SLICE10, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_45 = 45, PWM_SLICE10, B);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_46 = 46, PWM_SLICE11, A);
#[cfg(feature = "pico2")]
pwm_pin_map!(PIN_47 = 47, PWM_SLICE11, B);

// Output stays off until the channel enables it.
fn disabled_config() -> Config {
    let mut config = Config::default();
    config.enable = false;
    config
}

/// A pin routed to its PWM slice, ready for [`PwmChannel::begin`](super::PwmChannel::begin).
pub struct RpPwmPin<'d> {
    pwm: Pwm<'d>,
    pin: u8,
}

impl<'d> RpPwmPin<'d> {
    /// Pair a pin with the slice that drives it.
    ///
    /// See the [module-level example](self) for usage.
    pub fn new<P, S>(pin: Peri<'d, P>, slice: Peri<'d, S>) -> Self
    where
        P: PwmPin<S>,
        S: PeripheralType,
    {
        Self {
            pwm: P::new_pwm(slice, pin),
            pin: P::PIN,
        }
    }
}

/// Register access for one RP PWM slice output.
///
/// `embassy-rp` writes a slice's registers from one [`Config`], so this keeps the last config
/// and reapplies it whole; updating one field never resets the others (the divider in
/// particular).
pub struct RpPwmHardware<'d> {
    pwm: Option<Pwm<'d>>,
    config: Config,
}

impl RpPwmHardware<'_> {
    /// Hardware with no pin claimed yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pwm: None,
            config: disabled_config(),
        }
    }

    fn apply(&mut self) {
        if let Some(pwm) = self.pwm.as_mut() {
            pwm.set_config(&self.config);
        }
    }
}

impl Default for RpPwmHardware<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d> PwmHardware for RpPwmHardware<'d> {
    type Pin = RpPwmPin<'d>;

    const COUNTER_MASK: u32 = 0xFFFF;

    fn claim(&mut self, pin: RpPwmPin<'d>) -> Result<PwmAddress> {
        let address = PwmAddress::for_pin(pin.pin)?;
        self.config = disabled_config();
        self.pwm = Some(pin.pwm);
        self.apply();
        Ok(address)
    }

    fn release(&mut self, _address: PwmAddress) {
        // Dropping the driver returns the pin to its default function.
        self.pwm = None;
    }

    fn set_wrap(&mut self, _address: PwmAddress, wrap: u32) {
        self.config.top = u16::try_from(wrap).unwrap_or(u16::MAX);
        self.apply();
    }

    fn set_compare(&mut self, address: PwmAddress, compare: u32) {
        let compare = u16::try_from(compare).unwrap_or(u16::MAX);
        match address.output() {
            PwmOutput::A => self.config.compare_a = compare,
            PwmOutput::B => self.config.compare_b = compare,
        }
        self.apply();
    }

    fn set_clock_divider(&mut self, _address: PwmAddress, divider: u8) {
        self.config.divider = divider.into();
        self.apply();
    }

    fn set_enabled(&mut self, _address: PwmAddress, enabled: bool) {
        self.config.enable = enabled;
        self.apply();
    }
}
