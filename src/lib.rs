//! Timer-driven PWM channels for the servo joints of a Pico-based hexapod.
//!
//! The heart of the crate is [`PwmChannel`](pwm_channel::PwmChannel): it turns "run this pin at
//! X Hz" and "hold this duty cycle / angle" into the period ("wrap") and compare register
//! values of one PWM output, keeping the requested duty-cycle ratio when the frequency changes.
//!
//! Around it sit two configuration objects:
//!
//! - [`ServoCalibration`](calibration::ServoCalibration): the pulse widths (in calibration
//!   ticks) for 0°, 90°, and 180°, with presets for a PCA9685-style servo driver and for direct
//!   Pico PWM.
//! - [`HexapodConfig`](topology::HexapodConfig): which PWM channel drives each joint of each
//!   leg, and the per-joint tick offsets that correct for installation error.
//!
//! # Glossary
//!
//! - **PWM ([Pulse Width Modulation](https://en.wikipedia.org/wiki/Pulse-width_modulation)) Slices:**
//!   Pico 1 has 8 slices (& 16 outputs), Pico 2B has 12. Each slice has one counter and two
//!   outputs, A and B. These "slices" are unrelated to Rust slices.
//! - **Period count ("wrap"):** timer ticks per PWM cycle, minus one.
//! - **Compare value:** the counter value at which an output goes low within a period.
//! - **Level:** a 10-bit fixed-point duty cycle, `0..=1024`.
#![cfg_attr(not(feature = "host"), no_std)]
#![cfg_attr(not(feature = "host"), no_main)]

// Compile-time checks: exactly one board must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "pico1", feature = "pico2")), not(feature = "host")))]
compile_error!("Must enable exactly one board feature: 'pico1' or 'pico2'");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

// Compile-time checks: exactly one architecture must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "arm", feature = "riscv")), not(feature = "host")))]
compile_error!("Must enable exactly one architecture feature: 'arm' or 'riscv'");

#[cfg(all(feature = "arm", feature = "riscv"))]
compile_error!("Cannot enable both 'arm' and 'riscv' features simultaneously");

// Compile-time check: pico1 only supports ARM
#[cfg(all(feature = "pico1", feature = "riscv"))]
compile_error!("Pico 1 (RP2040) only supports ARM architecture, not RISC-V");

#[macro_use]
mod log;

pub mod calibration;
mod error;
pub mod pwm_channel;
pub mod topology;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
