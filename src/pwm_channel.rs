//! A device abstraction for one timer-driven PWM output.
//!
//! [`PwmChannel`] turns frequency and duty-cycle requests into the period ("wrap") and compare
//! register values of a PWM slice output. It accepts duty cycles as percentages, as 10-bit
//! fixed-point levels, and as servo angles, and keeps the requested ratio when the frequency
//! changes.
//!
//! The registers themselves sit behind [`PwmHardware`]. On the Pico that is
//! [`RpPwmHardware`](rp_hardware::RpPwmHardware); host tests use
//! [`RecordingHardware`](recording_hardware::RecordingHardware).

mod compare;
pub mod hardware;
#[cfg(feature = "host")]
pub mod recording_hardware;
#[cfg(not(feature = "host"))]
pub mod rp_hardware;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

pub use self::compare::period_count;
pub use self::hardware::{PwmAddress, PwmHardware, PwmOutput};
use self::compare::compare_value;
use crate::calibration::ServoCalibration;
use crate::{Error, Result};

/// Lowest frequency a channel accepts.
pub const MIN_FREQUENCY_HZ: u32 = 1;

/// Frequency a channel reports before [`PwmChannel::begin`] sets one.
pub const DEFAULT_FREQUENCY_HZ: u32 = 1_000;

/// Full-scale value of the fixed-point level accepted by [`PwmChannel::set_pwm`].
pub const LEVEL_MAX: u16 = 1024;

/// Clock and servo settings for one [`PwmChannel`].
///
/// The input clock is injected rather than assumed so the same arithmetic serves the RP2040
/// (125 MHz), the RP2350 (150 MHz), and overclocked boards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    clock_hz: u32,
    clock_divider: u8,
    calibration: ServoCalibration,
    tick_offset: i16,
}

impl ChannelConfig {
    /// RP2040 system clock, 125 MHz, undivided.
    pub const RP2040: Self = Self::from_clock_hz(125_000_000);

    /// RP2350 system clock, 150 MHz, undivided.
    pub const RP2350: Self = Self::from_clock_hz(150_000_000);

    /// Settings for the given input clock, clock divider 1, [`ServoCalibration::DIRECT_PWM`],
    /// and no tick offset.
    #[must_use]
    pub const fn from_clock_hz(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            clock_divider: 1,
            calibration: ServoCalibration::DIRECT_PWM,
            tick_offset: 0,
        }
    }

    /// Settings for the live system clock.
    #[cfg(not(feature = "host"))]
    #[must_use]
    pub fn from_clk_sys() -> Self {
        Self::from_clock_hz(embassy_rp::clocks::clk_sys_freq())
    }

    /// Divide the input clock before it drives the counter.
    ///
    /// Divider 1 gives the finest duty-cycle resolution. Servo-rate signals (50–330 Hz) need a
    /// larger divider for the period to fit a 16-bit counter.
    ///
    /// # Panics
    ///
    /// Panics if `clock_divider` is 0.
    #[must_use]
    pub const fn with_clock_divider(mut self, clock_divider: u8) -> Self {
        assert!(clock_divider > 0, "clock_divider must be at least 1");
        self.clock_divider = clock_divider;
        self
    }

    /// Use a different servo calibration for [`PwmChannel::set_servo_angle`].
    #[must_use]
    pub const fn with_calibration(mut self, calibration: ServoCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Add a signed offset, in calibration ticks, to every servo pulse.
    #[must_use]
    pub const fn with_tick_offset(mut self, tick_offset: i16) -> Self {
        self.tick_offset = tick_offset;
        self
    }

    /// Input clock in Hz.
    #[must_use]
    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Integer clock divider.
    #[must_use]
    pub const fn clock_divider(&self) -> u8 {
        self.clock_divider
    }

    /// Servo calibration.
    #[must_use]
    pub const fn calibration(&self) -> ServoCalibration {
        self.calibration
    }

    /// Servo tick offset.
    #[must_use]
    pub const fn tick_offset(&self) -> i16 {
        self.tick_offset
    }

    /// Highest frequency that still leaves a period of at least two ticks:
    /// `clock_hz / (2 * clock_divider)`. 62.5 MHz for the RP2040 clock.
    #[must_use]
    pub const fn max_frequency_hz(&self) -> u32 {
        self.clock_hz / 2 / self.clock_divider as u32
    }
}

impl Default for ChannelConfig {
    #[cfg(feature = "pico2")]
    fn default() -> Self {
        Self::RP2350
    }

    #[cfg(not(feature = "pico2"))]
    fn default() -> Self {
        Self::RP2040
    }
}

/// The last duty cycle a channel accepted, in the form it was given (after clamping).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum DutyCycle {
    /// Percentage, `0.0..=100.0`.
    Percent(f32),
    /// Fixed-point level, `0..=1024`.
    Level(u16),
    /// Servo pulse in calibration ticks out of `full_scale`.
    Pulse {
        /// Pulse width, offset included.
        ticks: f32,
        /// Ticks per period.
        full_scale: u16,
    },
}

impl DutyCycle {
    /// The duty cycle as a percentage.
    #[must_use]
    pub fn as_percent(self) -> f32 {
        match self {
            Self::Percent(percent) => percent,
            Self::Level(level) => 100.0 * f32::from(level) / f32::from(LEVEL_MAX),
            Self::Pulse { ticks, full_scale } => 100.0 * ticks / f32::from(full_scale),
        }
    }

    /// Compare value for a period, rounded once from this duty cycle's own form.
    #[must_use]
    pub fn compare_value(self, period_count: u32) -> u32 {
        let (numerator, denominator) = match self {
            Self::Percent(percent) => (f64::from(percent), 100.0),
            Self::Level(level) => (f64::from(level), f64::from(LEVEL_MAX)),
            Self::Pulse { ticks, full_scale } => (f64::from(ticks), f64::from(full_scale)),
        };
        compare_value(period_count, numerator, denominator)
    }
}

/// A device abstraction for one timer-driven PWM output line.
///
/// A channel starts unbound. [`begin`](Self::begin) binds it to a pin and starts a 0% signal;
/// after that the duty cycle can be set as a percentage ([`set_duty_cycle`](Self::set_duty_cycle)),
/// a 10-bit level ([`set_pwm`](Self::set_pwm)), or a servo angle
/// ([`set_servo_angle`](Self::set_servo_angle)). Out-of-range inputs are clamped, never
/// rejected, so an actuator is never driven past its limits.
///
/// ```text
///            begin                  stop
///  unbound ───────▶ running ◀──────────────▶ stopped
///     ▲                        start            │
///     └──────────────────── end ◀───────────────┘
/// ```
///
/// While stopped, setters update the stored state but write nothing; [`start`](Self::start)
/// resumes from the last request. Dropping a channel stops it.
///
/// # Example
///
/// ```rust
/// use hexapod_pwm::pwm_channel::{ChannelConfig, PwmChannel};
/// use hexapod_pwm::pwm_channel::recording_hardware::RecordingHardware;
///
/// let mut channel = PwmChannel::new(RecordingHardware::new(), ChannelConfig::RP2040);
/// channel.begin(5, 1_000)?;
/// assert_eq!(channel.period_count(), 124_999);
///
/// channel.set_duty_cycle(50.0)?;
/// assert_eq!(channel.compare_value(), 62_499);
///
/// channel.set_frequency(2_000)?;
/// assert_eq!(channel.compare_value(), 31_249);
/// assert_eq!(channel.get_duty_cycle(), 50.0);
/// # Ok::<(), hexapod_pwm::Error>(())
/// ```
pub struct PwmChannel<H: PwmHardware> {
    hardware: H,
    config: ChannelConfig,
    address: Option<PwmAddress>,
    frequency_hz: u32,
    period_count: u32,
    duty: DutyCycle,
    compare: u32,
    running: bool,
}

impl<H: PwmHardware> PwmChannel<H> {
    /// Create an unbound channel.
    #[must_use]
    pub const fn new(hardware: H, config: ChannelConfig) -> Self {
        Self {
            hardware,
            config,
            address: None,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            period_count: 0,
            duty: DutyCycle::Percent(0.0),
            compare: 0,
            running: false,
        }
    }

    /// Bind to a pin and start a 0% signal at `frequency_hz`.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyBound`] if the channel is bound; call [`end`](Self::end) first.
    /// - [`Error::InvalidFrequency`] if `frequency_hz` is out of range. The channel stays unbound.
    /// - [`Error::InvalidPin`] if the platform has no PWM output on the pin.
    pub fn begin(&mut self, pin: H::Pin, frequency_hz: u32) -> Result<()> {
        if let Some(address) = self.address {
            return Err(Error::AlreadyBound { pin: address.pin() });
        }
        self.check_frequency(frequency_hz)?;
        let address = self.hardware.claim(pin)?;

        self.address = Some(address);
        self.frequency_hz = frequency_hz;
        self.calculate_wrap();
        self.duty = DutyCycle::Percent(0.0);
        self.compare = 0;
        self.enable(address);

        pwm_info!(
            "pwm pin={} slice={} freq={}Hz wrap={}",
            address.pin(),
            address.slice(),
            frequency_hz,
            self.period_count
        );
        Ok(())
    }

    /// Resume a stopped channel from its stored frequency and duty cycle.
    ///
    /// Does nothing if the channel is already running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBound`] before [`begin`](Self::begin).
    pub fn start(&mut self) -> Result<()> {
        let address = self.bound_address()?;
        if !self.running {
            self.enable(address);
        }
        Ok(())
    }

    /// Stop emitting the signal, keeping frequency, duty cycle, and period.
    ///
    /// Idempotent; does nothing on a stopped or unbound channel.
    pub fn stop(&mut self) {
        if let (Some(address), true) = (self.address, self.running) {
            self.hardware.set_enabled(address, false);
            self.running = false;
        }
    }

    /// Stop, release the pin, and return to the unbound state so
    /// [`begin`](Self::begin) may be called again.
    pub fn end(&mut self) {
        self.stop();
        if let Some(address) = self.address.take() {
            self.hardware.release(address);
        }
    }

    /// Set the duty cycle as a percentage, clamped to `0.0..=100.0` (NaN becomes 0).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBound`] before [`begin`](Self::begin).
    pub fn set_duty_cycle(&mut self, percentage: f32) -> Result<()> {
        let address = self.bound_address()?;
        self.apply_duty(address, DutyCycle::Percent(clamp_percent(percentage)));
        Ok(())
    }

    /// Set the duty cycle as a fixed-point level, clamped to `0..=1024`.
    ///
    /// The compare value is computed from the level directly, not through a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBound`] before [`begin`](Self::begin).
    pub fn set_pwm(&mut self, level: i32) -> Result<()> {
        let address = self.bound_address()?;
        let level = u16::try_from(level.clamp(0, i32::from(LEVEL_MAX))).unwrap_or(LEVEL_MAX);
        self.apply_duty(address, DutyCycle::Level(level));
        Ok(())
    }

    /// Drive a servo to `angle` degrees through the channel's calibration and tick offset.
    ///
    /// The angle is clamped to `0..=180`; the pulse, offset included, to one period.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBound`] before [`begin`](Self::begin).
    pub fn set_servo_angle(&mut self, angle: f32) -> Result<()> {
        let address = self.bound_address()?;
        let calibration = self.config.calibration();
        let full_scale = calibration.full_scale();
        let ticks = (calibration.angle_to_ticks(angle) + f32::from(self.config.tick_offset()))
            .clamp(0.0, f32::from(full_scale));
        self.apply_duty(address, DutyCycle::Pulse { ticks, full_scale });
        Ok(())
    }

    /// Change the frequency, keeping the duty-cycle ratio.
    ///
    /// The compare value is recomputed for the new period. On a stopped channel only the
    /// stored state changes.
    ///
    /// # Errors
    ///
    /// - [`Error::NotBound`] before [`begin`](Self::begin).
    /// - [`Error::InvalidFrequency`] outside `1..=`[`ChannelConfig::max_frequency_hz`]; nothing
    ///   changes.
    pub fn set_frequency(&mut self, frequency_hz: u32) -> Result<()> {
        let address = self.bound_address()?;
        self.check_frequency(frequency_hz)?;

        self.frequency_hz = frequency_hz;
        self.calculate_wrap();
        if self.running {
            self.program_period(address);
        }
        self.apply_duty(address, self.duty);

        pwm_info!(
            "pwm pin={} freq={}Hz wrap={}",
            address.pin(),
            frequency_hz,
            self.period_count
        );
        Ok(())
    }

    /// Change the servo calibration. Takes effect on the next
    /// [`set_servo_angle`](Self::set_servo_angle).
    pub const fn set_calibration(&mut self, calibration: ServoCalibration) {
        self.config.calibration = calibration;
    }

    /// Change the servo tick offset. Takes effect on the next
    /// [`set_servo_angle`](Self::set_servo_angle).
    pub const fn set_tick_offset(&mut self, tick_offset: i16) {
        self.config.tick_offset = tick_offset;
    }

    /// Last accepted frequency in Hz.
    #[must_use]
    pub const fn get_frequency(&self) -> u32 {
        self.frequency_hz
    }

    /// Last accepted duty cycle as a percentage, whichever setter was used.
    #[must_use]
    pub fn get_duty_cycle(&self) -> f32 {
        self.duty.as_percent()
    }

    /// Last accepted duty cycle in the form it was given.
    #[must_use]
    pub const fn duty(&self) -> DutyCycle {
        self.duty
    }

    /// Timer ticks per period, minus one.
    #[must_use]
    pub const fn period_count(&self) -> u32 {
        self.period_count
    }

    /// Compare value for the current duty cycle and period, before counter-width truncation.
    #[must_use]
    pub const fn compare_value(&self) -> u32 {
        self.compare
    }

    /// Whether the signal is being emitted.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether [`begin`](Self::begin) has bound the channel to a pin.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.address.is_some()
    }

    /// Addressing of the bound output.
    #[must_use]
    pub const fn address(&self) -> Option<PwmAddress> {
        self.address
    }

    /// Clock and servo settings.
    #[must_use]
    pub const fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// The hardware backend.
    #[must_use]
    pub const fn hardware(&self) -> &H {
        &self.hardware
    }

    const fn bound_address(&self) -> Result<PwmAddress> {
        match self.address {
            Some(address) => Ok(address),
            None => Err(Error::NotBound),
        }
    }

    const fn check_frequency(&self, frequency_hz: u32) -> Result<()> {
        let max_hz = self.config.max_frequency_hz();
        if frequency_hz < MIN_FREQUENCY_HZ || frequency_hz > max_hz {
            return Err(Error::InvalidFrequency {
                frequency_hz,
                max_hz,
            });
        }
        Ok(())
    }

    fn calculate_wrap(&mut self) {
        self.period_count = period_count(
            self.config.clock_hz(),
            self.frequency_hz,
            self.config.clock_divider(),
        );
        if self.period_count > H::COUNTER_MASK {
            pwm_warn!(
                "pwm wrap {} exceeds counter; raise the clock divider for {}Hz",
                self.period_count,
                self.frequency_hz
            );
        }
    }

    fn program_period(&mut self, address: PwmAddress) {
        self.hardware
            .set_clock_divider(address, self.config.clock_divider());
        self.hardware
            .set_wrap(address, self.period_count & H::COUNTER_MASK);
    }

    fn enable(&mut self, address: PwmAddress) {
        self.program_period(address);
        self.hardware
            .set_compare(address, self.compare & H::COUNTER_MASK);
        self.hardware.set_enabled(address, true);
        self.running = true;
    }

    fn apply_duty(&mut self, address: PwmAddress, duty: DutyCycle) {
        self.duty = duty;
        self.compare = duty.compare_value(self.period_count);
        if self.running {
            self.hardware
                .set_compare(address, self.compare & H::COUNTER_MASK);
            pwm_debug!("pwm pin={} compare={}", address.pin(), self.compare);
        }
    }
}

impl<H: PwmHardware> Drop for PwmChannel<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<H: PwmHardware> ErrorType for PwmChannel<H> {
    type Error = Error;
}

/// `embedded-hal` duty cycles are fixed-point levels out of [`LEVEL_MAX`].
///
/// Call through the trait (`SetDutyCycle::set_duty_cycle(&mut channel, level)`); the inherent
/// [`PwmChannel::set_duty_cycle`] takes a percentage.
impl<H: PwmHardware> SetDutyCycle for PwmChannel<H> {
    fn max_duty_cycle(&self) -> u16 {
        LEVEL_MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<()> {
        self.set_pwm(i32::from(duty))
    }
}

fn clamp_percent(percentage: f32) -> f32 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    }
}
