#![allow(missing_docs)]
//! Host-level tests for PWM channel register programming.

use embedded_hal::pwm::SetDutyCycle;
use hexapod_pwm::Error;
use hexapod_pwm::pwm_channel::recording_hardware::{RecordingHardware, RegisterWrite};
use hexapod_pwm::pwm_channel::{ChannelConfig, DutyCycle, PwmChannel, PwmOutput};

fn bound_channel(pin: u8, frequency_hz: u32) -> (PwmChannel<RecordingHardware>, RecordingHardware) {
    let recorder = RecordingHardware::new();
    let mut channel = PwmChannel::new(recorder.clone(), ChannelConfig::RP2040);
    channel.begin(pin, frequency_hz).expect("begin succeeds");
    (channel, recorder)
}

#[test]
fn begin_programs_a_zero_duty_signal() {
    let (channel, recorder) = bound_channel(5, 1_000);

    assert_eq!(
        recorder.writes(),
        vec![
            RegisterWrite::PinFunction { pin: 5 },
            RegisterWrite::ClockDivider {
                slice: 2,
                divider: 1
            },
            RegisterWrite::Wrap {
                slice: 2,
                wrap: 124_999
            },
            RegisterWrite::Compare {
                slice: 2,
                output: PwmOutput::B,
                compare: 0
            },
            RegisterWrite::Enabled {
                slice: 2,
                enabled: true
            },
        ]
    );
    assert!(channel.is_running());
    assert_eq!(channel.get_frequency(), 1_000);
    assert_eq!(channel.get_duty_cycle(), 0.0);
}

#[test]
fn frequency_change_keeps_the_duty_ratio() {
    let (mut channel, recorder) = bound_channel(5, 1_000);

    channel.set_duty_cycle(50.0).expect("bound");
    assert_eq!(channel.period_count(), 124_999);
    assert_eq!(recorder.compare(2, PwmOutput::B), Some(62_499));

    channel.set_frequency(2_000).expect("in range");
    assert_eq!(recorder.wrap(2), Some(62_499));
    assert_eq!(recorder.compare(2, PwmOutput::B), Some(31_249));
    assert_eq!(channel.get_frequency(), 2_000);
    assert_eq!(channel.get_duty_cycle(), 50.0);
}

#[test]
fn frequency_change_rescales_a_level() {
    let (mut channel, _recorder) = bound_channel(0, 1_000);

    channel.set_pwm(256).expect("bound");
    // 124_999 / 4 = 31_249.75
    assert_eq!(channel.compare_value(), 31_250);

    channel.set_frequency(2_000).expect("in range");
    assert_eq!(channel.duty(), DutyCycle::Level(256));
    // 62_499 / 4 = 15_624.75
    assert_eq!(channel.compare_value(), 15_625);
}

#[test]
fn percentages_are_clamped() {
    let (mut channel, recorder) = bound_channel(4, 1_000);

    channel.set_duty_cycle(-5.0).expect("bound");
    assert_eq!(channel.get_duty_cycle(), 0.0);
    assert_eq!(recorder.compare(2, PwmOutput::A), Some(0));

    channel.set_duty_cycle(150.0).expect("bound");
    assert_eq!(channel.get_duty_cycle(), 100.0);
    assert_eq!(recorder.compare(2, PwmOutput::A), Some(124_999));

    channel.set_duty_cycle(f32::NAN).expect("bound");
    assert_eq!(channel.get_duty_cycle(), 0.0);
}

#[test]
fn levels_are_clamped_and_read_back_as_percent() {
    let (mut channel, _recorder) = bound_channel(4, 1_000);

    channel.set_pwm(-3).expect("bound");
    assert_eq!(channel.duty(), DutyCycle::Level(0));
    assert_eq!(channel.compare_value(), 0);

    channel.set_pwm(2_000).expect("bound");
    assert_eq!(channel.duty(), DutyCycle::Level(1024));
    assert_eq!(channel.compare_value(), 124_999);

    channel.set_pwm(512).expect("bound");
    assert_eq!(channel.get_duty_cycle(), 50.0);
    // 62_499.5 rounds down
    assert_eq!(channel.compare_value(), 62_499);
}

#[test]
fn stop_is_idempotent_and_start_resumes() {
    let (mut channel, recorder) = bound_channel(3, 1_000);
    recorder.clear();

    channel.stop();
    channel.stop();
    assert!(!channel.is_running());
    assert_eq!(
        recorder.writes(),
        vec![RegisterWrite::Enabled {
            slice: 1,
            enabled: false
        }]
    );

    // Stopped: state moves, registers do not.
    recorder.clear();
    channel.set_duty_cycle(30.0).expect("bound");
    channel.set_frequency(2_000).expect("in range");
    assert!(recorder.writes().is_empty());
    assert_eq!(channel.period_count(), 62_499);
    // 62_499 * 0.3 = 18_749.7
    assert_eq!(channel.compare_value(), 18_750);

    channel.start().expect("bound");
    assert!(channel.is_running());
    assert_eq!(recorder.wrap(1), Some(62_499));
    assert_eq!(recorder.compare(1, PwmOutput::B), Some(18_750));
    assert!(recorder.is_enabled(1));

    recorder.clear();
    channel.start().expect("bound");
    assert!(recorder.writes().is_empty());
}

#[test]
fn out_of_range_frequencies_are_rejected() {
    let (mut channel, recorder) = bound_channel(5, 1_000);
    channel.set_duty_cycle(50.0).expect("bound");
    recorder.clear();

    assert_eq!(
        channel.set_frequency(0),
        Err(Error::InvalidFrequency {
            frequency_hz: 0,
            max_hz: 62_500_000
        })
    );
    assert_eq!(
        channel.set_frequency(70_000_000),
        Err(Error::InvalidFrequency {
            frequency_hz: 70_000_000,
            max_hz: 62_500_000
        })
    );
    assert!(recorder.writes().is_empty());
    assert_eq!(channel.get_frequency(), 1_000);
    assert_eq!(channel.compare_value(), 62_499);

    channel.set_frequency(62_500_000).expect("at the limit");
    assert_eq!(channel.period_count(), 1);
}

#[test]
fn begin_with_a_bad_frequency_leaves_the_channel_unbound() {
    let recorder = RecordingHardware::new();
    let mut channel = PwmChannel::new(recorder.clone(), ChannelConfig::RP2040);

    assert!(matches!(
        channel.begin(5, 0),
        Err(Error::InvalidFrequency { .. })
    ));
    assert!(!channel.is_bound());
    assert!(recorder.writes().is_empty());
}

#[test]
fn unbound_channel_refuses_setters() {
    let recorder = RecordingHardware::new();
    let mut channel = PwmChannel::new(recorder.clone(), ChannelConfig::RP2040);

    assert_eq!(channel.set_duty_cycle(10.0), Err(Error::NotBound));
    assert_eq!(channel.set_pwm(10), Err(Error::NotBound));
    assert_eq!(channel.set_servo_angle(10.0), Err(Error::NotBound));
    assert_eq!(channel.set_frequency(500), Err(Error::NotBound));
    assert_eq!(channel.start(), Err(Error::NotBound));
    channel.stop();
    channel.end();

    assert!(recorder.writes().is_empty());
    assert_eq!(channel.get_frequency(), 1_000);
    assert_eq!(channel.address(), None);
}

#[test]
fn unknown_pins_are_rejected() {
    let mut channel = PwmChannel::new(RecordingHardware::new(), ChannelConfig::RP2040);
    assert_eq!(channel.begin(48, 1_000), Err(Error::InvalidPin { pin: 48 }));
    assert!(!channel.is_bound());
}

#[test]
fn second_begin_needs_end_first() {
    let (mut channel, recorder) = bound_channel(5, 1_000);

    assert_eq!(channel.begin(6, 500), Err(Error::AlreadyBound { pin: 5 }));

    channel.end();
    assert!(!channel.is_bound());
    assert!(!recorder.is_enabled(2));
    assert!(
        recorder
            .writes()
            .contains(&RegisterWrite::Released { pin: 5 })
    );

    channel.begin(6, 500).expect("rebinding after end");
    let address = channel.address().expect("bound");
    assert_eq!((address.pin(), address.slice()), (6, 3));
    assert_eq!(address.output(), PwmOutput::A);
    assert_eq!(recorder.wrap(3), Some(249_999));
    assert!(recorder.is_enabled(3));
}

#[test]
fn dropping_a_channel_stops_its_output() {
    let recorder = RecordingHardware::new();
    {
        let mut channel = PwmChannel::new(recorder.clone(), ChannelConfig::RP2040);
        channel.begin(9, 1_000).expect("begin succeeds");
        channel.set_duty_cycle(75.0).expect("bound");
        assert!(recorder.is_enabled(4));
    }
    assert!(!recorder.is_enabled(4));
}

#[test]
fn clock_divider_is_programmed_and_bounds_the_frequency() {
    let recorder = RecordingHardware::new();
    let config = ChannelConfig::RP2040.with_clock_divider(64);
    let mut channel = PwmChannel::new(recorder.clone(), config);

    channel.begin(0, 50).expect("begin succeeds");
    assert_eq!(recorder.clock_divider(0), Some(64));
    assert_eq!(recorder.wrap(0), Some(39_061));

    assert_eq!(config.max_frequency_hz(), 976_562);
    assert!(channel.set_frequency(976_563).is_err());
}

#[test]
fn rp2350_clock_changes_the_period() {
    let mut channel = PwmChannel::new(RecordingHardware::new(), ChannelConfig::RP2350);
    channel.begin(0, 1_000).expect("begin succeeds");
    assert_eq!(channel.period_count(), 149_999);
}

#[test]
fn narrow_counters_truncate_register_writes() {
    let recorder = RecordingHardware::with_16_bit_counter();
    let mut channel = PwmChannel::new(recorder.clone(), ChannelConfig::RP2040);

    channel.begin(0, 1_000).expect("begin succeeds");
    channel.set_duty_cycle(100.0).expect("bound");

    // The channel keeps the full values; the registers get the low 16 bits.
    assert_eq!(channel.period_count(), 124_999);
    assert_eq!(channel.compare_value(), 124_999);
    assert_eq!(recorder.wrap(0), Some(124_999 & 0xFFFF));
    assert_eq!(recorder.compare(0, PwmOutput::A), Some(124_999 & 0xFFFF));
}

#[test]
fn embedded_hal_duty_cycle_uses_levels() {
    let (mut channel, recorder) = bound_channel(8, 1_000);

    assert_eq!(channel.max_duty_cycle(), 1024);

    SetDutyCycle::set_duty_cycle(&mut channel, 256).expect("bound");
    assert_eq!(channel.duty(), DutyCycle::Level(256));
    assert_eq!(channel.get_duty_cycle(), 25.0);

    channel.set_duty_cycle_fully_on().expect("bound");
    assert_eq!(recorder.compare(4, PwmOutput::A), Some(124_999));

    channel.set_duty_cycle_percent(50).expect("bound");
    assert_eq!(channel.duty(), DutyCycle::Level(512));
}
