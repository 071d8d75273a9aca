#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, future, panic};
use embassy_executor::Spawner;
use embassy_time::Timer;
use hexapod_pwm::{
    Result,
    calibration::ServoCalibration,
    pwm_channel::rp_hardware::{RpPwmHardware, RpPwmPin},
    pwm_channel::{ChannelConfig, PwmChannel},
    topology::{HexapodConfig, LegGroup},
};
use {defmt::info, defmt_rtt as _, panic_probe as _};

const SERVO_FREQUENCY_HZ: u32 = 50;

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    // Servo wired straight to the Pico, so 10-bit calibration instead of the driver board's.
    let hexapod = HexapodConfig::default().with_calibration(ServoCalibration::DIRECT_PWM);
    // Divider 64 keeps the 50 Hz period inside the 16-bit counter.
    let base = ChannelConfig::from_clk_sys().with_clock_divider(64);
    let config = hexapod.channel_config(base, LegGroup::Left, 0, 0)?;

    let pin = RpPwmPin::new(p.PIN_0, p.PWM_SLICE0); // 0 → (0/2) % 8 = 0
    let mut joint = PwmChannel::new(RpPwmHardware::new(), config);
    joint.begin(pin, SERVO_FREQUENCY_HZ)?;
    info!("wrap {}", joint.period_count());

    joint.set_servo_angle(0.0)?;
    Timer::after_millis(400).await;
    joint.set_servo_angle(180.0)?;
    Timer::after_millis(400).await;
    joint.set_servo_angle(90.0)?;
    Timer::after_millis(400).await;

    // Sweep by 10 degrees. Include 180 degrees.
    for _ in 0..3 {
        for degree in (0..=180_u8).step_by(10) {
            joint.set_servo_angle(f32::from(degree))?;
            info!("angle {} duty {}%", degree, joint.get_duty_cycle());
            Timer::after_millis(200).await;
        }
    }

    joint.stop();
    info!("servo released");

    future::pending().await
}
