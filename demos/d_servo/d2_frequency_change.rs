#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, future, panic};
use embassy_executor::Spawner;
use embassy_time::Timer;
use hexapod_pwm::{
    Result,
    pwm_channel::rp_hardware::{RpPwmHardware, RpPwmPin},
    pwm_channel::{ChannelConfig, PwmChannel},
};
use {defmt::info, defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    // Onboard LED of the non-W Pico; a scope on GPIO 25 shows the ratio holding.
    let pin = RpPwmPin::new(p.PIN_25, p.PWM_SLICE4); // 25 → (25/2) % 8 = 4
    let mut channel = PwmChannel::new(RpPwmHardware::new(), ChannelConfig::from_clk_sys());

    channel.begin(pin, 2_000)?;
    channel.set_duty_cycle(25.0)?;
    info!(
        "{}Hz wrap={} compare={}",
        channel.get_frequency(),
        channel.period_count(),
        channel.compare_value()
    );
    Timer::after_secs(2).await;

    channel.set_frequency(4_000)?;
    info!(
        "{}Hz wrap={} compare={} duty={}%",
        channel.get_frequency(),
        channel.period_count(),
        channel.compare_value(),
        channel.get_duty_cycle()
    );
    Timer::after_secs(2).await;

    // Level 768 of 1024 is 75%.
    channel.set_pwm(768)?;
    Timer::after_secs(2).await;

    for _ in 0..5 {
        channel.stop();
        Timer::after_millis(500).await;
        channel.start()?;
        Timer::after_millis(500).await;
    }

    channel.end();
    info!("channel released");

    future::pending().await
}
