//! NextBot slave controller
//!
//! Owns the drive train and the display. Encoder edges and bus transfers are
//! handled by tasks on a high-priority interrupt executor; the thread-mode
//! loop runs one `Slave::poll` per control period.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::InterruptExecutor;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::I2C0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::{bind_interrupts, i2c, i2c_slave};
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;
use {defmt_rtt as _, panic_probe as _};

use nextbot_core::comms::Slave;
use nextbot_core::motion::MotionController;
use nextbot_drivers::bus::TargetBuffer;
use nextbot_drivers::encoder::EncoderTracker;
use nextbot_drivers::graphics::{Canvas, Framebuffer};
use nextbot_drivers::motor::HBridgeMotor;
use nextbot_firmware::{config, pins, tasks};
use nextbot_hal_rp2040::pwm::DEFAULT_TOP;
use nextbot_hal_rp2040::{EmbassyClock, PwmChannel, RpOutput, RpPwm};

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// Shared between the edge/bus tasks and the main loop
static LEFT_ENCODER: EncoderTracker = EncoderTracker::new();
static RIGHT_ENCODER: EncoderTracker = EncoderTracker::new();
static TARGET: TargetBuffer = TargetBuffer::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

// SWI_IRQ_1 is reserved for this executor
#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[entry]
fn main() -> ! {
    info!("NextBot slave starting...");

    let p = embassy_rp::init(Default::default());
    let config = config::load();

    LEFT_ENCODER.configure(&config.geometry, &config.encoder);
    RIGHT_ENCODER.configure(&config.geometry, &config.encoder);

    // Edge/bus context
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);

    info!(
        "Encoders: L pulse GPIO{} sense GPIO{}, R pulse GPIO{} sense GPIO{}",
        pins::LEFT_ENCODER_PULSE,
        pins::LEFT_ENCODER_SENSE,
        pins::RIGHT_ENCODER_PULSE,
        pins::RIGHT_ENCODER_SENSE
    );
    unwrap!(spawner.spawn(tasks::encoder_task(
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_16, Pull::Up),
        &LEFT_ENCODER,
        "left",
    )));
    unwrap!(spawner.spawn(tasks::encoder_task(
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_17, Pull::Up),
        &RIGHT_ENCODER,
        "right",
    )));

    let mut target_config = i2c_slave::Config::default();
    target_config.addr = config.comms.address as u16;
    let device = i2c_slave::I2cSlave::new(p.I2C0, p.PIN_21, p.PIN_20, Irqs, target_config);
    info!(
        "I2C target at {=u8:#x} (SDA GPIO{}, SCL GPIO{})",
        config.comms.address,
        pins::I2C_SDA,
        pins::I2C_SCL
    );
    unwrap!(spawner.spawn(tasks::i2c_target_task(device, &TARGET)));

    // Drive train
    let left_motor = HBridgeMotor::new(
        RpPwm::new(
            Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, PwmConfig::default()),
            PwmChannel::A,
            DEFAULT_TOP,
        ),
        RpOutput::new(Output::new(p.PIN_7, Level::Low)),
    );
    let right_motor = HBridgeMotor::new(
        RpPwm::new(
            Pwm::new_output_b(p.PWM_SLICE2, p.PIN_5, PwmConfig::default()),
            PwmChannel::B,
            DEFAULT_TOP,
        ),
        RpOutput::new(Output::new(p.PIN_4, Level::Low)),
    );
    let motion = MotionController::new(
        &LEFT_ENCODER,
        &RIGHT_ENCODER,
        left_motor,
        right_motor,
        &config,
    );

    let mut slave = Slave::new(
        &TARGET,
        Canvas::new(Framebuffer::new()),
        motion,
        EmbassyClock,
        &config,
    );
    info!("Slave ready, control period {}us", config.comms.control_period_us);

    // Main polling loop
    let mut delay = Delay;
    loop {
        slave.poll();
        delay.delay_us(config.comms.control_period_us);
    }
}
