//! Rotary knob demo
//!
//! Drives a KY-040 style rotary encoder from three GPIO inputs on the
//! Raspberry Pi Pico 2 and logs every step and button press via defmt.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes                        |
//! |-----------|------------|------------------------------|
//! | ENC CLK   | GP14       | Pull-up enabled              |
//! | ENC DT    | GP15       | Pull-up enabled              |
//! | ENC SW    | GP16       | Active-low, pull-up enabled  |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use rotary_encoder_driver::{
    ButtonEvent, ButtonSubscriber, EncoderConfig, EncoderEvent, EncoderSubscriber, InputPinError,
    InputPinReader, PinId, RotaryEncoderDriver,
};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

const CLK: PinId = PinId::new("GP14");
const DT: PinId = PinId::new("GP15");
const SW: PinId = PinId::new("GP16");

type Pins = InputPinReader<CriticalSectionRawMutex, Input<'static>, 3>;
type Encoder = RotaryEncoderDriver<'static, CriticalSectionRawMutex, Pins>;
type Rotations = EncoderSubscriber<'static, CriticalSectionRawMutex, InputPinError>;
type Presses = ButtonSubscriber<'static, CriticalSectionRawMutex, InputPinError>;

static PINS: StaticCell<Pins> = StaticCell::new();
static ENCODER: StaticCell<Encoder> = StaticCell::new();

// Embassy tasks cannot be generic, so each loop gets a concrete wrapper.

#[embassy_executor::task]
async fn encoder_task(encoder: &'static Encoder) {
    encoder.run().await;
}

#[embassy_executor::task]
async fn rotation_task(mut events: Rotations) {
    loop {
        match events.next_message_pure().await {
            EncoderEvent::Rotation { direction, position } => {
                info!("{} -> position {}", direction, position)
            }
            EncoderEvent::Error(e) => warn!("{}", e),
        }
    }
}

#[embassy_executor::task]
async fn button_task(encoder: &'static Encoder, mut events: Presses) {
    loop {
        match events.next_message_pure().await {
            ButtonEvent::Push => info!("Pushed at position {}", encoder.position()),
            ButtonEvent::Release => info!("Released"),
            ButtonEvent::Error(e) => warn!("{}", e),
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let pins = PINS.init(InputPinReader::new([
        (CLK, Input::new(p.PIN_14, Pull::Up)),
        (DT, Input::new(p.PIN_15, Pull::Up)),
        (SW, Input::new(p.PIN_16, Pull::Up)),
    ]));

    let config = EncoderConfig::new(CLK, DT, SW);
    let button_config = config.button_config().active_low();

    let encoder: &'static Encoder =
        match RotaryEncoderDriver::with_button_config(pins, config, button_config) {
            Ok(mut driver) => {
                driver.set_name("Knob");
                ENCODER.init(driver)
            }
            Err(e) => {
                error!("Invalid encoder configuration: {}", e);
                return;
            }
        };

    // Both subscriptions exist before the encoder task is spawned.
    let rotations = unwrap!(encoder.subscribe());
    let presses = unwrap!(encoder.button().subscribe());

    spawner.spawn(unwrap!(rotation_task(rotations)));
    spawner.spawn(unwrap!(button_task(encoder, presses)));
    spawner.spawn(unwrap!(encoder_task(encoder)));

    info!("Rotary knob demo started, turn or press the knob");
}
