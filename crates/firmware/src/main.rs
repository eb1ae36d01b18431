//! Octave Keys is [Embassy](https://embassy.dev)-based firmware for a small pushbutton MIDI controller. The firmware
//! runs on the [Nucleo-F767ZI development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is
//! powered by an F7-series STM32 microcontroller.
//!
//! Each note button plays one key of a fixed base octave. Two more buttons shift the octave down or up; depending on
//! the [`RetriggerPolicy`], notes still held during a shift are played again at the new pitch. Messages go out over a
//! UART at the MIDI baud rate, ready to drive a standard 5-pin DIN MIDI output circuit.
//!
//! The translation of button state into MIDI lives in `octave_keys_lib`; this crate only wires it to the hardware.

#![no_std]
#![no_main]

mod keypad;
mod midi_out;
mod octave_buttons;

use crate::{
    keypad::{Keypad, NUM_BUTTONS, scan_keypad},
    midi_out::{MIDI_BAUD_RATE, UartSink},
    octave_buttons::octave_buttons,
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    exti::ExtiInput,
    gpio::{Input, Pull},
    time::Hertz,
    usart::{self, UartTx},
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use octave_keys_lib::{
    configuration::{ControllerConfig, RetriggerPolicy},
    controller::{Controller, SharedController},
    octave::Octaves,
};
use static_cell::StaticCell;
use wmidi::Note;

#[cfg(feature = "defmt-rtt")]
use defmt_rtt as _;
#[cfg(not(feature = "panic-probe"))]
use panic_halt as _;
#[cfg(feature = "panic-probe")]
use panic_probe as _;

/// The controller, shared by the keypad and octave button tasks.
type SharedKeys = SharedController<CriticalSectionRawMutex, UartSink>;

/// The note played by the first button in octave 0.
const BASE_NOTE: Note = Note::C4;
/// MIDI channel, as numbered on hardware (1-16).
const MIDI_CHANNEL: u8 = 1;
const OCTAVES: [i8; 5] = [-2, -1, 0, 1, 2];
const RETRIGGER_POLICY: RetriggerPolicy = RetriggerPolicy::Last;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Octave Keys");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            divq: None,
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
    }
    let p = embassy_stm32::init(config);

    let octaves = unwrap!(Octaves::new(&OCTAVES));
    let controller_config = unwrap!(ControllerConfig::new(
        NUM_BUTTONS as u8,
        BASE_NOTE,
        MIDI_CHANNEL
    ))
    .with_octaves(octaves)
    .with_retrigger_policy(RETRIGGER_POLICY);
    info!("{}", controller_config);

    // MIDI out on USART2 TX, which the Nucleo breaks out on port D, pin 5
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = MIDI_BAUD_RATE;
    let tx = unwrap!(UartTx::new(p.USART2, p.PD5, p.DMA1_CH6, uart_config));

    static CONTROLLER: StaticCell<SharedKeys> = StaticCell::new();
    let controller = CONTROLLER.init(Mutex::new(Controller::new(
        controller_config,
        UartSink::new(tx),
    )));

    // note buttons sit side by side on port F, lowest note first
    let keypad = Keypad::new([
        Input::new(p.PF12, Pull::Down),
        Input::new(p.PF13, Pull::Down),
        Input::new(p.PF14, Pull::Down),
        Input::new(p.PF15, Pull::Down),
    ]);
    unwrap!(spawner.spawn(scan_keypad(
        keypad,
        controller,
        controller_config.scan_interval()
    )));

    // the board's blue user button doubles as octave down
    let down = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    let up = ExtiInput::new(p.PD1, p.EXTI1, Pull::Down);
    unwrap!(spawner.spawn(octave_buttons(down, up, controller)));
}
