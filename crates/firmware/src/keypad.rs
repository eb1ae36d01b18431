//! Reads the note buttons.

use crate::SharedKeys;
use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Ticker};
use octave_keys_lib::ButtonBitmask;

/// Number of note buttons wired to the board.
pub const NUM_BUTTONS: usize = 4;

/// The note buttons, in keyboard order. Each is wired between 3V3 and its pin, with the internal pull-down enabled,
/// so a pressed button reads high.
pub struct Keypad {
    buttons: [Input<'static>; NUM_BUTTONS],
}

impl Keypad {
    /// Constructs a [`Keypad`]; the first button plays the base note.
    pub fn new(buttons: [Input<'static>; NUM_BUTTONS]) -> Self {
        Self { buttons }
    }

    /// Reads every button at once, setting bit `i` of the result if button `i` is pressed.
    pub fn sample(&self) -> ButtonBitmask {
        self.buttons
            .iter()
            .enumerate()
            .filter(|(_, button)| button.is_high())
            .fold(0, |mask, (i, _)| mask | 1 << i)
    }
}

/// Task responsible for scanning the note buttons every `interval` and passing their state along to the controller.
#[embassy_executor::task]
pub async fn scan_keypad(
    keypad: Keypad,
    controller: &'static SharedKeys,
    interval: Duration,
) -> ! {
    let mut ticker = Ticker::every(interval);
    let mut last_mask: ButtonBitmask = 0;
    loop {
        ticker.next().await;

        let mask = keypad.sample();
        // the translator would find no edges anyway
        if mask != last_mask {
            last_mask = mask;
            controller.lock().await.poll(mask).await;
        }
    }
}
