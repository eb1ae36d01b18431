//! Tasks and types related to the octave shift buttons.

use crate::SharedKeys;
use embassy_futures::select::{Either, select};
use embassy_stm32::exti::ExtiInput;
use embassy_time::{Duration, Timer};
use octave_keys_lib::octave::OctaveShift;

/// Contact bounce after a press is ignored for this long.
const SETTLE_TIME: Duration = Duration::from_millis(20);

/// Handles octave button presses, shifting the octave down or up on each rising edge.
#[embassy_executor::task]
pub async fn octave_buttons(
    mut down: ExtiInput<'static>,
    mut up: ExtiInput<'static>,
    controller: &'static SharedKeys,
) -> ! {
    loop {
        let shift = match select(down.wait_for_rising_edge(), up.wait_for_rising_edge()).await {
            Either::First(_) => OctaveShift::Down,
            Either::Second(_) => OctaveShift::Up,
        };

        controller.lock().await.shift_octave(shift).await;

        Timer::after(SETTLE_TIME).await;
    }
}
